use std::process::Command;

use tracing::{info, warn};

use crate::host::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Error,
}

/// Shows panel notifications as native desktop notifications.
///
/// Every notification is also logged, so nothing is lost on platforms
/// without a notification command.
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    fn send(&self, level: Level, text: &str) {
        match level {
            Level::Info => info!(message = %text, "panel notification"),
            Level::Error => warn!(message = %text, "panel error notification"),
        }
        if let Some(command) = notification_command(&self.app_name, level, text) {
            // Waited on off the event loop thread so the child is reaped.
            std::thread::spawn(move || {
                if let Some(failure) = run_and_report(command) {
                    warn!(error = %failure, "notification command failed");
                }
            });
        }
    }
}

/// Run `command` to completion. Returns a description of the failure, if any.
fn run_and_report(mut command: Command) -> Option<String> {
    let program = command.get_program().to_string_lossy().into_owned();
    match command.output() {
        Ok(output) if output.status.success() => None,
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Some(format!("{program} exited with {}: {}", output.status, stderr.trim()))
        }
        Err(e) => Some(format!("failed to run {program}: {e}")),
    }
}

impl Notifier for DesktopNotifier {
    fn show_information_message(&self, text: &str) {
        self.send(Level::Info, text);
    }

    fn show_error_message(&self, text: &str) {
        self.send(Level::Error, text);
    }
}

/// macOS: `osascript display notification`, which needs no entitlements.
#[cfg(target_os = "macos")]
fn notification_command(app_name: &str, level: Level, text: &str) -> Option<Command> {
    // Strip quotes so the AppleScript string literals stay intact.
    let clean = |s: &str| s.replace('"', "'").replace('\\', "");
    let subtitle = match level {
        Level::Info => "",
        Level::Error => " subtitle \"Error\"",
    };
    let script = format!(
        "display notification \"{}\" with title \"{}\"{subtitle}",
        clean(text),
        clean(app_name),
    );
    let mut command = Command::new("osascript");
    command.args(["-e", &script]);
    Some(command)
}

/// Other unixes: `notify-send` from libnotify.
#[cfg(all(unix, not(target_os = "macos")))]
fn notification_command(app_name: &str, level: Level, text: &str) -> Option<Command> {
    let urgency = match level {
        Level::Info => "normal",
        Level::Error => "critical",
    };
    let mut command = Command::new("notify-send");
    // `--` keeps text such as "--help" from being read as an option.
    command.args(["-a", app_name, "-u", urgency, "--", app_name, text]);
    Some(command)
}

#[cfg(not(unix))]
fn notification_command(_app_name: &str, _level: Level, _text: &str) -> Option<Command> {
    None
}
