use std::rc::Rc;

use tao::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tracing::{info, warn};
use tray_icon::{TrayIcon, TrayIconEvent, menu::MenuEvent};

use notes_panel::desktop::{DesktopHost, DesktopNotifier, DesktopPanel, DesktopShell, tray};
use notes_panel::{
    CLOSE_COMMAND, CommandRegistry, NotePanelController, SHOW_COMMAND, ViewColumn, commands,
    config,
};

enum UserEvent {
    TrayIconEvent(TrayIconEvent),
    MenuEvent(MenuEvent),
}

fn main() {
    // Init tracing to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("notes-panel starting");

    let cfg = config::load();
    let root = cfg.extension_root();
    let extension_root = std::fs::canonicalize(&root).unwrap_or(root);
    let active_column = cfg.panel.column.and_then(ViewColumn::new);
    info!(root = %extension_root.display(), "extension root resolved");

    let shell = DesktopShell::new();
    let notifier = Rc::new(DesktopNotifier::new(cfg.panel.title.clone()));
    let controller: Rc<NotePanelController<DesktopPanel>> =
        Rc::new(NotePanelController::new(notifier, &cfg));
    let registry = CommandRegistry::new();
    let subscriptions = match commands::activate(&registry, controller.clone(), extension_root) {
        Ok(subs) => subs,
        Err(e) => {
            warn!(error = %e, "failed to register commands");
            return;
        }
    };
    info!(commands = ?registry.command_ids(), "commands registered");

    let mut event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();

    // Suppress dock icon on macOS; must be set before run()
    #[cfg(target_os = "macos")]
    {
        use tao::platform::macos::{ActivationPolicy, EventLoopExtMacOS};
        event_loop.set_activation_policy(ActivationPolicy::Accessory);
    }

    let proxy = event_loop.create_proxy();
    TrayIconEvent::set_event_handler(Some(move |event| {
        let _ = proxy.send_event(UserEvent::TrayIconEvent(event));
    }));

    let proxy = event_loop.create_proxy();
    MenuEvent::set_event_handler(Some(move |event| {
        let _ = proxy.send_event(UserEvent::MenuEvent(event));
    }));

    let (menu, menu_items) = tray::build_menu();
    let title = cfg.panel.title.clone();

    // The tray icon must be created inside the event loop (after Init)
    let mut tray_icon: Option<TrayIcon> = None;
    let mut subscriptions = Some(subscriptions);

    event_loop.run(move |event, event_loop_target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(tao::event::StartCause::Init) => {
                let built = tray::generate_icon()
                    .and_then(|icon| tray::build_tray(menu.clone(), icon, &title));
                match built {
                    Ok(ti) => {
                        tray_icon = Some(ti);
                        info!("tray icon created");
                    }
                    Err(e) => {
                        warn!(error = %e, "tray unavailable, exiting");
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                }

                // Wake up the run loop on macOS so the icon appears
                #[cfg(target_os = "macos")]
                {
                    use objc2_core_foundation::CFRunLoop;
                    if let Some(rl) = CFRunLoop::main() {
                        rl.wake_up();
                    }
                }
            }

            Event::UserEvent(UserEvent::MenuEvent(event)) => {
                let command = if event.id == menu_items.open_item.id() {
                    Some(SHOW_COMMAND)
                } else if event.id == menu_items.close_item.id() {
                    Some(CLOSE_COMMAND)
                } else if event.id == menu_items.quit_item.id() {
                    info!("quit requested");
                    controller.kill();
                    shell.prune();
                    if let Some(mut subs) = subscriptions.take() {
                        subs.dispose_all();
                    }
                    tray_icon.take();
                    *control_flow = ControlFlow::Exit;
                    None
                } else {
                    None
                };

                if let Some(id) = command {
                    let host = DesktopHost::new(event_loop_target, &shell, active_column);
                    if let Err(e) = registry.execute(id, &host) {
                        warn!(command = id, error = %e, "command failed");
                    }
                    shell.prune();
                }
            }

            Event::UserEvent(UserEvent::TrayIconEvent(_event)) => {}

            Event::WindowEvent {
                window_id,
                event: WindowEvent::CloseRequested,
                ..
            } => {
                shell.close_window(window_id);
            }

            _ => {}
        }
    });
}
