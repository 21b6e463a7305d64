//! Desktop host: note panels as native webview windows.

pub mod notify;
pub mod tray;
pub mod window;

use tao::{event_loop::EventLoopWindowTarget, window::WindowId};
use tracing::debug;

use crate::error::Result;
use crate::host::{Host, PanelContainer, PanelOptions, PanelSet, ViewColumn};

pub use notify::DesktopNotifier;
pub use window::DesktopPanel;

/// Panel windows the event loop routes window events to.
#[derive(Default)]
pub struct DesktopShell {
    panels: PanelSet<DesktopPanel>,
}

impl DesktopShell {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&self, panel: DesktopPanel) {
        self.panels.track(panel);
    }

    /// Release windows disposed outside a close request, e.g. by `kill`.
    pub fn prune(&self) {
        let removed = self.panels.prune();
        if removed > 0 {
            debug!(removed, "pruned disposed panels");
        }
    }

    /// Dispose the panel owning `window_id`. Returns false if no live panel
    /// owns it.
    pub fn close_window(&self, window_id: WindowId) -> bool {
        match self.panels.take_where(|p| p.window_id() == window_id) {
            Some(panel) => {
                debug!(?window_id, "close requested");
                panel.dispose();
                true
            }
            None => false,
        }
    }
}

/// A [`Host`] view over the running event loop, built per event.
pub struct DesktopHost<'a, T: 'static> {
    target: &'a EventLoopWindowTarget<T>,
    shell: &'a DesktopShell,
    active_column: Option<ViewColumn>,
}

impl<'a, T: 'static> DesktopHost<'a, T> {
    pub fn new(
        target: &'a EventLoopWindowTarget<T>,
        shell: &'a DesktopShell,
        active_column: Option<ViewColumn>,
    ) -> Self {
        Self {
            target,
            shell,
            active_column,
        }
    }
}

impl<T: 'static> Host for DesktopHost<'_, T> {
    type Container = DesktopPanel;

    fn active_column(&self) -> Option<ViewColumn> {
        self.active_column
    }

    fn create_panel(
        &self,
        view_type: &str,
        title: &str,
        column: ViewColumn,
        options: &PanelOptions,
    ) -> Result<DesktopPanel> {
        debug!(view_type, title, column = column.index(), "creating panel window");
        let panel = DesktopPanel::open(self.target, title, column, options)?;
        self.shell.track(panel.clone());
        Ok(panel)
    }
}
