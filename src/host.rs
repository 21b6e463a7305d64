//! The seam between the panel shell and whatever hosts it.
//!
//! The desktop binary implements these traits on top of tao/wry; tests use an
//! in-memory fake.

use std::cell::RefCell;
use std::path::{Component, Path, PathBuf};

use crate::disposable::Disposable;
use crate::error::Result;

/// A 1-based column position for a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewColumn(u8);

impl ViewColumn {
    pub const ONE: ViewColumn = ViewColumn(1);

    /// Returns `None` for column 0.
    pub fn new(index: u8) -> Option<Self> {
        (index > 0).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl Default for ViewColumn {
    fn default() -> Self {
        Self::ONE
    }
}

/// Options a panel container is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOptions {
    pub enable_scripts: bool,
    /// Directories the container may load content from.
    pub local_resource_roots: Vec<PathBuf>,
}

impl PanelOptions {
    /// Scripts on; content restricted to `media/` and `out/compiled/` under
    /// the extension root.
    pub fn for_extension(extension_root: &Path) -> Self {
        Self {
            enable_scripts: true,
            local_resource_roots: vec![
                extension_root.join("media"),
                extension_root.join("out").join("compiled"),
            ],
        }
    }

    /// Whether `path` falls under one of the local resource roots. Paths
    /// containing `..` are never allowed.
    pub fn allows(&self, path: &Path) -> bool {
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return false;
        }
        self.local_resource_roots
            .iter()
            .any(|root| path.starts_with(root))
    }
}

/// Host-level notifications. Fire-and-forget.
pub trait Notifier {
    fn show_information_message(&self, text: &str);
    fn show_error_message(&self, text: &str);
}

/// A live panel surface hosting an embedded document.
///
/// Handles are shared: every method takes `&self` and implementations use
/// interior mutability, matching a host that hands out reference-counted
/// objects.
pub trait PanelContainer: 'static {
    /// Bring the panel to the foreground in `column`.
    fn reveal(&self, column: ViewColumn);

    /// Replace the rendered document.
    fn set_html(&self, html: String);

    /// Map a local file path to a URI the embedded document can load.
    fn as_webview_uri(&self, path: &Path) -> String;

    /// Origin string to allow in the content security policy.
    fn csp_source(&self) -> String;

    /// Subscribe to raw message bodies posted by the embedded document.
    fn on_did_receive_message(&self, listener: Box<dyn Fn(&str)>) -> Disposable;

    /// Subscribe to the container closing, by the user or programmatically.
    fn on_did_dispose(&self, listener: Box<dyn Fn()>) -> Disposable;

    /// Close the container. Idempotent; the dispose event fires at most once.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

/// The host application: where panels come from.
pub trait Host {
    type Container: PanelContainer;

    /// Column of the editor the user is working in, if any.
    fn active_column(&self) -> Option<ViewColumn>;

    fn create_panel(
        &self,
        view_type: &str,
        title: &str,
        column: ViewColumn,
        options: &PanelOptions,
    ) -> Result<Self::Container>;
}

/// Containers a host keeps alive so it can route window events to them.
///
/// Disposed entries are dropped on every mutation, so a killed panel does not
/// outlive the next event it could have received.
pub struct PanelSet<C> {
    panels: RefCell<Vec<C>>,
}

impl<C: PanelContainer> PanelSet<C> {
    pub fn new() -> Self {
        Self {
            panels: RefCell::new(Vec::new()),
        }
    }

    pub fn track(&self, panel: C) {
        let mut panels = self.panels.borrow_mut();
        panels.retain(|p| !p.is_disposed());
        panels.push(panel);
    }

    /// Drop disposed containers. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut panels = self.panels.borrow_mut();
        let before = panels.len();
        panels.retain(|p| !p.is_disposed());
        before - panels.len()
    }

    /// Remove and return the first live container matching `pred`.
    ///
    /// The borrow is released before returning, so the caller may dispose the
    /// container and let its listeners reach back into the set.
    pub fn take_where(&self, pred: impl Fn(&C) -> bool) -> Option<C> {
        let mut panels = self.panels.borrow_mut();
        panels.retain(|p| !p.is_disposed());
        let index = panels.iter().position(pred)?;
        Some(panels.remove(index))
    }

    pub fn len(&self) -> usize {
        self.panels.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: PanelContainer> Default for PanelSet<C> {
    fn default() -> Self {
        Self::new()
    }
}
