//! The note panel and the controller that keeps at most one of them alive.
//!
//! Usage:
//! ```rust,ignore
//!   let controller = NotePanelController::new(notifier, &config);
//!
//!   // On the "show notes" command:
//!   controller.create_or_show(&host, &extension_root)?;
//!
//!   // Tear down from anywhere:
//!   controller.kill();
//! ```

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info};

use crate::config::{Labels, NotesConfig};
use crate::disposable::{Disposable, DisposableKey, DisposableStack};
use crate::error::Result;
use crate::host::{Host, Notifier, PanelContainer, PanelOptions};
use crate::{html, message};

/// View type the panel is registered under with the host.
pub const VIEW_TYPE: &str = "note";

/// A live note panel: a container plus everything registered on it.
pub struct NotePanel<C: PanelContainer> {
    container: C,
    extension_root: PathBuf,
    labels: Labels,
    notifier: Rc<dyn Notifier>,
    disposables: DisposableStack,
    /// Message listener from the most recent render.
    message_listener: Option<DisposableKey>,
    disposed: bool,
}

impl<C: PanelContainer> NotePanel<C> {
    /// Wrap a container and render into it.
    pub fn new(
        container: C,
        extension_root: PathBuf,
        notifier: Rc<dyn Notifier>,
        labels: Labels,
    ) -> Self {
        let mut panel = Self {
            container,
            extension_root,
            labels,
            notifier,
            disposables: DisposableStack::new(),
            message_listener: None,
            disposed: false,
        };
        panel.update();
        panel
    }

    /// Re-render the document and swap in a fresh message listener.
    ///
    /// The previous listener is released first, so repeated renders leave
    /// exactly one listener on the container.
    pub fn update(&mut self) {
        let document = html::render_for(&self.container, &self.extension_root, &self.labels);
        self.container.set_html(document);

        if let Some(key) = self.message_listener.take() {
            self.disposables.release(key);
        }
        let notifier = self.notifier.clone();
        let listener = self
            .container
            .on_did_receive_message(Box::new(move |body: &str| {
                message::handle_raw(notifier.as_ref(), body)
            }));
        self.message_listener = Some(self.disposables.push(listener));
    }

    /// Hold `disposable` until the panel is disposed.
    pub fn track(&mut self, disposable: Disposable) {
        self.disposables.push(disposable);
    }

    /// Close the container, then release every tracked handle newest first.
    /// Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.container.dispose();
        self.disposables.dispose_all();
        self.message_listener = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn extension_root(&self) -> &Path {
        &self.extension_root
    }
}

struct Installed<C: PanelContainer> {
    generation: u64,
    panel: NotePanel<C>,
}

type Slot<C> = Rc<RefCell<Option<Installed<C>>>>;

/// Owns the single note panel slot.
///
/// Each controller has its own slot, so independent controllers never share
/// a panel.
pub struct NotePanelController<C: PanelContainer> {
    current: Slot<C>,
    notifier: Rc<dyn Notifier>,
    title: String,
    labels: Labels,
    next_generation: Cell<u64>,
}

impl<C: PanelContainer> NotePanelController<C> {
    pub fn new(notifier: Rc<dyn Notifier>, config: &NotesConfig) -> Self {
        Self {
            current: Rc::new(RefCell::new(None)),
            notifier,
            title: config.panel.title.clone(),
            labels: config.labels.clone(),
            next_generation: Cell::new(0),
        }
    }

    /// Reveal and re-render the live panel, or create one.
    ///
    /// The panel goes to the host's active column, falling back to the first
    /// column when nothing is active.
    pub fn create_or_show<H>(&self, host: &H, extension_root: &Path) -> Result<()>
    where
        H: Host<Container = C> + ?Sized,
    {
        let column = host.active_column().unwrap_or_default();

        if let Some(installed) = self.current.borrow_mut().as_mut() {
            debug!(column = column.index(), "revealing note panel");
            installed.panel.container().reveal(column);
            installed.panel.update();
            return Ok(());
        }

        let options = PanelOptions::for_extension(extension_root);
        let container = host.create_panel(VIEW_TYPE, &self.title, column, &options)?;
        self.install(container, extension_root);
        info!(column = column.index(), "note panel created");
        Ok(())
    }

    /// Install a container the host restored on its own, replacing any live
    /// panel.
    pub fn revive(&self, container: C, extension_root: &Path) {
        if Self::teardown(&self.current, None) {
            debug!("disposed previous note panel before revive");
        }
        self.install(container, extension_root);
        info!("note panel revived");
    }

    /// Dispose the live panel, if any.
    pub fn kill(&self) {
        if Self::teardown(&self.current, None) {
            info!("note panel killed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Run `f` against the live panel.
    pub fn with_panel<R>(&self, f: impl FnOnce(&NotePanel<C>) -> R) -> Option<R> {
        self.current.borrow().as_ref().map(|installed| f(&installed.panel))
    }

    fn install(&self, container: C, extension_root: &Path) {
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);

        let mut panel = NotePanel::new(
            container,
            extension_root.to_path_buf(),
            self.notifier.clone(),
            self.labels.clone(),
        );

        let slot = Rc::downgrade(&self.current);
        let on_close = panel.container().on_did_dispose(Box::new(move || {
            if let Some(slot) = slot.upgrade() {
                if Self::teardown(&slot, Some(generation)) {
                    info!("note panel closed");
                }
            }
        }));
        panel.track(on_close);

        *self.current.borrow_mut() = Some(Installed { generation, panel });
    }

    /// Empty the slot, then dispose what was in it. With `generation` set,
    /// only a panel of that generation is torn down.
    ///
    /// The slot borrow ends before disposal so the container's dispose event
    /// can re-enter and find the slot already empty.
    fn teardown(slot: &Slot<C>, generation: Option<u64>) -> bool {
        let taken = {
            let mut current = slot.borrow_mut();
            let matches = current
                .as_ref()
                .is_some_and(|installed| generation.is_none_or(|g| g == installed.generation));
            if matches { current.take() } else { None }
        };
        match taken {
            Some(mut installed) => {
                installed.panel.dispose();
                true
            }
            None => false,
        }
    }
}
