//! In-memory host used by unit tests.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use crate::disposable::Disposable;
use crate::error::{NotesError, Result};
use crate::event::Emitter;
use crate::host::{Host, Notifier, PanelContainer, PanelOptions, ViewColumn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Error(String),
}

#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    log: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

impl Notifier for RecordingNotifier {
    fn show_information_message(&self, text: &str) {
        self.log.borrow_mut().push(Notification::Info(text.to_string()));
    }

    fn show_error_message(&self, text: &str) {
        self.log.borrow_mut().push(Notification::Error(text.to_string()));
    }
}

#[derive(Default)]
struct ContainerState {
    id: usize,
    html: RefCell<Vec<String>>,
    reveals: RefCell<Vec<ViewColumn>>,
    dispose_calls: Cell<usize>,
    disposed: Cell<bool>,
    messages: Emitter<str>,
    closed: Emitter<()>,
}

/// A panel container that records what the controller does to it.
#[derive(Clone, Default)]
pub struct FakeContainer {
    state: Rc<ContainerState>,
}

impl FakeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: usize) -> Self {
        Self {
            state: Rc::new(ContainerState {
                id,
                ..Default::default()
            }),
        }
    }

    pub fn id(&self) -> usize {
        self.state.id
    }

    /// Simulate the embedded document posting a message.
    pub fn post(&self, body: &str) {
        self.state.messages.fire(body);
    }

    /// Simulate the user closing the panel.
    pub fn close_by_user(&self) {
        self.dispose();
    }

    pub fn renders(&self) -> Vec<String> {
        self.state.html.borrow().clone()
    }

    pub fn reveals(&self) -> Vec<ViewColumn> {
        self.state.reveals.borrow().clone()
    }

    pub fn dispose_calls(&self) -> usize {
        self.state.dispose_calls.get()
    }

    pub fn message_listeners(&self) -> usize {
        self.state.messages.listener_count()
    }

    pub fn dispose_listeners(&self) -> usize {
        self.state.closed.listener_count()
    }
}

impl PanelContainer for FakeContainer {
    fn reveal(&self, column: ViewColumn) {
        self.state.reveals.borrow_mut().push(column);
    }

    fn set_html(&self, html: String) {
        self.state.html.borrow_mut().push(html);
    }

    fn as_webview_uri(&self, path: &Path) -> String {
        format!("fake://{}", path.display())
    }

    fn csp_source(&self) -> String {
        "fake://ext".into()
    }

    fn on_did_receive_message(&self, listener: Box<dyn Fn(&str)>) -> Disposable {
        self.state.messages.subscribe(move |body: &str| listener(body))
    }

    fn on_did_dispose(&self, listener: Box<dyn Fn()>) -> Disposable {
        self.state.closed.subscribe(move |_| listener())
    }

    fn dispose(&self) {
        self.state.dispose_calls.set(self.state.dispose_calls.get() + 1);
        if self.state.disposed.replace(true) {
            return;
        }
        self.state.closed.fire(&());
    }

    fn is_disposed(&self) -> bool {
        self.state.disposed.get()
    }
}

/// A host that hands out [`FakeContainer`]s and remembers them.
#[derive(Default)]
pub struct FakeHost {
    pub active_column: Cell<Option<ViewColumn>>,
    pub fail_create: Cell<bool>,
    created: RefCell<Vec<(FakeContainer, ViewColumn, PanelOptions, String)>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_count(&self) -> usize {
        self.created.borrow().len()
    }

    pub fn container(&self, index: usize) -> FakeContainer {
        self.created.borrow()[index].0.clone()
    }

    pub fn created_column(&self, index: usize) -> ViewColumn {
        self.created.borrow()[index].1
    }

    pub fn created_options(&self, index: usize) -> PanelOptions {
        self.created.borrow()[index].2.clone()
    }

    pub fn created_title(&self, index: usize) -> String {
        self.created.borrow()[index].3.clone()
    }

    /// Containers not yet disposed.
    pub fn live_count(&self) -> usize {
        self.created
            .borrow()
            .iter()
            .filter(|(c, ..)| !c.is_disposed())
            .count()
    }
}

impl Host for FakeHost {
    type Container = FakeContainer;

    fn active_column(&self) -> Option<ViewColumn> {
        self.active_column.get()
    }

    fn create_panel(
        &self,
        view_type: &str,
        title: &str,
        column: ViewColumn,
        options: &PanelOptions,
    ) -> Result<FakeContainer> {
        if self.fail_create.get() {
            return Err(NotesError::Host(format!("cannot create '{view_type}' panel")));
        }
        let container = FakeContainer::with_id(self.created.borrow().len());
        self.created.borrow_mut().push((
            container.clone(),
            column,
            options.clone(),
            title.to_string(),
        ));
        Ok(container)
    }
}
