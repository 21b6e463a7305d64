//! Command registration: the entry point that opens the note panel.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::debug;

use crate::disposable::{Disposable, DisposableStack};
use crate::error::{NotesError, Result};
use crate::host::{Host, PanelContainer};
use crate::panel::NotePanelController;

/// Opens the note panel, or reveals it if already open.
pub const SHOW_COMMAND: &str = "vs-notes.note";
/// Closes the note panel.
pub const CLOSE_COMMAND: &str = "vs-notes.close";

type Handler<C> = Rc<dyn for<'h> Fn(&'h (dyn Host<Container = C> + 'h)) -> Result<()>>;

/// Named commands runnable against a host whose panels are `C`.
pub struct CommandRegistry<C: PanelContainer> {
    commands: Rc<RefCell<HashMap<String, Handler<C>>>>,
}

impl<C: PanelContainer> CommandRegistry<C> {
    pub fn new() -> Self {
        Self {
            commands: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Register `handler` under `id`. Disposing the returned handle
    /// unregisters it.
    pub fn register_command<F>(&self, id: &str, handler: F) -> Result<Disposable>
    where
        F: for<'h> Fn(&'h (dyn Host<Container = C> + 'h)) -> Result<()> + 'static,
    {
        let mut commands = self.commands.borrow_mut();
        if commands.contains_key(id) {
            return Err(NotesError::CommandExists(id.to_string()));
        }
        commands.insert(id.to_string(), Rc::new(handler));
        debug!(command = %id, "registered");

        let weak = Rc::downgrade(&self.commands);
        let id = id.to_string();
        Ok(Disposable::new(move || {
            if let Some(commands) = weak.upgrade() {
                commands.borrow_mut().remove(&id);
            }
        }))
    }

    /// Run a registered command.
    pub fn execute(&self, id: &str, host: &dyn Host<Container = C>) -> Result<()> {
        let handler = self
            .commands
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| NotesError::UnknownCommand(id.to_string()))?;
        debug!(command = %id, "executing");
        handler(host)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.borrow().contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn command_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.commands.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl<C: PanelContainer> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the note panel commands. The returned stack holds the
/// registrations; disposing it unregisters them.
pub fn activate<C: PanelContainer>(
    registry: &CommandRegistry<C>,
    controller: Rc<NotePanelController<C>>,
    extension_root: PathBuf,
) -> Result<DisposableStack> {
    let mut subscriptions = DisposableStack::new();

    let show = controller.clone();
    subscriptions.push(registry.register_command(SHOW_COMMAND, move |host| {
        show.create_or_show(host, &extension_root)
    })?);

    let close = controller;
    subscriptions.push(registry.register_command(CLOSE_COMMAND, move |_host| {
        close.kill();
        Ok(())
    })?);

    Ok(subscriptions)
}
