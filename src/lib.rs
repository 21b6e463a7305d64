//! A single-instance note-taking panel.
//!
//! The panel shell is host-agnostic: [`host`] defines the seam, [`panel`]
//! keeps at most one panel alive, [`html`] builds its document and
//! [`message`] relays what the document posts back to host notifications.
//! With the `desktop` feature, [`desktop`] hosts the panel in a native
//! webview window opened from a tray menu.

pub mod commands;
pub mod config;
pub mod disposable;
pub mod error;
pub mod event;
pub mod host;
pub mod html;
pub mod message;
pub mod nonce;
pub mod panel;

#[cfg(feature = "desktop")]
pub mod desktop;

#[cfg(test)]
mod testing;

pub use commands::{CommandRegistry, CLOSE_COMMAND, SHOW_COMMAND};
pub use config::NotesConfig;
pub use disposable::{Disposable, DisposableStack};
pub use error::{NotesError, Result};
pub use host::{Host, Notifier, PanelContainer, PanelOptions, PanelSet, ViewColumn};
pub use message::WebviewMessage;
pub use panel::{NotePanel, NotePanelController};
