//! Messages posted from the embedded document back to the panel.
//!
//! The document posts JSON bodies shaped `{ "type": "...", "value": "..." }`
//! through `window.ipc.postMessage`.

use serde::Deserialize;
use tracing::debug;

use crate::host::Notifier;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum WebviewMessage {
    #[serde(rename = "onInfo")]
    OnInfo {
        #[serde(default)]
        value: Option<String>,
    },
    #[serde(rename = "onError")]
    OnError {
        #[serde(default)]
        value: Option<String>,
    },
    /// Any other `type`.
    #[serde(other)]
    Unknown,
}

impl WebviewMessage {
    pub fn parse(body: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Relay a message to host notifications. Missing or empty values and
/// unrecognized types produce nothing.
pub fn dispatch(notifier: &dyn Notifier, message: &WebviewMessage) {
    match message {
        WebviewMessage::OnInfo { value } => {
            if let Some(text) = non_empty(value) {
                notifier.show_information_message(text);
            }
        }
        WebviewMessage::OnError { value } => {
            if let Some(text) = non_empty(value) {
                notifier.show_error_message(text);
            }
        }
        WebviewMessage::Unknown => {}
    }
}

/// Parse a raw IPC body and dispatch it. Malformed bodies are dropped.
pub fn handle_raw(notifier: &dyn Notifier, body: &str) {
    match WebviewMessage::parse(body) {
        Ok(message) => dispatch(notifier, &message),
        Err(e) => debug!(error = %e, "dropping malformed panel message"),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
