use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the panel shell.
///
/// Host failures are passed through untouched; the shell performs no local
/// recovery.
#[derive(Debug, Error)]
pub enum NotesError {
    #[error("Host error: {0}")]
    Host(String),

    #[error("Failed to parse config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Command '{0}' not found")]
    UnknownCommand(String),

    #[error("Command '{0}' already exists")]
    CommandExists(String),
}

pub type Result<T> = std::result::Result<T, NotesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            NotesError::UnknownCommand("vs-notes.nope".into()).to_string(),
            "Command 'vs-notes.nope' not found"
        );
        assert_eq!(
            NotesError::Host("no display".into()).to_string(),
            "Host error: no display"
        );
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let wrapped: NotesError = err.into();
        assert!(matches!(wrapped, NotesError::Json(_)));
    }
}
