use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{NotesError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotesConfig {
    #[serde(default)]
    pub panel: PanelSection,
    #[serde(default)]
    pub labels: Labels,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PanelSection {
    #[serde(default = "default_title")]
    pub title: String,
    /// Directory holding `media/`. Resolved at load time when unset.
    pub extension_root: Option<PathBuf>,
    /// Column the desktop host reports as active. Unset means none.
    pub column: Option<u8>,
}

/// Text shown in the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Labels {
    #[serde(default = "default_heading")]
    pub heading: String,
    #[serde(default = "default_submit")]
    pub submit: String,
    #[serde(default = "default_notes_heading")]
    pub notes_heading: String,
}

fn default_title() -> String {
    "VS Notes".into()
}

fn default_heading() -> String {
    "Здесь вы можете написать заметку".into()
}

fn default_submit() -> String {
    "Добавить заметку".into()
}

fn default_notes_heading() -> String {
    "Ваши заметки:".into()
}

impl Default for PanelSection {
    fn default() -> Self {
        Self {
            title: default_title(),
            extension_root: None,
            column: None,
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            heading: default_heading(),
            submit: default_submit(),
            notes_heading: default_notes_heading(),
        }
    }
}

impl NotesConfig {
    /// The configured extension root, or the first of: the executable's
    /// directory, the current directory, that contains `media/`.
    pub fn extension_root(&self) -> PathBuf {
        if let Some(ref root) = self.panel.extension_root {
            return root.clone();
        }
        let candidates = [
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
            std::env::current_dir().ok(),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|dir| dir.join("media").is_dir())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Parse a config file, failing on unreadable or invalid TOML.
pub fn load_from(path: &Path) -> Result<NotesConfig> {
    let content = fs::read_to_string(path)?;
    toml::from_str::<NotesConfig>(&content).map_err(|source| NotesError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the notes config file.
/// Search order:
///   1. NOTES_PANEL_CONFIG env var
///   2. ~/.notes-panel/config.toml
///   3. Default values
pub fn load() -> NotesConfig {
    load_first([
        std::env::var("NOTES_PANEL_CONFIG").ok().map(PathBuf::from),
        dirs::home_dir().map(|h| h.join(".notes-panel/config.toml")),
    ])
}

/// First candidate that exists and parses wins. Unusable files are logged and
/// skipped; with none left the defaults apply.
fn load_first(candidates: impl IntoIterator<Item = Option<PathBuf>>) -> NotesConfig {
    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            match load_from(&candidate) {
                Ok(config) => {
                    info!(
                        path = %candidate.display(),
                        title = %config.panel.title,
                        "loaded notes config"
                    );
                    return config;
                }
                Err(e) => {
                    warn!(path = %candidate.display(), error = %e, "failed to load config");
                }
            }
        }
    }

    info!("no config file found, using defaults");
    NotesConfig::default()
}
