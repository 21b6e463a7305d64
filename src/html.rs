//! Builds the document served into the note panel.
//!
//! The document itself is static: a form for entering a note and an empty
//! list container. `media/main.js` owns note creation (`CreateNote()`), list
//! population (`LoadNotes()`) and posting `onInfo`/`onError` messages back.

use std::path::{Path, PathBuf};

use crate::config::Labels;
use crate::host::PanelContainer;
use crate::nonce;

/// Extension-relative directory holding the panel assets.
pub const MEDIA_DIR: &str = "media";
pub const SCRIPT_FILE: &str = "main.js";
pub const RESET_STYLESHEET: &str = "reset.css";
pub const THEME_STYLESHEET: &str = "vscode.css";

/// Container-addressable locations of the three panel assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUris {
    pub script: String,
    pub reset_styles: String,
    pub theme_styles: String,
}

impl AssetUris {
    pub fn resolve(container: &dyn PanelContainer, extension_root: &Path) -> Self {
        let asset = |name: &str| -> PathBuf { extension_root.join(MEDIA_DIR).join(name) };
        Self {
            script: container.as_webview_uri(&asset(SCRIPT_FILE)),
            reset_styles: container.as_webview_uri(&asset(RESET_STYLESHEET)),
            theme_styles: container.as_webview_uri(&asset(THEME_STYLESHEET)),
        }
    }
}

/// Content security policy: images over https, `data:` or from the panel's
/// own origin; inline styles allowed; only the nonce-tagged script runs.
pub fn content_security_policy(csp_source: &str, nonce: &str) -> String {
    format!(
        "default-src 'none'; img-src {csp_source} https: data:; \
         style-src {csp_source} 'unsafe-inline'; script-src 'nonce-{nonce}';"
    )
}

/// Render the panel document with a fresh nonce.
pub fn render_for(container: &dyn PanelContainer, extension_root: &Path, labels: &Labels) -> String {
    let assets = AssetUris::resolve(container, extension_root);
    render(&assets, &container.csp_source(), &nonce::generate(), labels)
}

pub fn render(assets: &AssetUris, csp_source: &str, nonce: &str, labels: &Labels) -> String {
    let csp = content_security_policy(csp_source, nonce);
    let heading = escape_html(&labels.heading);
    let submit = escape_html(&labels.submit);
    let notes_heading = escape_html(&labels.notes_heading);
    let script = escape_html(&assets.script);
    let reset = escape_html(&assets.reset_styles);
    let theme = escape_html(&assets.theme_styles);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta http-equiv="Content-Security-Policy" content="{csp}">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link href="{reset}" rel="stylesheet">
<link href="{theme}" rel="stylesheet">
<script nonce="{nonce}" src="{script}"></script>
</head>
<body onload="LoadNotes()">
<section>
  <h2 class="heading">{heading}</h2>
  <div class="main bg-additional">
    <form onsubmit="CreateNote();return false">
      <div class="vertical">
        <input type="text" id="text_id" class="textfield bg-primary">
        <input type="submit" class="button" value="{submit}">
      </div>
    </form>
  </div>
</section>
<section>
  <h2 class="heading">{notes_heading}</h2>
  <div id="parent_notes">
    <div id="start_notes"></div>
  </div>
</section>
</body>
</html>
"#
    )
}

/// Escape text for element content and double-quoted attribute values.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeContainer;

    fn assets() -> AssetUris {
        AssetUris {
            script: "fake://ext/media/main.js".into(),
            reset_styles: "fake://ext/media/reset.css".into(),
            theme_styles: "fake://ext/media/vscode.css".into(),
        }
    }

    #[test]
    fn test_resolve_uses_media_dir() {
        let container = FakeContainer::new();
        let uris = AssetUris::resolve(&container, Path::new("/ext"));
        assert_eq!(uris.script, "fake:///ext/media/main.js");
        assert_eq!(uris.reset_styles, "fake:///ext/media/reset.css");
        assert_eq!(uris.theme_styles, "fake:///ext/media/vscode.css");
    }

    #[test]
    fn test_document_wires_assets_and_nonce() {
        let html = render(&assets(), "fake://ext", "N0nce", &Labels::default());
        assert!(html.contains(r#"<script nonce="N0nce" src="fake://ext/media/main.js"></script>"#));
        assert!(html.contains(r#"<link href="fake://ext/media/reset.css" rel="stylesheet">"#));
        assert!(html.contains(r#"<link href="fake://ext/media/vscode.css" rel="stylesheet">"#));
        assert!(html.contains("script-src 'nonce-N0nce';"));
        assert!(html.contains("img-src fake://ext https: data:;"));
        assert!(html.contains("style-src fake://ext 'unsafe-inline';"));
    }

    #[test]
    fn test_document_structure() {
        let html = render(&assets(), "fake://ext", "n", &Labels::default());
        assert!(html.contains(r#"<body onload="LoadNotes()">"#));
        assert!(html.contains(r#"<form onsubmit="CreateNote();return false">"#));
        assert!(html.contains(r#"id="text_id""#));
        assert!(html.contains(r#"type="submit""#));
        assert!(html.contains(r#"<div id="parent_notes">"#));
        assert!(html.contains(r#"<div id="start_notes"></div>"#));
        assert!(html.contains("Ваши заметки:"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let labels = Labels {
            heading: "<b>Notes</b>".into(),
            submit: "Say \"hi\"".into(),
            notes_heading: "A & B".into(),
        };
        let html = render(&assets(), "fake://ext", "n", &labels);
        assert!(html.contains("&lt;b&gt;Notes&lt;/b&gt;"));
        assert!(html.contains(r#"value="Say &quot;hi&quot;""#));
        assert!(html.contains("A &amp; B"));
    }

    #[test]
    fn test_each_render_gets_a_new_nonce() {
        let container = FakeContainer::new();
        let a = render_for(&container, Path::new("/ext"), &Labels::default());
        let b = render_for(&container, Path::new("/ext"), &Labels::default());
        assert_ne!(a, b);
    }
}
