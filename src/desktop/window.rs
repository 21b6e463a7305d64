//! Panel container backed by a tao window and a wry webview.
//!
//! Assets are served over a custom `notes` protocol that only answers for
//! files under the panel's local resource roots. Messages the document posts
//! with `window.ipc.postMessage(...)` are fired to the container's message
//! listeners.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tao::{
    dpi::{LogicalPosition, LogicalSize},
    event_loop::EventLoopWindowTarget,
    monitor::MonitorHandle,
    window::{Window, WindowBuilder, WindowId},
};
use tracing::{debug, warn};
use url::Url;
use wry::{
    WebView, WebViewBuilder,
    http::{HeaderValue, Request, Response, StatusCode, header::CONTENT_TYPE},
};

use crate::disposable::Disposable;
use crate::error::{NotesError, Result};
use crate::event::Emitter;
use crate::host::{PanelContainer, PanelOptions, ViewColumn};

/// Custom protocol the panel loads its assets from.
pub const PROTOCOL: &str = "notes";

/// Origin of the custom protocol as the webview sees it. WebView2 and the
/// Android webview map custom schemes onto `http://<scheme>.localhost`.
#[cfg(any(target_os = "windows", target_os = "android"))]
pub const PROTOCOL_ORIGIN: &str = "http://notes.localhost";
#[cfg(not(any(target_os = "windows", target_os = "android")))]
pub const PROTOCOL_ORIGIN: &str = "notes://localhost";

/// Width of a panel window in logical pixels.
const PANEL_WIDTH: f64 = 420.0;
/// Height of a panel window in logical pixels.
const PANEL_HEIGHT: f64 = 560.0;
/// Margin from screen edges in logical pixels.
const EDGE_MARGIN: f64 = 8.0;
/// Distance from the top of the screen in logical pixels.
const TOP_MARGIN: f64 = 48.0;

struct Inner {
    // The webview must drop before the window that hosts it.
    surface: RefCell<Option<(WebView, Window)>>,
    window_id: WindowId,
    messages: Emitter<str>,
    closed: Emitter<()>,
    disposed: Cell<bool>,
}

/// A note panel window. Clones share the same window.
#[derive(Clone)]
pub struct DesktopPanel {
    inner: Rc<Inner>,
}

impl DesktopPanel {
    /// Build the window and webview. The window is shown immediately.
    pub fn open<T: 'static>(
        target: &EventLoopWindowTarget<T>,
        title: &str,
        column: ViewColumn,
        options: &PanelOptions,
    ) -> Result<Self> {
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(LogicalSize::new(PANEL_WIDTH, PANEL_HEIGHT))
            .with_position(compute_position(target.primary_monitor(), column))
            .build(target)
            .map_err(|e| NotesError::Host(format!("failed to create panel window: {e}")))?;

        if !options.enable_scripts {
            warn!("scripts cannot be disabled in the desktop webview");
        }

        let messages: Emitter<str> = Emitter::new();
        let ipc = messages.clone();
        let allowed = options.clone();

        let webview = WebViewBuilder::new()
            .with_custom_protocol(PROTOCOL.to_string(), move |_webview_id, request| {
                serve_asset(&allowed, &request)
            })
            .with_ipc_handler(move |req: Request<String>| {
                ipc.fire(req.body().as_str());
            })
            .build(&window)
            .map_err(|e| NotesError::Host(format!("failed to create panel webview: {e}")))?;

        let window_id = window.id();
        debug!(?window_id, "panel window opened");

        Ok(Self {
            inner: Rc::new(Inner {
                surface: RefCell::new(Some((webview, window))),
                window_id,
                messages,
                closed: Emitter::new(),
                disposed: Cell::new(false),
            }),
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.inner.window_id
    }
}

impl PanelContainer for DesktopPanel {
    fn reveal(&self, column: ViewColumn) {
        if let Some((_, window)) = self.inner.surface.borrow().as_ref() {
            window.set_outer_position(compute_position(window.current_monitor(), column));
            window.set_visible(true);
            window.set_focus();
        }
    }

    fn set_html(&self, html: String) {
        if let Some((webview, _)) = self.inner.surface.borrow().as_ref() {
            if let Err(e) = webview.load_html(&html) {
                warn!(error = %e, "failed to load panel document");
            }
        }
    }

    fn as_webview_uri(&self, path: &Path) -> String {
        match Url::from_file_path(path) {
            Ok(url) => format!("{PROTOCOL_ORIGIN}{}", url.path()),
            Err(()) => {
                warn!(path = %path.display(), "asset path is not absolute");
                format!("{PROTOCOL_ORIGIN}/{}", path.display())
            }
        }
    }

    fn csp_source(&self) -> String {
        PROTOCOL_ORIGIN.to_string()
    }

    fn on_did_receive_message(&self, listener: Box<dyn Fn(&str)>) -> Disposable {
        self.inner.messages.subscribe(move |body: &str| listener(body))
    }

    fn on_did_dispose(&self, listener: Box<dyn Fn()>) -> Disposable {
        self.inner.closed.subscribe(move |_| listener())
    }

    fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let surface = self.inner.surface.borrow_mut().take();
        drop(surface);
        debug!(window_id = ?self.inner.window_id, "panel window closed");
        self.inner.closed.fire(&());
    }

    fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

/// Position for a panel in `column`: columns are panel-width slots laid out
/// left to right, wrapping when the screen runs out.
fn compute_position(monitor: Option<MonitorHandle>, column: ViewColumn) -> LogicalPosition<f64> {
    let slot = f64::from(column.index() - 1);

    match monitor {
        Some(mon) => {
            let size = mon.size();
            let scale = mon.scale_factor();
            let screen_w = size.width as f64 / scale;

            let slots = ((screen_w - 2.0 * EDGE_MARGIN) / PANEL_WIDTH).floor().max(1.0);
            let x = (EDGE_MARGIN + (slot % slots) * PANEL_WIDTH)
                .min(screen_w - PANEL_WIDTH - EDGE_MARGIN)
                .max(EDGE_MARGIN);

            LogicalPosition::new(x, TOP_MARGIN)
        }
        None => LogicalPosition::new(EDGE_MARGIN + slot * PANEL_WIDTH, TOP_MARGIN),
    }
}

/// Map a `notes://` request path back to a file path.
fn request_path(uri_path: &str) -> Option<PathBuf> {
    let url = Url::parse(&format!("file://{uri_path}")).ok()?;
    url.to_file_path().ok()
}

fn serve_asset(options: &PanelOptions, request: &Request<Vec<u8>>) -> Response<Cow<'static, [u8]>> {
    let Some(path) = request_path(request.uri().path()) else {
        return status(StatusCode::BAD_REQUEST);
    };
    if !options.allows(&path) {
        warn!(path = %path.display(), "refusing asset outside resource roots");
        return status(StatusCode::FORBIDDEN);
    }

    match fs::read(&path) {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            let mut response = Response::new(Cow::Owned(bytes));
            if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
            response
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "asset not found");
            status(StatusCode::NOT_FOUND)
        }
    }
}

fn status(code: StatusCode) -> Response<Cow<'static, [u8]>> {
    let mut response = Response::new(Cow::Borrowed(&[][..]));
    *response.status_mut() = code;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(path: &str) -> Request<Vec<u8>> {
        Request::builder()
            .uri(format!("{PROTOCOL_ORIGIN}{path}"))
            .body(Vec::new())
            .unwrap()
    }

    #[test]
    fn test_compute_position_no_monitor() {
        assert_eq!(
            compute_position(None, ViewColumn::ONE),
            LogicalPosition::new(EDGE_MARGIN, TOP_MARGIN)
        );
        assert_eq!(
            compute_position(None, ViewColumn::new(2).unwrap()),
            LogicalPosition::new(EDGE_MARGIN + PANEL_WIDTH, TOP_MARGIN)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_request_path_decodes() {
        assert_eq!(
            request_path("/opt/my%20notes/media/main.js"),
            Some(PathBuf::from("/opt/my notes/media/main.js"))
        );
    }

    #[test]
    fn test_serves_file_inside_roots() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        fs::create_dir_all(&media).unwrap();
        fs::write(media.join("reset.css"), "html { margin: 0 }").unwrap();
        let options = PanelOptions::for_extension(dir.path());

        let uri = Url::from_file_path(media.join("reset.css")).unwrap();
        let response = serve_asset(&options, &get(uri.path()));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/css");
        assert_eq!(&response.body()[..], b"html { margin: 0 }");
    }

    #[test]
    fn test_refuses_outside_roots() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("secret.txt"), "x").unwrap();
        let options = PanelOptions::for_extension(dir.path());

        let uri = Url::from_file_path(dir.path().join("secret.txt")).unwrap();
        let response = serve_asset(&options, &get(uri.path()));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_missing_asset_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let options = PanelOptions::for_extension(dir.path());

        let uri = Url::from_file_path(dir.path().join("media").join("gone.js")).unwrap();
        let response = serve_asset(&options, &get(uri.path()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
