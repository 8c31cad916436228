//! Collaborators of the content controller and their Tauri implementations.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tauri::{AppHandle, Runtime, Url, WebviewWindow};
use tauri_plugin_dialog::DialogExt;
use tauri_plugin_opener::OpenerExt;

use super::scripts;
use crate::error::{ShellError, ShellResult};

/// Completion of a script evaluation: `Err` carries the renderer's message.
pub type ScriptCallback = Box<dyn FnOnce(Result<(), String>) + Send>;

/// Answer of a file picker: selected paths, or `None` when cancelled.
pub type FilesCallback = Box<dyn FnOnce(Option<Vec<PathBuf>>) + Send>;

/// Answer of a directory picker.
pub type DirectoryCallback = Box<dyn FnOnce(Option<PathBuf>) + Send>;

/// The embedded renderer, seen from the controller.
///
/// `evaluate_script` may complete at any later time; callers must not rely on
/// the callback having run when it returns.
pub trait ContentSurface: Send {
    fn navigate(&self, url: &Url) -> ShellResult<()>;
    fn evaluate_script(&self, script: String, done: ScriptCallback);
    fn reload(&self) -> ShellResult<()>;
}

/// System default handler for URLs the shell will not load itself.
pub trait ExternalOpener: Send + Sync {
    fn open_external(&self, url: &Url) -> ShellResult<()>;
}

pub trait FilePicker: Send + Sync {
    fn pick_files(&self, allow_multiple: bool, done: FilesCallback);
    fn pick_directory(&self, done: DirectoryCallback);
}

/// Content surface backed by the main webview window.
pub struct WebviewSurface<R: Runtime> {
    window: WebviewWindow<R>,
}

impl<R: Runtime> WebviewSurface<R> {
    pub fn new(window: WebviewWindow<R>) -> Self {
        Self { window }
    }
}

impl<R: Runtime> ContentSurface for WebviewSurface<R> {
    fn navigate(&self, url: &Url) -> ShellResult<()> {
        self.window
            .navigate(url.clone())
            .map_err(|e| ShellError::NavigationError(e.to_string()))
    }

    // The webview callback is `Fn`; only its first call completes `done`.
    fn evaluate_script(&self, script: String, done: ScriptCallback) {
        let done = Arc::new(Mutex::new(Some(done)));
        let pending = Arc::clone(&done);
        let dispatched = self.window.eval_with_callback(script, move |raw| {
            if let Some(done) = pending.lock().take() {
                done(scripts::script_outcome(&raw));
            }
        });
        if let Err(e) = dispatched {
            if let Some(done) = done.lock().take() {
                done(Err(e.to_string()));
            }
        }
    }

    // Dispatched like any other script; querying the URL would block on the
    // event loop while the controller is locked.
    fn reload(&self) -> ShellResult<()> {
        self.window
            .eval("window.location.reload()")
            .map_err(|e| ShellError::NavigationError(e.to_string()))
    }
}

/// Opens URLs with `tauri-plugin-opener`.
pub struct SystemOpener<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> SystemOpener<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> ExternalOpener for SystemOpener<R> {
    fn open_external(&self, url: &Url) -> ShellResult<()> {
        self.app
            .opener()
            .open_url(url.as_str(), None::<&str>)
            .map_err(|e| ShellError::Other(format!("Failed to open {}: {}", url, e)))
    }
}

/// Native pickers from `tauri-plugin-dialog`.
pub struct DialogFilePicker<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> DialogFilePicker<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> FilePicker for DialogFilePicker<R> {
    fn pick_files(&self, allow_multiple: bool, done: FilesCallback) {
        let dialog = self.app.dialog().file();
        if allow_multiple {
            dialog.pick_files(move |files| {
                done(files.map(|files| files.into_iter().filter_map(|f| f.into_path().ok()).collect()))
            });
        } else {
            dialog.pick_file(move |file| {
                done(file.and_then(|f| f.into_path().ok()).map(|path| vec![path]))
            });
        }
    }

    fn pick_directory(&self, done: DirectoryCallback) {
        self.app
            .dialog()
            .file()
            .pick_folder(move |folder| done(folder.and_then(|f| f.into_path().ok())));
    }
}
