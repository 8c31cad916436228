//! Application lifecycle and platform integration.
//!
//! - `shell`: lazy main window, always-on-top and launch-at-login state
//! - `window`: Tauri implementation of the shell platform
//! - `actions`: user actions shared by tray, shortcuts and other instances
//! - `tray`: system tray setup and menu handling
//! - `shortcuts`: global shortcut registration
//! - `events`: window event handlers

use std::sync::Arc;

use parking_lot::Mutex;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_store::StoreExt;

use crate::config::{
    MemoryBackend, PreferenceBackend, PreferenceStore, ShortcutStore, StoreBackend,
    PREFERENCES_FILE,
};
use crate::commands::window::SETTINGS_WINDOW_LABEL;
use crate::content::{ContentController, DialogFilePicker, SharedContent, SystemOpener};
use crate::notice::DialogNotifier;

pub mod actions;
pub mod events;
pub mod shell;
pub mod window;

#[cfg(desktop)]
pub mod shortcuts;
#[cfg(desktop)]
pub mod tray;

pub use actions::{perform, ShellAction};
pub use shell::ShellController;

/// Emitted to the preferences window when a preference changes elsewhere.
pub const PREFERENCES_CHANGED_EVENT: &str = "preferences-changed";

/// Lock order: `shell` before `content`. The content controller never takes
/// the shell lock, and preference setters are never called with `shell` held.
pub struct AppState {
    pub preferences: Arc<PreferenceStore>,
    pub shortcuts: Arc<ShortcutStore>,
    pub content: SharedContent,
    pub shell: Mutex<ShellController>,
}

fn open_backend(app: &AppHandle) -> Arc<dyn PreferenceBackend> {
    match app.store(PREFERENCES_FILE) {
        Ok(store) => Arc::new(StoreBackend::new(store)),
        Err(e) => {
            log::error!(
                "[PREFS] Failed to open {}, preferences will not persist: {}",
                PREFERENCES_FILE,
                e
            );
            Arc::new(MemoryBackend::new())
        },
    }
}

#[cfg(desktop)]
fn registered_launch_at_login(app: &AppHandle) -> bool {
    use tauri_plugin_autostart::ManagerExt;

    app.autolaunch().is_enabled().unwrap_or_else(|e| {
        log::warn!("[SHELL] Could not query launch at login: {}", e);
        false
    })
}

#[cfg(not(desktop))]
fn registered_launch_at_login(_app: &AppHandle) -> bool {
    false
}

/// Rebuild the tray menu, logging failures.
#[cfg(desktop)]
pub fn refresh_tray(app: &AppHandle) {
    if let Err(e) = tray::refresh(app) {
        log::warn!("[TRAY] Failed to refresh menu: {}", e);
    }
}

#[cfg(not(desktop))]
pub fn refresh_tray(_app: &AppHandle) {}

/// Wire the stores and controllers together. The caller manages the result.
pub fn init_state(app: &AppHandle) -> AppState {
    let backend = open_backend(app);
    let preferences = Arc::new(PreferenceStore::open(Arc::clone(&backend)));
    let shortcuts = Arc::new(ShortcutStore::new(backend));

    let content: SharedContent = Arc::new(Mutex::new(ContentController::new(
        Arc::clone(&preferences),
        Arc::new(DialogNotifier::new(app.clone())),
        Arc::new(SystemOpener::new(app.clone())),
        Arc::new(DialogFilePicker::new(app.clone())),
    )));
    ContentController::subscribe(&content, &preferences);

    let handle = app.clone();
    preferences.subscribe(move |_| {
        refresh_tray(&handle);
        if handle.get_webview_window(SETTINGS_WINDOW_LABEL).is_some() {
            let _ = handle.emit_to(SETTINGS_WINDOW_LABEL, PREFERENCES_CHANGED_EVENT, ());
        }
    });

    let shell = ShellController::new(
        Box::new(window::TauriShellPlatform::new(app.clone())),
        Arc::clone(&content),
        registered_launch_at_login(app),
    );

    AppState {
        preferences,
        shortcuts,
        content,
        shell: Mutex::new(shell),
    }
}
