//! Commands behind the preferences window.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use serde::Serialize;
use tauri::{command, AppHandle, State};
use tauri_plugin_opener::OpenerExt;

use crate::app::AppState;
use crate::config::preferences::default_stylesheet_directory;
use crate::config::{Preferences, ShortcutAction, ShortcutBindings};
use crate::content::stylesheet::stylesheet_path;
use crate::content::{DialogFilePicker, FilePicker};
use crate::error::{ResultExt, ShellError, ShellResult};

/// Preferences as shown in the preferences window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesView {
    pub customization_enabled: bool,
    pub stylesheet_directory: String,
    pub stylesheet_file: String,
    pub default_directory: String,
}

impl From<Preferences> for PreferencesView {
    fn from(prefs: Preferences) -> Self {
        Self {
            customization_enabled: prefs.customization_enabled,
            stylesheet_file: stylesheet_path(&prefs.stylesheet_directory)
                .to_string_lossy()
                .to_string(),
            stylesheet_directory: prefs.stylesheet_directory.to_string_lossy().to_string(),
            default_directory: default_stylesheet_directory().to_string_lossy().to_string(),
        }
    }
}

/// Resolve a directory typed by the user. `~` expands to the home directory;
/// anything else must already be absolute.
fn resolve_directory(input: &str, home: Option<&Path>) -> ShellResult<PathBuf> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ShellError::PreferenceError(
            "Stylesheet directory cannot be empty".to_string(),
        ));
    }

    let path = match (input.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') || rest.starts_with('\\') => {
            home.join(&rest[1..])
        },
        _ => PathBuf::from(input),
    };

    if !path.is_absolute() {
        return Err(ShellError::PreferenceError(format!(
            "Stylesheet directory must be an absolute path: {}",
            input
        )));
    }
    Ok(path)
}

#[command]
pub fn get_preferences(state: State<'_, AppState>) -> PreferencesView {
    state.preferences.get().into()
}

/// Returns whether the value changed.
#[command]
pub fn set_customization_enabled(state: State<'_, AppState>, enabled: bool) -> Result<bool, ShellError> {
    state.preferences.set_enabled(enabled)
}

/// Store the staged directory. Takes effect on the next injection.
#[command]
pub fn save_stylesheet_directory(
    state: State<'_, AppState>,
    directory: String,
) -> Result<PreferencesView, ShellError> {
    let path = resolve_directory(&directory, dirs::home_dir().as_deref())?;
    state.preferences.set_directory(&path)?;
    log::info!("[PREFS] Stylesheet directory set to {:?}", path);
    Ok(state.preferences.get().into())
}

/// Browse for a directory. Only fills the staging field; nothing is saved.
#[command]
pub async fn pick_stylesheet_directory(app: AppHandle) -> Result<Option<String>, ShellError> {
    let (tx, rx) = mpsc::channel();
    DialogFilePicker::new(app).pick_directory(Box::new(move |folder| {
        let _ = tx.send(folder);
    }));

    let folder = tauri::async_runtime::spawn_blocking(move || rx.recv().ok().flatten()).await?;
    Ok(folder.map(|path| path.to_string_lossy().to_string()))
}

/// Open the saved stylesheet directory in the file manager.
#[command]
pub fn reveal_stylesheet_directory(app: AppHandle, state: State<'_, AppState>) -> Result<(), ShellError> {
    let directory = state.preferences.get().stylesheet_directory;
    if !directory.is_dir() {
        return Err(ShellError::Other(format!(
            "{} does not exist yet",
            directory.display()
        )));
    }
    app.opener()
        .open_path(directory.to_string_lossy(), None::<&str>)
        .with_context(|| format!("Failed to open {}", directory.display()))
}

#[command]
pub fn get_shortcuts(state: State<'_, AppState>) -> ShortcutBindings {
    state.shortcuts.bindings()
}

/// Rebind a global shortcut. `None` or blank clears it.
#[cfg(desktop)]
#[command]
pub fn set_shortcut(
    app: AppHandle,
    action: ShortcutAction,
    accelerator: Option<String>,
) -> Result<ShortcutBindings, ShellError> {
    let bindings = crate::app::shortcuts::rebind(&app, action, accelerator.as_deref())?;
    crate::app::refresh_tray(&app);
    Ok(bindings)
}

#[cfg(not(desktop))]
#[command]
pub fn set_shortcut(
    _action: ShortcutAction,
    _accelerator: Option<String>,
) -> Result<ShortcutBindings, ShellError> {
    Err(ShellError::ShortcutError("global shortcuts are not supported".to_string()))
}

/// Set launch at login. Returns the requested state, which is what the tray
/// shows even if registration failed.
#[command]
pub async fn set_autostart(
    app: AppHandle,
    state: State<'_, AppState>,
    enabled: bool,
) -> Result<bool, ShellError> {
    state.shell.lock().set_launch_at_login(enabled);
    crate::app::refresh_tray(&app);
    Ok(enabled)
}

#[command]
pub async fn is_autostart_enabled(state: State<'_, AppState>) -> Result<bool, ShellError> {
    Ok(state.shell.lock().launch_at_login())
}
