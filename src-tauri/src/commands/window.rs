//! Preferences window.

use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder};

use crate::error::{ShellError, ShellResult};

/// Preferences window label. Only this window is granted IPC access.
pub(crate) const SETTINGS_WINDOW_LABEL: &str = "settings";

/// Show the preferences window, creating it if it doesn't exist.
pub fn open_settings_window(app: &AppHandle) -> ShellResult<()> {
    if let Some(window) = app.get_webview_window(SETTINGS_WINDOW_LABEL) {
        window.show()?;
        window.unminimize()?;
        window.set_focus()?;
        return Ok(());
    }

    WebviewWindowBuilder::new(
        app,
        SETTINGS_WINDOW_LABEL,
        WebviewUrl::App("settings.html".into()),
    )
    .title("DeepSeek Preferences")
    .inner_size(520.0, 460.0)
    .min_inner_size(440.0, 380.0)
    .resizable(true)
    .maximizable(false)
    .center()
    .visible(true)
    .focused(true)
    .build()
    .map_err(|e| ShellError::WindowError(format!("Failed to create settings window: {}", e)))?;

    Ok(())
}
