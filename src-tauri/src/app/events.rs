//! Window event handlers.

use tauri::{Manager, Window, WindowEvent};

use super::window::MAIN_WINDOW_LABEL;
use super::AppState;

/// Called from the builder's `on_window_event` hook.
pub fn handle_window_event(window: &Window, event: &WindowEvent) {
    match event {
        // Fix Windows resize lag by adding small delay
        // See: https://github.com/tauri-apps/tauri/issues/6322#issuecomment-2495685888
        #[cfg(target_os = "windows")]
        WindowEvent::Resized(_) => {
            std::thread::sleep(std::time::Duration::from_millis(1));
        },

        // The main window is never destroyed; closing it hides it.
        WindowEvent::CloseRequested { api, .. } if window.label() == MAIN_WINDOW_LABEL => {
            api.prevent_close();
            let app = window.app_handle();
            let hidden = app
                .try_state::<AppState>()
                .and_then(|state| state.shell.try_lock().map(|mut shell| shell.hide_window()));
            match hidden {
                Some(Err(e)) => log::error!("[SHELL] Failed to hide main window: {}", e),
                Some(Ok(())) => {},
                None => {
                    if let Err(e) = window.hide() {
                        log::error!("[SHELL] Failed to hide main window: {}", e);
                    }
                },
            }
            super::refresh_tray(app);
        },

        _ => {},
    }
}
