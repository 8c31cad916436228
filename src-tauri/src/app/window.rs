//! Tauri implementation of the shell platform: the main webview window,
//! launch-at-login registration and quitting.

use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_window_state::{AppHandleExt, StateFlags};

use super::shell::{CreatedWindow, ShellPlatform, ShellWindow};
use super::AppState;
use crate::content::{handle_navigation_hook, navigation, scripts, WebviewSurface};
use crate::error::{ShellError, ShellResult};

pub const MAIN_WINDOW_LABEL: &str = "main";

/// Frame flags persisted across launches. Visibility stays with the shell.
pub fn window_state_flags() -> StateFlags {
    StateFlags::all() & !StateFlags::VISIBLE
}

pub struct MainWindow {
    window: WebviewWindow,
}

impl ShellWindow for MainWindow {
    fn is_visible(&self) -> bool {
        self.window.is_visible().unwrap_or(false)
    }

    fn show(&self) -> ShellResult<()> {
        self.window.show()?;
        self.window.unminimize()?;
        self.window.set_focus()?;
        Ok(())
    }

    fn hide(&self) -> ShellResult<()> {
        if let Err(e) = self.window.app_handle().save_window_state(window_state_flags()) {
            log::warn!("[SHELL] Failed to save window state: {}", e);
        }
        self.window.hide()?;
        Ok(())
    }

    fn set_always_on_top(&self, always_on_top: bool) -> ShellResult<()> {
        self.window.set_always_on_top(always_on_top)?;
        Ok(())
    }
}

pub struct TauriShellPlatform {
    app: AppHandle,
}

impl TauriShellPlatform {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn build_main_window(&self) -> ShellResult<WebviewWindow> {
        let nav_app = self.app.clone();
        let load_app = self.app.clone();

        let window = WebviewWindowBuilder::new(
            &self.app,
            MAIN_WINDOW_LABEL,
            WebviewUrl::External(navigation::home_url()),
        )
        .title("DeepSeek")
        .inner_size(1100.0, 780.0)
        .min_inner_size(480.0, 400.0)
        .visible(false)
        .initialization_script(&scripts::link_activation_bridge())
        .on_navigation(move |url| {
            let Some(state) = nav_app.try_state::<AppState>() else {
                return true;
            };
            let mut content = state.content.lock();
            handle_navigation_hook(&mut content, url)
        })
        .on_page_load(move |_webview, payload| {
            let Some(state) = load_app.try_state::<AppState>() else {
                return;
            };
            let mut content = state.content.lock();
            match payload.event() {
                PageLoadEvent::Started => content.navigation_started(),
                PageLoadEvent::Finished => content.navigation_finished(),
            }
        })
        .build()
        .map_err(|e| ShellError::WindowError(format!("Failed to create main window: {}", e)))?;

        Ok(window)
    }
}

impl ShellPlatform for TauriShellPlatform {
    fn create_window(&self) -> ShellResult<CreatedWindow> {
        let window = match self.app.get_webview_window(MAIN_WINDOW_LABEL) {
            Some(existing) => existing,
            None => self.build_main_window()?,
        };
        Ok(CreatedWindow {
            window: Box::new(MainWindow {
                window: window.clone(),
            }),
            surface: Box::new(WebviewSurface::new(window)),
        })
    }

    #[cfg(desktop)]
    fn set_launch_at_login(&self, enabled: bool) -> ShellResult<()> {
        use tauri_plugin_autostart::ManagerExt;

        let autolaunch = self.app.autolaunch();
        let result = if enabled {
            autolaunch.enable()
        } else {
            autolaunch.disable()
        };
        result.map_err(|e| ShellError::AutostartError(e.to_string()))
    }

    #[cfg(not(desktop))]
    fn set_launch_at_login(&self, _enabled: bool) -> ShellResult<()> {
        Err(ShellError::AutostartError("unsupported platform".to_string()))
    }

    fn quit(&self) {
        if let Err(e) = self.app.save_window_state(window_state_flags()) {
            log::warn!("[SHELL] Failed to save window state: {}", e);
        }
        self.app.exit(0);
    }
}
