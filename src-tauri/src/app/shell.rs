//! Shell lifecycle: the single window, always-on-top and launch-at-login.
//!
//! The window and its content surface are built on the first activation and
//! kept for the rest of the process; later activations only change
//! visibility and focus.

use crate::content::{ContentSurface, SharedContent};
use crate::error::{ShellError, ShellResult};

/// Window operations the shell needs.
pub trait ShellWindow: Send {
    fn is_visible(&self) -> bool;
    /// Show, unminimize and focus.
    fn show(&self) -> ShellResult<()>;
    /// Persist the frame, then hide.
    fn hide(&self) -> ShellResult<()>;
    fn set_always_on_top(&self, always_on_top: bool) -> ShellResult<()>;
}

/// A freshly built window and the content surface living in it.
pub struct CreatedWindow {
    pub window: Box<dyn ShellWindow>,
    pub surface: Box<dyn ContentSurface>,
}

/// Platform services behind the shell.
pub trait ShellPlatform: Send + Sync {
    fn create_window(&self) -> ShellResult<CreatedWindow>;
    fn set_launch_at_login(&self, enabled: bool) -> ShellResult<()>;
    fn quit(&self);
}

pub struct ShellController {
    platform: Box<dyn ShellPlatform>,
    content: SharedContent,
    window: Option<Box<dyn ShellWindow>>,
    always_on_top: bool,
    // Requested state; the registrar's success is not re-verified.
    launch_at_login: bool,
}

impl ShellController {
    pub fn new(platform: Box<dyn ShellPlatform>, content: SharedContent, launch_at_login: bool) -> Self {
        Self {
            platform,
            content,
            window: None,
            always_on_top: false,
            launch_at_login,
        }
    }

    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }

    pub fn is_window_visible(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.is_visible())
    }

    pub fn always_on_top(&self) -> bool {
        self.always_on_top
    }

    pub fn launch_at_login(&self) -> bool {
        self.launch_at_login
    }

    fn ensure_window(&mut self) -> ShellResult<&dyn ShellWindow> {
        if self.window.is_none() {
            log::info!("[SHELL] Creating main window");
            let created = self.platform.create_window()?;
            if self.always_on_top {
                created.window.set_always_on_top(true)?;
            }
            self.content.lock().attach(created.surface);
            self.window = Some(created.window);
        }
        self.window
            .as_deref()
            .ok_or_else(|| ShellError::WindowError("main window unavailable".to_string()))
    }

    /// Show the window if hidden (creating it on first use), hide it if
    /// visible.
    pub fn toggle_window(&mut self) -> ShellResult<()> {
        if self.is_window_visible() {
            self.hide_window()
        } else {
            self.show_window()
        }
    }

    pub fn show_window(&mut self) -> ShellResult<()> {
        self.ensure_window()?.show()
    }

    pub fn hide_window(&mut self) -> ShellResult<()> {
        match self.window.as_ref() {
            Some(window) => window.hide(),
            None => Ok(()),
        }
    }

    /// Reload the content surface. Nothing to reload before the first
    /// activation. Returns whether a reload was issued.
    pub fn reload_content(&mut self) -> bool {
        if self.window.is_none() {
            log::debug!("[SHELL] Reload requested before the window exists");
            return false;
        }
        self.content.lock().reload()
    }

    pub fn set_always_on_top(&mut self, always_on_top: bool) -> ShellResult<()> {
        if let Some(window) = self.window.as_ref() {
            window.set_always_on_top(always_on_top)?;
        }
        self.always_on_top = always_on_top;
        Ok(())
    }

    pub fn toggle_always_on_top(&mut self) -> ShellResult<bool> {
        let next = !self.always_on_top;
        self.set_always_on_top(next)?;
        Ok(next)
    }

    /// Ask the registrar for the new state. Failures are logged only; the
    /// requested state is what the menu shows.
    pub fn set_launch_at_login(&mut self, enabled: bool) {
        if let Err(e) = self.platform.set_launch_at_login(enabled) {
            log::error!("[SHELL] Failed to update launch at login: {}", e);
        }
        self.launch_at_login = enabled;
    }

    pub fn toggle_launch_at_login(&mut self) -> bool {
        let next = !self.launch_at_login;
        self.set_launch_at_login(next);
        next
    }

    pub fn quit(&self) {
        log::info!("[SHELL] Quitting");
        self.platform.quit();
    }
}
