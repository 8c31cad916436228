//! User actions reachable from the tray, global shortcuts and other
//! instances.

use tauri::{AppHandle, Manager};

use super::AppState;
use crate::commands;
use crate::config::ShortcutAction;
use crate::error::ShellResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellAction {
    ToggleWindow,
    ShowWindow,
    ReloadContent,
    ToggleCustomization,
    ToggleAlwaysOnTop,
    ToggleLaunchAtLogin,
    OpenPreferences,
    Quit,
}

impl ShellAction {
    const MENU_ACTIONS: [ShellAction; 8] = [
        ShellAction::ToggleWindow,
        ShellAction::ShowWindow,
        ShellAction::ReloadContent,
        ShellAction::ToggleCustomization,
        ShellAction::ToggleAlwaysOnTop,
        ShellAction::ToggleLaunchAtLogin,
        ShellAction::OpenPreferences,
        ShellAction::Quit,
    ];

    pub fn menu_id(self) -> &'static str {
        match self {
            ShellAction::ToggleWindow => "toggle_window",
            ShellAction::ShowWindow => "show_window",
            ShellAction::ReloadContent => "reload",
            ShellAction::ToggleCustomization => "custom_stylesheet",
            ShellAction::ToggleAlwaysOnTop => "always_on_top",
            ShellAction::ToggleLaunchAtLogin => "launch_at_login",
            ShellAction::OpenPreferences => "preferences",
            ShellAction::Quit => "quit",
        }
    }

    pub fn from_menu_id(id: &str) -> Option<Self> {
        Self::MENU_ACTIONS.into_iter().find(|a| a.menu_id() == id)
    }
}

impl From<ShortcutAction> for ShellAction {
    fn from(action: ShortcutAction) -> Self {
        match action {
            ShortcutAction::ToggleWindow => ShellAction::ToggleWindow,
            ShortcutAction::RefreshContent => ShellAction::ReloadContent,
        }
    }
}

/// Run `action` off the calling thread, then refresh the tray menu.
///
/// Tray and shortcut handlers run on the event loop; creating a webview
/// window from there deadlocks on Windows.
pub fn perform(app: &AppHandle, action: ShellAction) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        if let Err(e) = run(&app, action) {
            log::error!("[SHELL] {:?} failed: {}", action, e);
        }
        if action != ShellAction::Quit {
            super::refresh_tray(&app);
        }
    });
}

fn run(app: &AppHandle, action: ShellAction) -> ShellResult<()> {
    let state = app.state::<AppState>();
    match action {
        ShellAction::ToggleWindow => state.shell.lock().toggle_window(),
        ShellAction::ShowWindow => state.shell.lock().show_window(),
        ShellAction::ReloadContent => {
            state.shell.lock().reload_content();
            Ok(())
        },
        ShellAction::ToggleCustomization => {
            // The store notifies the content controller; no shell lock here.
            state.preferences.toggle_enabled().map(|_| ())
        },
        ShellAction::ToggleAlwaysOnTop => state.shell.lock().toggle_always_on_top().map(|_| ()),
        ShellAction::ToggleLaunchAtLogin => {
            state.shell.lock().toggle_launch_at_login();
            Ok(())
        },
        ShellAction::OpenPreferences => commands::window::open_settings_window(app),
        ShellAction::Quit => {
            state.shell.lock().quit();
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_ids_round_trip_and_are_unique() {
        let mut ids: Vec<&str> = ShellAction::MENU_ACTIONS.iter().map(|a| a.menu_id()).collect();
        for action in ShellAction::MENU_ACTIONS {
            assert_eq!(ShellAction::from_menu_id(action.menu_id()), Some(action));
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), ShellAction::MENU_ACTIONS.len());
    }

    #[test]
    fn test_unknown_menu_id() {
        assert_eq!(ShellAction::from_menu_id("capture"), None);
    }

    #[test]
    fn test_shortcut_actions_map_to_shell_actions() {
        assert_eq!(ShellAction::from(ShortcutAction::ToggleWindow), ShellAction::ToggleWindow);
        assert_eq!(ShellAction::from(ShortcutAction::RefreshContent), ShellAction::ReloadContent);
    }
}
