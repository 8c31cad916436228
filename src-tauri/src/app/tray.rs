//! System tray: status item and its menu.
//!
//! There is no "menu will open" hook, so the menu is rebuilt from current
//! state whenever the pointer enters or clicks the tray icon, after every
//! action and on every preference change.

use tauri::{
    image::Image,
    menu::{CheckMenuItem, Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    App, AppHandle, Manager, Wry,
};

use super::actions::{self, ShellAction};
use super::AppState;
use crate::config::{ShortcutAction, ShortcutBindings};
use crate::error::{ShellError, ShellResult};

pub const TRAY_ID: &str = "deepseek-tray";

/// Inputs of the menu, read fresh each time it is built.
#[derive(Debug, Clone, Default)]
pub struct TraySnapshot {
    pub window_visible: bool,
    pub customization_enabled: bool,
    pub always_on_top: bool,
    pub launch_at_login: bool,
    pub bindings: ShortcutBindings,
}

impl TraySnapshot {
    /// `None` while the shell is busy, e.g. building the window. Tray events
    /// arrive on the main thread, which window creation waits on.
    pub fn capture(state: &AppState) -> Option<Self> {
        let shell = state.shell.try_lock()?;
        let customization_enabled = state.preferences.get().customization_enabled;
        let bindings = state.shortcuts.bindings();
        Some(Self {
            window_visible: shell.is_window_visible(),
            customization_enabled,
            always_on_top: shell.always_on_top(),
            launch_at_login: shell.launch_at_login(),
            bindings,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEntry {
    Item {
        action: ShellAction,
        label: String,
        accelerator: Option<String>,
    },
    Check {
        action: ShellAction,
        label: String,
        checked: bool,
    },
    Separator,
}

fn item(action: ShellAction, label: &str, accelerator: Option<&str>) -> TrayEntry {
    TrayEntry::Item {
        action,
        label: label.to_string(),
        accelerator: accelerator.map(str::to_string),
    }
}

fn check(action: ShellAction, label: &str, checked: bool) -> TrayEntry {
    TrayEntry::Check {
        action,
        label: label.to_string(),
        checked,
    }
}

pub fn menu_entries(snapshot: &TraySnapshot) -> Vec<TrayEntry> {
    let toggle_label = if snapshot.window_visible {
        "Hide DeepSeek"
    } else {
        "Show DeepSeek"
    };
    vec![
        item(
            ShellAction::ToggleWindow,
            toggle_label,
            snapshot.bindings.get(ShortcutAction::ToggleWindow),
        ),
        item(
            ShellAction::ReloadContent,
            "Reload",
            snapshot.bindings.get(ShortcutAction::RefreshContent),
        ),
        TrayEntry::Separator,
        check(
            ShellAction::ToggleCustomization,
            "Custom Stylesheet",
            snapshot.customization_enabled,
        ),
        check(
            ShellAction::ToggleAlwaysOnTop,
            "Always on Top",
            snapshot.always_on_top,
        ),
        check(
            ShellAction::ToggleLaunchAtLogin,
            "Launch at Login",
            snapshot.launch_at_login,
        ),
        TrayEntry::Separator,
        item(ShellAction::OpenPreferences, "Preferences...", None),
        item(ShellAction::Quit, "Quit DeepSeek", None),
    ]
}

fn build_menu<M: Manager<Wry>>(manager: &M, entries: &[TrayEntry]) -> ShellResult<Menu<Wry>> {
    let menu = Menu::new(manager)?;
    for entry in entries {
        match entry {
            TrayEntry::Item {
                action,
                label,
                accelerator,
            } => {
                // An accelerator the menu cannot display is dropped, not fatal.
                let menu_item = MenuItem::with_id(
                    manager,
                    action.menu_id(),
                    label,
                    true,
                    accelerator.as_deref(),
                )
                .or_else(|_| {
                    MenuItem::with_id(manager, action.menu_id(), label, true, None::<&str>)
                })?;
                menu.append(&menu_item)?;
            },
            TrayEntry::Check {
                action,
                label,
                checked,
            } => {
                let menu_item = CheckMenuItem::with_id(
                    manager,
                    action.menu_id(),
                    label,
                    true,
                    *checked,
                    None::<&str>,
                )?;
                menu.append(&menu_item)?;
            },
            TrayEntry::Separator => {
                menu.append(&PredefinedMenuItem::separator(manager)?)?;
            },
        }
    }
    Ok(menu)
}

/// Rebuild the tray menu from current state.
pub fn refresh(app: &AppHandle) -> ShellResult<()> {
    let Some(tray) = app.tray_by_id(TRAY_ID) else {
        return Ok(());
    };
    let Some(state) = app.try_state::<AppState>() else {
        return Ok(());
    };
    let Some(snapshot) = TraySnapshot::capture(&state) else {
        log::debug!("[TRAY] Shell busy, keeping current menu");
        return Ok(());
    };
    tray.set_menu(Some(build_menu(app, &menu_entries(&snapshot))?))?;
    Ok(())
}

/// Create the tray icon. Requires `AppState` to be managed.
pub fn init(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let state = app.state::<AppState>();
    let snapshot = TraySnapshot::capture(&state).unwrap_or_default();
    let menu = build_menu(app, &menu_entries(&snapshot))?;

    let tray_icon = Image::from_bytes(include_bytes!("../../icons/32x32.png"))
        .map_err(|e| ShellError::TrayError(format!("Failed to load tray icon: {}", e)))?;

    TrayIconBuilder::with_id(TRAY_ID)
        .icon(tray_icon)
        .tooltip("DeepSeek")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| match ShellAction::from_menu_id(event.id.as_ref()) {
            Some(action) => actions::perform(app, action),
            None => log::debug!("[TRAY] Unknown menu id {:?}", event.id),
        })
        .on_tray_icon_event(|tray, event| {
            let app = tray.app_handle();
            match event {
                TrayIconEvent::Click {
                    button: MouseButton::Left,
                    button_state: MouseButtonState::Up,
                    ..
                } => actions::perform(app, ShellAction::ToggleWindow),
                TrayIconEvent::Enter { .. } | TrayIconEvent::Click { .. } => {
                    if let Err(e) = refresh(app) {
                        log::warn!("[TRAY] Failed to refresh menu: {}", e);
                    }
                },
                _ => {},
            }
        })
        .build(app)?;

    Ok(())
}
