//! Global shortcut registration through `tauri-plugin-global-shortcut`.

use tauri::{AppHandle, Manager};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutEvent, ShortcutState};

use super::actions::{self, ShellAction};
use super::AppState;
use crate::config::{ShortcutAction, ShortcutBindings};
use crate::error::{ShellError, ShellResult};

pub fn parse(accelerator: &str) -> ShellResult<Shortcut> {
    accelerator
        .parse::<Shortcut>()
        .map_err(|e| ShellError::InvalidShortcut {
            accelerator: accelerator.to_string(),
            reason: e.to_string(),
        })
}

/// The action bound to `shortcut`, if any. Unparsable bindings match nothing.
pub fn action_for(bindings: &ShortcutBindings, shortcut: &Shortcut) -> Option<ShortcutAction> {
    ShortcutAction::ALL.into_iter().find(|action| {
        bindings
            .get(*action)
            .and_then(|accel| parse(accel).ok())
            .is_some_and(|bound| bound.id() == shortcut.id())
    })
}

/// Plugin handler: dispatch presses of registered shortcuts.
pub fn handle(app: &AppHandle, shortcut: &Shortcut, event: ShortcutEvent) {
    if event.state() != ShortcutState::Pressed {
        return;
    }
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };
    match action_for(&state.shortcuts.bindings(), shortcut) {
        Some(action) => {
            log::debug!("[SHORTCUTS] {:?} triggered", action);
            actions::perform(app, ShellAction::from(action));
        },
        None => log::debug!("[SHORTCUTS] Unbound shortcut {:?}", shortcut),
    }
}

fn register(app: &AppHandle, accelerator: &str) -> ShellResult<()> {
    let shortcut = parse(accelerator)?;
    app.global_shortcut()
        .register(shortcut)
        .map_err(|e| ShellError::ShortcutError(format!("Failed to register {}: {}", accelerator, e)))
}

fn unregister(app: &AppHandle, accelerator: &str) {
    let Ok(shortcut) = parse(accelerator) else {
        return;
    };
    if let Err(e) = app.global_shortcut().unregister(shortcut) {
        log::debug!("[SHORTCUTS] {} was not registered: {}", accelerator, e);
    }
}

/// Register every stored binding. Failures (e.g. taken by another
/// application) are logged and skipped.
pub fn register_all(app: &AppHandle) {
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };
    let bindings = state.shortcuts.bindings();
    for action in ShortcutAction::ALL {
        if let Some(accelerator) = bindings.get(action) {
            match register(app, accelerator) {
                Ok(()) => log::info!("[SHORTCUTS] {:?} bound to {}", action, accelerator),
                Err(e) => log::warn!("[SHORTCUTS] {}", e),
            }
        }
    }
}

/// Store a new binding for `action` and swap the registration. If the new
/// shortcut cannot be registered the previous binding is restored.
pub fn rebind(
    app: &AppHandle,
    action: ShortcutAction,
    accelerator: Option<&str>,
) -> ShellResult<ShortcutBindings> {
    let state = app.state::<AppState>();
    let accelerator = accelerator.map(str::trim).filter(|a| !a.is_empty());
    if let Some(accel) = accelerator {
        parse(accel)?;
    }

    let previous = state.shortcuts.set(action, accelerator)?;
    if let Some(ref old) = previous {
        unregister(app, old);
    }
    if let Some(accel) = accelerator {
        if let Err(e) = register(app, accel) {
            log::warn!("[SHORTCUTS] Restoring previous binding for {:?}", action);
            state.shortcuts.set(action, previous.as_deref())?;
            if let Some(ref old) = previous {
                if let Err(restore) = register(app, old) {
                    log::error!("[SHORTCUTS] {}", restore);
                }
            }
            return Err(e);
        }
    }

    log::info!("[SHORTCUTS] {:?} rebound to {:?}", action, accelerator);
    Ok(state.shortcuts.bindings())
}
