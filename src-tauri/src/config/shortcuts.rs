//! Global shortcut bindings.
//!
//! Two named actions can be bound to a user-assigned accelerator. Bindings are
//! persisted under the `shortcuts` key and read fresh by every consumer (the
//! tray menu in particular never caches them).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::backend::PreferenceBackend;
use crate::error::{ShellError, ShellResult};

pub(crate) const KEY_SHORTCUTS: &str = "shortcuts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShortcutAction {
    ToggleWindow,
    RefreshContent,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 2] = [ShortcutAction::ToggleWindow, ShortcutAction::RefreshContent];

    pub fn default_accelerator(self) -> &'static str {
        match self {
            ShortcutAction::ToggleWindow => "CommandOrControl+Shift+D",
            ShortcutAction::RefreshContent => "CommandOrControl+Shift+R",
        }
    }
}

/// Accelerators per action. `None` means the user cleared the binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShortcutBindings {
    pub toggle_window: Option<String>,
    pub refresh_content: Option<String>,
}

impl Default for ShortcutBindings {
    fn default() -> Self {
        Self {
            toggle_window: Some(ShortcutAction::ToggleWindow.default_accelerator().to_string()),
            refresh_content: Some(
                ShortcutAction::RefreshContent
                    .default_accelerator()
                    .to_string(),
            ),
        }
    }
}

impl ShortcutBindings {
    pub fn get(&self, action: ShortcutAction) -> Option<&str> {
        match action {
            ShortcutAction::ToggleWindow => self.toggle_window.as_deref(),
            ShortcutAction::RefreshContent => self.refresh_content.as_deref(),
        }
    }

    fn slot_mut(&mut self, action: ShortcutAction) -> &mut Option<String> {
        match action {
            ShortcutAction::ToggleWindow => &mut self.toggle_window,
            ShortcutAction::RefreshContent => &mut self.refresh_content,
        }
    }
}

pub struct ShortcutStore {
    backend: Arc<dyn PreferenceBackend>,
}

impl ShortcutStore {
    pub fn new(backend: Arc<dyn PreferenceBackend>) -> Self {
        Self { backend }
    }

    /// Current bindings; an absent or unreadable entry yields the defaults.
    pub fn bindings(&self) -> ShortcutBindings {
        match self.backend.get(KEY_SHORTCUTS) {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                log::warn!("[SHORTCUTS] Ignoring unreadable bindings: {}", e);
                ShortcutBindings::default()
            }),
            None => ShortcutBindings::default(),
        }
    }

    pub fn get(&self, action: ShortcutAction) -> Option<String> {
        self.bindings().get(action).map(str::to_string)
    }

    /// Rebind `action`. Blank accelerators clear the binding. Returns the
    /// previous accelerator so the caller can unregister it.
    pub fn set(
        &self,
        action: ShortcutAction,
        accelerator: Option<&str>,
    ) -> ShellResult<Option<String>> {
        let accelerator = accelerator
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        let mut bindings = self.bindings();
        if let Some(ref wanted) = accelerator {
            let clash = ShortcutAction::ALL.iter().any(|other| {
                *other != action
                    && bindings
                        .get(*other)
                        .is_some_and(|bound| bound.eq_ignore_ascii_case(wanted))
            });
            if clash {
                return Err(ShellError::InvalidShortcut {
                    accelerator: wanted.clone(),
                    reason: "already bound to another action".to_string(),
                });
            }
        }

        let previous = std::mem::replace(bindings.slot_mut(action), accelerator);
        self.backend
            .set(KEY_SHORTCUTS, serde_json::to_value(&bindings)?);
        self.backend.save()?;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::backend::MemoryBackend;
    use serde_json::json;

    #[test]
    fn test_defaults_when_unset() {
        let store = ShortcutStore::new(Arc::new(MemoryBackend::new()));
        assert_eq!(
            store.get(ShortcutAction::ToggleWindow).as_deref(),
            Some("CommandOrControl+Shift+D")
        );
        assert_eq!(
            store.get(ShortcutAction::RefreshContent).as_deref(),
            Some("CommandOrControl+Shift+R")
        );
    }

    #[test]
    fn test_set_returns_previous_and_persists() {
        let backend = Arc::new(MemoryBackend::new());
        let store = ShortcutStore::new(backend.clone());

        let previous = store
            .set(ShortcutAction::ToggleWindow, Some("Alt+Shift+Space"))
            .unwrap();
        assert_eq!(previous.as_deref(), Some("CommandOrControl+Shift+D"));

        let reopened = ShortcutStore::new(backend);
        assert_eq!(
            reopened.get(ShortcutAction::ToggleWindow).as_deref(),
            Some("Alt+Shift+Space")
        );
    }

    #[test]
    fn test_blank_accelerator_clears_binding() {
        let store = ShortcutStore::new(Arc::new(MemoryBackend::new()));
        store.set(ShortcutAction::RefreshContent, Some("   ")).unwrap();
        assert_eq!(store.get(ShortcutAction::RefreshContent), None);
        // The other action keeps its default.
        assert!(store.get(ShortcutAction::ToggleWindow).is_some());
    }

    #[test]
    fn test_duplicate_accelerator_rejected() {
        let store = ShortcutStore::new(Arc::new(MemoryBackend::new()));
        let err = store
            .set(
                ShortcutAction::RefreshContent,
                Some("commandorcontrol+shift+d"),
            )
            .unwrap_err();
        assert!(matches!(err, ShellError::InvalidShortcut { .. }));
    }

    #[test]
    fn test_explicit_null_is_unbound_not_default() {
        let backend = Arc::new(MemoryBackend::with_entries([(
            KEY_SHORTCUTS,
            json!({ "toggleWindow": null }),
        )]));
        let store = ShortcutStore::new(backend);
        assert_eq!(store.get(ShortcutAction::ToggleWindow), None);
        assert_eq!(
            store.get(ShortcutAction::RefreshContent).as_deref(),
            Some("CommandOrControl+Shift+R")
        );
    }
}
