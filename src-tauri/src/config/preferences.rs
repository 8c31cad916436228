//! Customization preferences and their change channel.
//!
//! The store is constructed once at startup and shared by `Arc`. It keeps no
//! copy of the values: `get()` reads the backend every time, so the persisted
//! state is the only source of truth.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::backend::PreferenceBackend;
use crate::error::ShellResult;

pub(crate) const KEY_CUSTOMIZATION_ENABLED: &str = "customizationEnabled";
pub(crate) const KEY_STYLESHEET_DIRECTORY: &str = "stylesheetDirectory";
pub(crate) const KEY_HAS_RUN_BEFORE: &str = "hasRunBefore";

/// Directory name under the user's home used when nothing else is configured.
pub const DEFAULT_DIRECTORY_NAME: &str = ".DeepSeek";

/// Snapshot of the persisted customization preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Whether the user stylesheet is injected into the page.
    pub customization_enabled: bool,
    /// Directory searched for `custom.css`.
    pub stylesheet_directory: PathBuf,
}

impl Preferences {
    /// Compiled-in defaults, applied on first run only.
    pub fn defaults() -> Self {
        Self {
            customization_enabled: true,
            stylesheet_directory: default_stylesheet_directory(),
        }
    }
}

/// `~/.DeepSeek`, or a relative `.DeepSeek` if the home directory is unknown.
pub fn default_stylesheet_directory() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DIRECTORY_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIRECTORY_NAME))
}

/// Change notifications. Receivers re-read `PreferenceStore::get()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceEvent {
    CustomizationToggled,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(PreferenceEvent) + Send + Sync>;

pub struct PreferenceStore {
    backend: Arc<dyn PreferenceBackend>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: Mutex<u64>,
    // Serializes read-modify-write of the customization flag.
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    /// Open the store over `backend`, applying first-run defaults if the
    /// `hasRunBefore` marker is absent.
    ///
    /// Never fails: a backend that cannot save leaves the defaults in effect
    /// for this session and the failure is logged.
    pub fn open(backend: Arc<dyn PreferenceBackend>) -> Self {
        let store = Self {
            backend,
            listeners: Mutex::new(Vec::new()),
            next_listener: Mutex::new(0),
            write_lock: Mutex::new(()),
        };

        if store.is_first_run() {
            log::info!("[PREFS] First run, writing default preferences");
            let defaults = Preferences::defaults();
            store.backend.set(
                KEY_CUSTOMIZATION_ENABLED,
                Value::Bool(defaults.customization_enabled),
            );
            store.backend.set(
                KEY_STYLESHEET_DIRECTORY,
                path_value(&defaults.stylesheet_directory),
            );
            store.backend.set(KEY_HAS_RUN_BEFORE, Value::Bool(true));
            if let Err(e) = store.backend.save() {
                log::error!("[PREFS] Failed to persist first-run defaults: {}", e);
            }
        }

        store
    }

    fn is_first_run(&self) -> bool {
        !matches!(self.backend.get(KEY_HAS_RUN_BEFORE), Some(Value::Bool(true)))
    }

    /// Current persisted values; missing or mistyped entries fall back to the
    /// compiled-in defaults.
    pub fn get(&self) -> Preferences {
        let customization_enabled = match self.backend.get(KEY_CUSTOMIZATION_ENABLED) {
            Some(Value::Bool(enabled)) => enabled,
            _ => Preferences::defaults().customization_enabled,
        };
        let stylesheet_directory = match self.backend.get(KEY_STYLESHEET_DIRECTORY) {
            Some(Value::String(dir)) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_stylesheet_directory(),
        };

        Preferences {
            customization_enabled,
            stylesheet_directory,
        }
    }

    /// Set the customization flag.
    ///
    /// Returns `Ok(false)` without persisting or notifying when the value is
    /// unchanged. Otherwise the value is saved and every listener receives
    /// exactly one `CustomizationToggled` before this returns.
    pub fn set_enabled(&self, enabled: bool) -> ShellResult<bool> {
        {
            let _guard = self.write_lock.lock();
            if self.get().customization_enabled == enabled {
                return Ok(false);
            }
            self.write_enabled(enabled)?;
        }

        self.emit(PreferenceEvent::CustomizationToggled);
        Ok(true)
    }

    /// Flip the customization flag in one step and return the new value.
    /// Concurrent toggles each observe the previous one's write.
    pub fn toggle_enabled(&self) -> ShellResult<bool> {
        let enabled = {
            let _guard = self.write_lock.lock();
            let enabled = !self.get().customization_enabled;
            self.write_enabled(enabled)?;
            enabled
        };

        self.emit(PreferenceEvent::CustomizationToggled);
        Ok(enabled)
    }

    // Caller holds `write_lock`. A failed save restores the previous value so
    // reads never report a state that was not persisted.
    fn write_enabled(&self, enabled: bool) -> ShellResult<()> {
        self.backend
            .set(KEY_CUSTOMIZATION_ENABLED, Value::Bool(enabled));
        if let Err(e) = self.backend.save() {
            log::error!("[PREFS] Failed to save customizationEnabled: {}", e);
            self.backend
                .set(KEY_CUSTOMIZATION_ENABLED, Value::Bool(!enabled));
            return Err(e);
        }
        log::info!("[PREFS] customizationEnabled = {}", enabled);
        Ok(())
    }

    /// Persist the stylesheet directory. Always writes, never notifies; the
    /// new directory is used from the next injection on.
    pub fn set_directory(&self, directory: &Path) -> ShellResult<()> {
        let _guard = self.write_lock.lock();
        self.backend
            .set(KEY_STYLESHEET_DIRECTORY, path_value(directory));
        self.backend.save()?;
        log::info!("[PREFS] stylesheetDirectory = {}", directory.display());
        Ok(())
    }

    /// Register a listener for preference events.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(PreferenceEvent) + Send + Sync + 'static,
    {
        let id = {
            let mut next = self.next_listener.lock();
            *next += 1;
            ListenerId(*next)
        };
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.lock().retain(|(listener_id, _)| *listener_id != id);
    }

    // Listeners are cloned out so none of the store's locks is held while they
    // run; a listener may read the store or subscribe again.
    fn emit(&self, event: PreferenceEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}
