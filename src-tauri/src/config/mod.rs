//! Persisted user configuration.
//!
//! ## Architecture
//!
//! - `PreferenceStore`: customization flag and stylesheet directory, with a
//!   typed change channel that the content controller subscribes to.
//! - `ShortcutStore`: user-assignable accelerators for the global shortcuts.
//!
//! Both read through a shared `PreferenceBackend`, which in the running app is
//! the `tauri-plugin-store` file `preferences.json`. Neither keeps its own copy
//! of the values: every read goes back to the backend.

pub mod backend;
pub mod preferences;
pub mod shortcuts;

pub use backend::{MemoryBackend, PreferenceBackend, StoreBackend};
pub use preferences::{ListenerId, PreferenceEvent, PreferenceStore, Preferences};
pub use shortcuts::{ShortcutAction, ShortcutBindings, ShortcutStore};

/// File name of the preference store inside the app config directory.
pub const PREFERENCES_FILE: &str = "preferences.json";
