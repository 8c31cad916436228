//! Central error types for DeepSeek Shell.
//!
//! All errors implement `Serialize` so Tauri commands can hand them to the
//! preferences page as plain messages.

use serde::Serialize;
use thiserror::Error;

/// Main error type for shell operations.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Reading or writing the preference store failed
    #[error("Preference store error: {0}")]
    PreferenceError(String),

    /// Filesystem operation failed
    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// Window creation or window management failed
    #[error("Window error: {0}")]
    WindowError(String),

    /// Tray icon or tray menu failed
    #[error("Tray error: {0}")]
    TrayError(String),

    /// Navigation request against the content surface failed
    #[error("Navigation failed: {0}")]
    NavigationError(String),

    /// Accelerator string could not be parsed
    #[error("Invalid shortcut '{accelerator}': {reason}")]
    InvalidShortcut { accelerator: String, reason: String },

    /// Global shortcut registration failed
    #[error("Shortcut error: {0}")]
    ShortcutError(String),

    /// Login item registration failed
    #[error("Autostart error: {0}")]
    AutostartError(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error bubbled up from the Tauri runtime
    #[error("Tauri error: {0}")]
    TauriError(#[from] tauri::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Implement Serialize for Tauri IPC compatibility.
/// Tauri requires errors to be serializable to send to the frontend.
impl Serialize for ShellError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<tauri_plugin_store::Error> for ShellError {
    fn from(err: tauri_plugin_store::Error) -> Self {
        ShellError::PreferenceError(err.to_string())
    }
}

impl From<String> for ShellError {
    fn from(msg: String) -> Self {
        ShellError::Other(msg)
    }
}

impl From<&str> for ShellError {
    fn from(msg: &str) -> Self {
        ShellError::Other(msg.to_string())
    }
}

/// Extension trait for adding context to Results.
///
/// Similar to anyhow's `Context` trait, this allows chaining context
/// information onto errors for better debugging.
///
/// # Example
/// ```ignore
/// use crate::error::{ResultExt, ShellResult};
///
/// fn read_marker() -> ShellResult<String> {
///     std::fs::read_to_string("marker").context("failed to read marker")
/// }
/// ```
pub trait ResultExt<T> {
    /// Add context to an error, converting it to ShellError::Other.
    fn context(self, msg: &str) -> ShellResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> ShellResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> ShellResult<T> {
        self.map_err(|e| ShellError::Other(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> ShellResult<T> {
        self.map_err(|e| ShellError::Other(format!("{}: {}", f(), e)))
    }
}

/// Type alias for Results using ShellError.
pub type ShellResult<T> = Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShellError::WindowError("no display".to_string());
        assert_eq!(err.to_string(), "Window error: no display");
    }

    #[test]
    fn test_error_serialization() {
        let err = ShellError::InvalidShortcut {
            accelerator: "Ctrl+Nope".to_string(),
            reason: "unknown key".to_string(),
        };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Invalid shortcut 'Ctrl+Nope': unknown key\"");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ShellError = io_err.into();
        assert!(matches!(err, ShellError::StorageError(_)));
    }

    #[test]
    fn test_from_string() {
        let err: ShellError = "test error".into();
        assert!(matches!(err, ShellError::Other(_)));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<(), &str> = Err("original error");
        let msg = result.context("operation failed").unwrap_err().to_string();
        assert!(msg.contains("operation failed"));
        assert!(msg.contains("original error"));
    }

    #[test]
    fn test_result_ext_with_context() {
        let result: Result<(), &str> = Err("inner");
        let msg = result
            .with_context(|| format!("ctx-{}", 42))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("ctx-42"));
        assert!(msg.contains("inner"));
    }

    #[test]
    fn test_result_ext_ok_passthrough() {
        let result: Result<i32, &str> = Ok(42);
        assert_eq!(result.context("should not appear").unwrap(), 42);
    }
}
