//! User-visible notices.
//!
//! Customization failures are never fatal; they end up here as a single modal
//! message naming what went wrong.

use tauri::{AppHandle, Runtime};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Shows notices as native message dialogs.
pub struct DialogNotifier<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> DialogNotifier<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> Notifier for DialogNotifier<R> {
    fn notify(&self, notice: Notice) {
        log::warn!("[NOTICE] {}: {}", notice.title, notice.message);

        let kind = match notice.kind {
            NoticeKind::Warning => MessageDialogKind::Warning,
            NoticeKind::Error => MessageDialogKind::Error,
        };
        // Non-blocking: the dialog resolves on the UI thread.
        self.app
            .dialog()
            .message(notice.message)
            .title(notice.title)
            .kind(kind)
            .show(|_| {});
    }
}
