//! User-visible notifications.
//!
//! Every user action that fails produces exactly one [`Notice`] (validation
//! errors excepted, which are shown inline). How a notice is presented
//! (blocking dialog, toast) is up to the renderer behind [`Notifier`].

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::{log_info, log_warn};

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    // ---
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: crate::messages::TITLE_SUCCESS.to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: crate::messages::TITLE_ERROR.to_string(),
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: crate::messages::TITLE_INFO.to_string(),
            message: message.into(),
        }
    }
}

/// Presents notices to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

pub type NotifierPtr = Arc<dyn Notifier>;

/// Keeps every notice for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    // ---
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        lock_ignore_poison(&self.notices).clone()
    }

    pub fn last(&self) -> Option<Notice> {
        lock_ignore_poison(&self.notices).last().cloned()
    }

    /// Drain the recorded notices.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *lock_ignore_poison(&self.notices))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        lock_ignore_poison(&self.notices).push(notice);
    }
}

/// Writes notices to the log. Used when no renderer is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => log_warn!("{}: {}", notice.title, notice.message),
            NoticeKind::Success | NoticeKind::Info => log_info!("{}: {}", notice.title, notice.message),
        }
    }
}
