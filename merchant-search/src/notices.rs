//! Admin notices collected while loading and shown by the host.

use std::sync::Mutex;

use serde::Serialize;

/// Severity of a notice. Serialized as the CSS class the host renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    #[serde(rename = "type")]
    pub level: NoticeLevel,
    pub dismissible: bool,
}

/// Append-only list of notices.
#[derive(Debug, Default)]
pub struct AdminNotices {
    notices: Mutex<Vec<Notice>>,
}

impl AdminNotices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, message: impl Into<String>, level: NoticeLevel) {
        let notice = Notice {
            message: message.into(),
            level,
            dismissible: false,
        };
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notice);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.add(message, NoticeLevel::Error);
    }

    /// Snapshot of every notice added so far.
    pub fn all(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
