//! In-app notification and audit-trail records.
//!
//! Engine はこれらを書くだけで読み返さない。
//! 既読管理や削除は通知モジュール側のライフサイクル（このコアの外）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ActivityId, BookId, NotificationId, UserId};

/// One in-app notice for one user. Created once, never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub message: String,

    /// Always false at creation; flipped later by the reader-side module.
    pub read: bool,

    pub time: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        notification_id: NotificationId,
        user_id: UserId,
        message: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            notification_id,
            user_id,
            message: message.into(),
            read: false,
            time,
        }
    }
}

/// Append-only activity trail entry, keyed by user + book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub activity_id: ActivityId,
    pub user_id: UserId,
    pub book_id: BookId,

    /// Free-text description, e.g. "Borrow request approved".
    pub action: String,

    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        activity_id: ActivityId,
        user_id: UserId,
        book_id: BookId,
        action: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            activity_id,
            user_id,
            book_id,
            action: action.into(),
            timestamp,
        }
    }
}
