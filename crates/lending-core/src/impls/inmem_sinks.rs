//! In-memory notification sink and audit log.
//!
//! 開発・テスト用の追記先。書かれた record をそのまま保持し、
//! `snapshot()` でテストから覗ける。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{AuditEntry, BookId, Notification, UserId};
use crate::ports::{
    AuditLog, Clock, IdGenerator, NotificationSink, SinkError, SystemClock, UlidGenerator,
};

/// In-memory append-only notification store.
pub struct InMemoryNotificationSink {
    ids: UlidGenerator<SystemClock>,
    clock: SystemClock,
    notices: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self {
            ids: UlidGenerator::new(SystemClock),
            clock: SystemClock,
            notices: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Copy of everything written so far, in write order.
    pub async fn snapshot(&self) -> Vec<Notification> {
        self.notices.lock().await.clone()
    }

    /// Notices addressed to one user, in write order.
    pub async fn for_user(&self, user_id: UserId) -> Vec<Notification> {
        self.notices
            .lock()
            .await
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryNotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn write(&self, user_id: UserId, message: &str) -> Result<(), SinkError> {
        let notice = Notification::new(
            self.ids.generate_notification_id(),
            user_id,
            message,
            self.clock.now(),
        );
        self.notices.lock().await.push(notice);
        Ok(())
    }
}

/// In-memory append-only audit trail.
pub struct InMemoryAuditLog {
    ids: UlidGenerator<SystemClock>,
    clock: SystemClock,
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self {
            ids: UlidGenerator::new(SystemClock),
            clock: SystemClock,
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Copy of everything written so far, in write order.
    pub async fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn write(&self, user_id: UserId, book_id: BookId, action: &str) -> Result<(), SinkError> {
        let entry = AuditEntry::new(
            self.ids.generate_activity_id(),
            user_id,
            book_id,
            action,
            self.clock.now(),
        );
        self.entries.lock().await.push(entry);
        Ok(())
    }
}
