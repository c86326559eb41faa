//! AuditLog port - user+book をキーにした活動履歴の追記先

use async_trait::async_trait;

use super::notification_sink::SinkError;
use crate::domain::{BookId, UserId};

/// AuditLog は append-only の活動履歴
///
/// 追記しかないので insert 同士の競合はない。
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one activity entry.
    async fn write(&self, user_id: UserId, book_id: BookId, action: &str) -> Result<(), SinkError>;
}
