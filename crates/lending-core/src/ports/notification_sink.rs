//! NotificationSink port - in-app 通知の追記先
//!
//! Engine/dispatcher は書くだけ。既読管理・一覧・削除は通知モジュール側
//! （このコアの外）のライフサイクル。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::UserId;

/// Failure writing to an append-only sink.
///
/// 配送ポリシー上は log-and-drop の対象：状態遷移の成否判断に使ってはいけない。
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink write failed: {0}")]
    WriteFailed(String),
}

/// NotificationSink は user ごとの in-app notice を追記する
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Append one notice for one user.
    async fn write(&self, user_id: UserId, message: &str) -> Result<(), SinkError>;
}
