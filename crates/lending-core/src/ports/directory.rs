//! Directory port - identity provider の読み取り専用 seam
//!
//! 認証・セッションはこのコアの外。ここにあるのは配送に必要な
//! 2 つの読み取りだけ：誰が admin か、user の宛先メールは何か。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::UserId;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory lookup failed: {0}")]
    LookupFailed(String),
}

/// Directory は user のメールアドレスと admin 集合を引く
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve the mail address of a user, if they have one.
    async fn email_of(&self, user_id: UserId) -> Result<Option<String>, DirectoryError>;

    /// Every staff member that should receive admin fan-out notices.
    async fn admin_ids(&self) -> Result<Vec<UserId>, DirectoryError>;
}
