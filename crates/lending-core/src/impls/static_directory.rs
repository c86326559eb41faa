//! StaticDirectory - 固定データの Directory 実装（開発・テスト用）

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::UserId;
use crate::ports::{Directory, DirectoryError};

/// Directory backed by a fixed user→address map and a fixed admin list.
///
/// 本物の identity provider はこのコアの外。デモとテストには
/// 起動時に組み立てる固定データで足りる。
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    emails: HashMap<UserId, String>,
    admins: Vec<UserId>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one user's mail address.
    pub fn with_user(mut self, user_id: UserId, address: impl Into<String>) -> Self {
        self.emails.insert(user_id, address.into());
        self
    }

    /// Register the staff members that receive admin fan-out.
    pub fn with_admins(mut self, admins: impl IntoIterator<Item = UserId>) -> Self {
        self.admins.extend(admins);
        self
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn email_of(&self, user_id: UserId) -> Result<Option<String>, DirectoryError> {
        Ok(self.emails.get(&user_id).cloned())
    }

    async fn admin_ids(&self) -> Result<Vec<UserId>, DirectoryError> {
        Ok(self.admins.clone())
    }
}
