//! Approval code: capability token minted when a borrow is approved.

use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a minted code. Long enough that guessing is impractical.
const CODE_LEN: usize = 20;

/// ApprovalCode は承認時に発行される引換トークン
///
/// 表示用ラベルではなく capability として扱います：
/// - CSPRNG（`thread_rng`）から生成、推測不可能
/// - 連番・時刻ベースにしない
/// - Approved 以外の状態では record から消える
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalCode(String);

impl ApprovalCode {
    /// Mint a fresh unpredictable code.
    pub fn mint() -> Self {
        let code: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CODE_LEN)
            .map(char::from)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApprovalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
