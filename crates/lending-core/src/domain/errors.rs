//! Error taxonomy for the borrow workflow.
//!
//! ここにあるのは呼び出し側が扱う同期エラーだけです。
//! 配送系の失敗（mail / sink）は dispatcher 内で閉じて、
//! コミット済みの状態遷移には決して波及させません。

use thiserror::Error;

use super::ids::{BookId, BorrowId, UserId};
use super::status::BorrowStatus;

/// Errors surfaced synchronously to the caller of an engine operation.
///
/// Propagation policy:
/// - すべて client error として呼び出し側にそのまま返す
/// - この層では自動リトライしない（呼び直しは安全：状態で冪等に弾かれる）
#[derive(Debug, Error)]
pub enum LendingError {
    /// An open borrow already exists for this (user, book) pair.
    #[error("open borrow already exists for {user_id} / {book_id}")]
    Conflict { user_id: UserId, book_id: BookId },

    /// The operation does not apply to the record's current status.
    #[error("{borrow_id}: expected status {expected}, but record is {actual}")]
    InvalidTransition {
        borrow_id: BorrowId,
        expected: BorrowStatus,
        actual: BorrowStatus,
    },

    /// Unknown borrow id.
    #[error("borrow record not found: {0}")]
    NotFound(BorrowId),

    /// A required input for the transition is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),
}

pub type LendingResult<T> = Result<T, LendingError>;
