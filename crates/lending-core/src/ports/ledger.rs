//! LedgerStore port - borrow record の正本（source of truth）
//!
//! すべての状態変更はここを通ります：
//! - `insert` は open-pair 不変条件のチェックと不可分（atomic）
//! - `compare_and_transition` は状態遷移の単一チョークポイント
//!
//! # 設計原則
//! - record の直接 update は存在しない（raw update 禁止）
//! - 同時リクエストの勝敗はこの層で決まり、負けた側は
//!   `Conflict` / `InvalidTransition` を観測する

use async_trait::async_trait;

use crate::domain::{BorrowId, BorrowRecord, BorrowStatus, LendingResult};
use crate::observability::LedgerCounts;

/// Mutator applied inside the store's critical section.
///
/// 期待ステータスの一致を確認した後に呼ばれる。Err を返した場合は
/// 何もコミットされない（record は遷移前のまま）。
pub type Mutator = Box<dyn FnOnce(&mut BorrowRecord) -> LendingResult<()> + Send>;

/// LedgerStore は borrow record の状態・履歴の正本
///
/// v1 is in-memory, but this trait is the seam for swapping in a
/// database-backed implementation later (partial uniqueness constraint
/// over (user_id, book_id) scoped to open statuses).
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert a fresh record.
    ///
    /// Fails with `Conflict` if an open record already exists for the same
    /// (user_id, book_id) pair. The check and the insert are one atomic
    /// step: two concurrent inserts for the same pair cannot both win.
    async fn insert(&self, record: BorrowRecord) -> LendingResult<BorrowId>;

    /// Atomically transition one record.
    ///
    /// Reads the current record; if its status differs from `expected`,
    /// returns `InvalidTransition` without mutating. Otherwise applies
    /// `mutate` and commits. Returns the committed record.
    async fn compare_and_transition(
        &self,
        borrow_id: BorrowId,
        expected: BorrowStatus,
        mutate: Mutator,
    ) -> LendingResult<BorrowRecord>;

    /// Fetch one record. Fails with `NotFound` if absent.
    async fn get(&self, borrow_id: BorrowId) -> LendingResult<BorrowRecord>;

    /// Observability hook (optional but useful).
    async fn counts_by_status(&self) -> LendingResult<LedgerCounts>;
}
