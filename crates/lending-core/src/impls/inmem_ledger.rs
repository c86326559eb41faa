//! In-memory ledger implementation.
//!
//! 本番では partial uniqueness constraint（open ステータスに限定した
//! (user_id, book_id) の一意制約）を持つ DB 実装に差し替える前提。
//! ここでは 1 つの lock の中で check + write を終わらせることで
//! 同じ原子性を作る。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{BookId, BorrowId, BorrowRecord, BorrowStatus, LendingError, LendingResult, UserId};
use crate::observability::LedgerCounts;
use crate::ports::{LedgerStore, Mutator};

/// In-memory ledger state.
struct LedgerState {
    /// All borrow records (single source of truth).
    records: HashMap<BorrowId, BorrowRecord>,

    /// (user, book) pairs that currently have an open record.
    ///
    /// records から再計算できる索引だが、insert 時の存在チェックを
    /// O(1) にするために持つ。遷移のたびにここで更新する。
    open_pairs: HashSet<(UserId, BookId)>,
}

impl LedgerState {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            open_pairs: HashSet::new(),
        }
    }

    /// Keep the open-pair index in sync after a record changed status.
    fn reindex(&mut self, pair: (UserId, BookId), was_open: bool, is_open: bool) {
        match (was_open, is_open) {
            (true, false) => {
                self.open_pairs.remove(&pair);
            }
            (false, true) => {
                self.open_pairs.insert(pair);
            }
            _ => {}
        }
    }

    fn counts_by_status(&self) -> LedgerCounts {
        let mut counts = LedgerCounts::default();
        for record in self.records.values() {
            counts.record(record.status);
        }
        counts
    }
}

/// In-memory ledger implementation.
///
/// `insert` と `compare_and_transition` は 1 回の lock 取得の中で
/// 検証と書き込みを終える。これで二重借出・二重決定の両方の
/// レースが閉じる（負けた側は Conflict / InvalidTransition を見る）。
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState::new())),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn insert(&self, record: BorrowRecord) -> LendingResult<BorrowId> {
        let mut state = self.state.lock().await;

        let pair = (record.user_id, record.book_id);
        if record.status.is_open() && state.open_pairs.contains(&pair) {
            return Err(LendingError::Conflict {
                user_id: record.user_id,
                book_id: record.book_id,
            });
        }
        if state.records.contains_key(&record.borrow_id) {
            return Err(LendingError::Validation(format!(
                "duplicate borrow id: {}",
                record.borrow_id
            )));
        }

        let borrow_id = record.borrow_id;
        if record.status.is_open() {
            state.open_pairs.insert(pair);
        }
        state.records.insert(borrow_id, record);
        Ok(borrow_id)
    }

    async fn compare_and_transition(
        &self,
        borrow_id: BorrowId,
        expected: BorrowStatus,
        mutate: Mutator,
    ) -> LendingResult<BorrowRecord> {
        let mut state = self.state.lock().await;

        let record = state
            .records
            .get(&borrow_id)
            .ok_or(LendingError::NotFound(borrow_id))?;

        if record.status != expected {
            return Err(LendingError::InvalidTransition {
                borrow_id,
                expected,
                actual: record.status,
            });
        }

        // mutate が Err を返したら何もコミットしない
        let was_open = record.status.is_open();
        let mut updated = record.clone();
        mutate(&mut updated)?;

        let pair = (updated.user_id, updated.book_id);
        let is_open = updated.status.is_open();
        state.reindex(pair, was_open, is_open);
        state.records.insert(borrow_id, updated.clone());
        Ok(updated)
    }

    async fn get(&self, borrow_id: BorrowId) -> LendingResult<BorrowRecord> {
        let state = self.state.lock().await;
        state
            .records
            .get(&borrow_id)
            .cloned()
            .ok_or(LendingError::NotFound(borrow_id))
    }

    async fn counts_by_status(&self) -> LendingResult<LedgerCounts> {
        let state = self.state.lock().await;
        Ok(state.counts_by_status())
    }
}
