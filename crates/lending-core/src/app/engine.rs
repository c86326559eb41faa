//! BorrowEngine - 貸出ライフサイクルの状態機械
//!
//! すべての操作は同じ形をしている：
//! 1. 入力を検証する
//! 2. (現在状態, 操作, 入力) から新しいフィールド値を決める
//! 3. ledger に atomic にコミットする（失敗はそのまま呼び出し元へ）
//! 4. 成功したら side-effect bundle を 1 つ組み立てて enqueue する
//!
//! bundle の配送は呼び出し元の応答と完全に切り離されている。
//! Engine 自身は I/O をしない（directory の読みは配送側に寄せてある）。

use std::sync::Arc;

use chrono::Duration;

use super::dispatcher::DispatchHandle;
use crate::domain::{
    ApprovalCode, BookId, BorrowId, BorrowRecord, BorrowStatus, LendingError, LendingResult,
    MailTemplate, SideEffectBundle, UserId,
};
use crate::observability::LedgerCounts;
use crate::ports::{Clock, Directory, IdGenerator, LedgerStore};

/// Staff decision on a pending request.
///
/// 却下理由は Reject 側にしか存在しないので、
/// 「承認なのに理由が付く」という状態が型で作れない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject { reason: String },
}

/// Loan policy knobs.
///
/// v1: 固定の貸出期間のみ。将来は本のカテゴリ別などに広げられる。
#[derive(Debug, Clone)]
pub struct LoanPolicy {
    /// How long an approved loan runs before it is due.
    pub loan_period: Duration,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            loan_period: Duration::days(14),
        }
    }
}

/// The borrow-lifecycle engine.
///
/// Engine exclusively owns BorrowRecord state transitions; the ledger's
/// compare-and-transition is the only way a status ever changes.
pub struct BorrowEngine {
    ledger: Arc<dyn LedgerStore>,
    directory: Arc<dyn Directory>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    policy: LoanPolicy,
    effects: DispatchHandle,
}

impl BorrowEngine {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        directory: Arc<dyn Directory>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        policy: LoanPolicy,
        effects: DispatchHandle,
    ) -> Self {
        Self {
            ledger,
            directory,
            ids,
            clock,
            policy,
            effects,
        }
    }

    /// A patron asks to borrow a book.
    ///
    /// Fails with `Conflict` if an open record already exists for this
    /// (user, book) pair. 片方だけが勝つことは ledger が保証する。
    pub async fn request_borrow(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> LendingResult<BorrowRecord> {
        let now = self.clock.now();
        let record = BorrowRecord::new(self.ids.generate_borrow_id(), user_id, book_id, now);
        self.ledger.insert(record.clone()).await?;

        let bundle = SideEffectBundle::new()
            .notify(
                user_id,
                format!("Your borrow request for {book_id} was received."),
            )
            .notify_all(
                self.admins().await,
                format!("New borrow request for {book_id} is awaiting review."),
            )
            .audit(user_id, book_id, "borrow requested");
        self.effects.enqueue(bundle);

        Ok(record)
    }

    /// Staff decides a pending request.
    ///
    /// Approve mints a fresh approval code and stamps the due date;
    /// Reject requires a non-empty reason. Valid only while `Pending`.
    pub async fn decide_request(
        &self,
        borrow_id: BorrowId,
        decision: Decision,
    ) -> LendingResult<BorrowRecord> {
        let now = self.clock.now();

        let record = match decision {
            Decision::Approve => {
                let code = ApprovalCode::mint();
                let due_date = now + self.policy.loan_period;
                let committed = self
                    .ledger
                    .compare_and_transition(
                        borrow_id,
                        BorrowStatus::Pending,
                        Box::new(move |r| {
                            r.approve(code, due_date, now);
                            Ok(())
                        }),
                    )
                    .await?;
                self.effects.enqueue(self.approval_bundle(&committed));
                committed
            }
            Decision::Reject { reason } => {
                let reason = reason.trim().to_string();
                if reason.is_empty() {
                    return Err(LendingError::Validation(
                        "a rejection requires a non-empty reason".into(),
                    ));
                }
                let stored_reason = reason.clone();
                let committed = self
                    .ledger
                    .compare_and_transition(
                        borrow_id,
                        BorrowStatus::Pending,
                        Box::new(move |r| {
                            r.reject(stored_reason, now);
                            Ok(())
                        }),
                    )
                    .await?;
                self.effects.enqueue(self.rejection_bundle(&committed, &reason));
                committed
            }
        };

        Ok(record)
    }

    /// The patron wants to give the book back. Valid only while `Approved`.
    pub async fn request_return(&self, borrow_id: BorrowId) -> LendingResult<BorrowRecord> {
        let now = self.clock.now();
        let committed = self
            .ledger
            .compare_and_transition(
                borrow_id,
                BorrowStatus::Approved,
                Box::new(move |r| {
                    r.start_return(now);
                    Ok(())
                }),
            )
            .await?;

        let bundle = SideEffectBundle::new()
            .notify_all(
                self.admins().await,
                format!(
                    "Return requested for {} ({}).",
                    committed.book_id, committed.borrow_id
                ),
            )
            .audit(committed.user_id, committed.book_id, "return requested");
        self.effects.enqueue(bundle);

        Ok(committed)
    }

    /// Staff confirms the book is back. Valid only while `ReturnRequested`.
    ///
    /// 決定メール（approve/reject 用テンプレ）はここでは送らない。
    /// 返却確認は専用の in-app notice だけ。
    pub async fn confirm_return(&self, borrow_id: BorrowId) -> LendingResult<BorrowRecord> {
        let now = self.clock.now();
        let committed = self
            .ledger
            .compare_and_transition(
                borrow_id,
                BorrowStatus::ReturnRequested,
                Box::new(move |r| {
                    r.finish_return(now);
                    Ok(())
                }),
            )
            .await?;

        let bundle = SideEffectBundle::new()
            .notify(
                committed.user_id,
                format!("Your return of {} is confirmed.", committed.book_id),
            )
            .audit(committed.user_id, committed.book_id, "return confirmed");
        self.effects.enqueue(bundle);

        Ok(committed)
    }

    /// Policy hook: an approved loan whose due date elapsed becomes overdue.
    ///
    /// 呼び出しタイミング（cron か lazy か）は統合側の自由。
    /// Valid only while `Approved`, and only once `due_date` is in the past.
    pub async fn mark_overdue(&self, borrow_id: BorrowId) -> LendingResult<BorrowRecord> {
        let now = self.clock.now();
        let committed = self
            .ledger
            .compare_and_transition(
                borrow_id,
                BorrowStatus::Approved,
                Box::new(move |r| {
                    if !r.is_past_due(now) {
                        return Err(LendingError::Validation(
                            "loan is not past its due date".into(),
                        ));
                    }
                    r.mark_overdue(now);
                    Ok(())
                }),
            )
            .await?;

        let bundle = SideEffectBundle::new()
            .notify(
                committed.user_id,
                format!("Your loan of {} is overdue.", committed.book_id),
            )
            .notify_all(
                self.admins().await,
                format!(
                    "Loan {} of {} is overdue.",
                    committed.borrow_id, committed.book_id
                ),
            )
            .audit(committed.user_id, committed.book_id, "overdue");
        self.effects.enqueue(bundle);

        Ok(committed)
    }

    /// Fetch one record (read-only, for handlers).
    pub async fn get(&self, borrow_id: BorrowId) -> LendingResult<BorrowRecord> {
        self.ledger.get(borrow_id).await
    }

    /// Ledger counts per status (read-only, for status endpoints).
    pub async fn counts(&self) -> LendingResult<LedgerCounts> {
        self.ledger.counts_by_status().await
    }

    fn approval_bundle(&self, record: &BorrowRecord) -> SideEffectBundle {
        SideEffectBundle::new()
            .notify(
                record.user_id,
                format!("Your borrow request for {} was approved.", record.book_id),
            )
            .audit(record.user_id, record.book_id, "borrow approved")
            .mail(
                record.user_id,
                MailTemplate::BorrowApproved,
                serde_json::json!({
                    "book_id": record.book_id,
                    "approval_code": record.approval_code,
                    "due_date": record.due_date,
                }),
            )
    }

    fn rejection_bundle(&self, record: &BorrowRecord, reason: &str) -> SideEffectBundle {
        SideEffectBundle::new()
            .notify(
                record.user_id,
                format!(
                    "Your borrow request for {} was rejected: {reason}",
                    record.book_id
                ),
            )
            .audit(record.user_id, record.book_id, "borrow rejected")
            .mail(
                record.user_id,
                MailTemplate::BorrowRejected,
                serde_json::json!({
                    "book_id": record.book_id,
                    "reason": reason,
                }),
            )
    }

    /// Admin fan-out list.
    ///
    /// Lookup failure here must not fail the already-committed operation:
    /// 配送は best-effort なので、引けなければ空リストで続行する。
    async fn admins(&self) -> Vec<UserId> {
        match self.directory.admin_ids().await {
            Ok(admins) => admins,
            Err(err) => {
                tracing::warn!(error = %err, "admin lookup failed; skipping admin fan-out");
                Vec::new()
            }
        }
    }
}
