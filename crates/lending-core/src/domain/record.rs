//! Borrow record: the unit of state tracking one user's loan of one book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::approval::ApprovalCode;
use super::ids::{BookId, BorrowId, UserId};
use super::status::BorrowStatus;

/// One request by one user for one copy-slot of one book.
///
/// Design:
/// - This is the "single source of truth" for the borrow workflow state.
/// - All state transitions happen through the named methods below
///   (not direct field access), so the field discipline is kept in one
///   place: the code and the rejection reason never survive a transition
///   they don't belong to.
/// - Legality of a transition (正しい前状態かどうか) はここでは見ない。
///   それは ledger の compare_and_transition が一元的に弾く。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowRecord {
    pub borrow_id: BorrowId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub status: BorrowStatus,

    /// When the request was made (immutable after creation).
    pub borrow_date: DateTime<Utc>,

    /// Set by loan policy once approved.
    pub due_date: Option<DateTime<Utc>>,

    /// Becomes true only on entering Returned.
    pub returned: bool,

    /// Minted on approval, cleared on any other transition.
    pub approval_code: Option<ApprovalCode>,

    /// Set on rejection, cleared otherwise.
    pub rejection_reason: Option<String>,

    /// Timestamps for observability.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BorrowRecord {
    /// Create a fresh Pending record.
    pub fn new(borrow_id: BorrowId, user_id: UserId, book_id: BookId, now: DateTime<Utc>) -> Self {
        Self {
            borrow_id,
            user_id,
            book_id,
            status: BorrowStatus::Pending,
            borrow_date: now,
            due_date: None,
            returned: false,
            approval_code: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Approve: mint 済みの code と policy が決めた due date を受け取る。
    pub fn approve(&mut self, code: ApprovalCode, due_date: DateTime<Utc>, now: DateTime<Utc>) {
        self.status = BorrowStatus::Approved;
        self.approval_code = Some(code);
        self.due_date = Some(due_date);
        self.rejection_reason = None;
        self.updated_at = now;
    }

    /// Reject with a reason. The reason must be validated non-empty upstream.
    pub fn reject(&mut self, reason: String, now: DateTime<Utc>) {
        self.status = BorrowStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.approval_code = None;
        self.updated_at = now;
    }

    /// Patron asked to give the book back.
    pub fn start_return(&mut self, now: DateTime<Utc>) {
        self.status = BorrowStatus::ReturnRequested;
        self.approval_code = None;
        self.updated_at = now;
    }

    /// Staff confirmed the book is back on the shelf.
    pub fn finish_return(&mut self, now: DateTime<Utc>) {
        self.status = BorrowStatus::Returned;
        self.returned = true;
        self.approval_code = None;
        self.updated_at = now;
    }

    /// Due date elapsed without a return.
    pub fn mark_overdue(&mut self, now: DateTime<Utc>) {
        self.status = BorrowStatus::Overdue;
        self.approval_code = None;
        self.updated_at = now;
    }

    /// Is the due date in the past relative to `now`?
    ///
    /// Records without a due date (未承認など) are never past due.
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => now > due,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use ulid::Ulid;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()
    }

    fn pending_record(now: DateTime<Utc>) -> BorrowRecord {
        BorrowRecord::new(
            BorrowId::from_ulid(Ulid::new()),
            UserId::from_ulid(Ulid::new()),
            BookId::from_ulid(Ulid::new()),
            now,
        )
    }

    #[test]
    fn new_record_starts_pending() {
        let now = fixed_now();
        let record = pending_record(now);

        assert_eq!(record.status, BorrowStatus::Pending);
        assert_eq!(record.borrow_date, now);
        assert!(record.due_date.is_none());
        assert!(!record.returned);
        assert!(record.approval_code.is_none());
        assert!(record.rejection_reason.is_none());
    }

    #[test]
    fn approve_sets_code_and_due_date() {
        let now = fixed_now();
        let mut record = pending_record(now);
        let due = now + Duration::days(14);
        let later = now + Duration::minutes(5);

        record.approve(ApprovalCode::mint(), due, later);

        assert_eq!(record.status, BorrowStatus::Approved);
        assert!(record.approval_code.is_some());
        assert_eq!(record.due_date, Some(due));
        assert!(record.rejection_reason.is_none());
        assert_eq!(record.updated_at, later);
        // borrow_date は作成時のまま
        assert_eq!(record.borrow_date, now);
    }

    #[test]
    fn reject_stores_reason_and_clears_code() {
        let now = fixed_now();
        let mut record = pending_record(now);

        record.reject("damaged copy".to_string(), now);

        assert_eq!(record.status, BorrowStatus::Rejected);
        assert_eq!(record.rejection_reason.as_deref(), Some("damaged copy"));
        assert!(record.approval_code.is_none());
    }

    #[test]
    fn finish_return_sets_returned_flag() {
        let now = fixed_now();
        let mut record = pending_record(now);
        record.approve(ApprovalCode::mint(), now + Duration::days(14), now);
        record.start_return(now);

        assert_eq!(record.status, BorrowStatus::ReturnRequested);
        // 承認コードは返却フローに入った時点で無効
        assert!(record.approval_code.is_none());

        record.finish_return(now);
        assert_eq!(record.status, BorrowStatus::Returned);
        assert!(record.returned);
    }

    #[test]
    fn past_due_requires_a_due_date() {
        let now = fixed_now();
        let mut record = pending_record(now);
        assert!(!record.is_past_due(now + Duration::days(100)));

        record.approve(ApprovalCode::mint(), now + Duration::days(14), now);
        assert!(!record.is_past_due(now + Duration::days(14)));
        assert!(record.is_past_due(now + Duration::days(14) + Duration::seconds(1)));
    }
}
