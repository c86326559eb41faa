//! Status views for API responses and dashboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BookId, BorrowId, BorrowRecord, BorrowStatus, UserId};

/// Record counts per status across the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub return_requested: usize,
    pub returned: usize,
    pub overdue: usize,
}

impl LedgerCounts {
    /// Tally one record into the counts.
    pub fn record(&mut self, status: BorrowStatus) {
        match status {
            BorrowStatus::Pending => self.pending += 1,
            BorrowStatus::Approved => self.approved += 1,
            BorrowStatus::Rejected => self.rejected += 1,
            BorrowStatus::ReturnRequested => self.return_requested += 1,
            BorrowStatus::Returned => self.returned += 1,
            BorrowStatus::Overdue => self.overdue += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending
            + self.approved
            + self.rejected
            + self.return_requested
            + self.returned
            + self.overdue
    }
}

/// Serializable snapshot of one borrow record for API responses.
///
/// approval_code はここに出さない：capability であって表示用ラベルではない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowView {
    pub borrow_id: BorrowId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub status: BorrowStatus,
    pub borrow_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub returned: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&BorrowRecord> for BorrowView {
    fn from(record: &BorrowRecord) -> Self {
        Self {
            borrow_id: record.borrow_id,
            user_id: record.user_id,
            book_id: record.book_id,
            status: record.status,
            borrow_date: record.borrow_date,
            due_date: record.due_date,
            returned: record.returned,
            updated_at: record.updated_at,
        }
    }
}
