//! Borrow status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a borrow record.
///
/// State transitions:
/// - Pending -> Approved | Rejected
/// - Approved -> ReturnRequested -> Returned
/// - Approved -> Overdue (due date elapsed without a return)
/// - Rejected / Returned are terminal (no further transitions)
///
/// Design note: Using an enum ensures exhaustive matching and prevents
/// invalid states. Illegal transitions are rejected centrally by the
/// ledger's compare-and-transition, never by string comparison in handlers.
///
/// シリアライズは SCREAMING_SNAKE_CASE（PENDING / RETURN_REQUESTED など）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowStatus {
    /// Requested by a patron, waiting for a staff decision.
    Pending,

    /// Approved by staff; the book is out on loan.
    Approved,

    /// Rejected by staff (terminal).
    Rejected,

    /// Patron asked to give the book back, waiting for staff confirmation.
    ReturnRequested,

    /// Return confirmed by staff (terminal).
    Returned,

    /// Approved loan whose due date elapsed without a return.
    Overdue,
}

impl BorrowStatus {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, BorrowStatus::Rejected | BorrowStatus::Returned)
    }

    /// Is this an "open" state for the (user, book) uniqueness invariant?
    ///
    /// 同じ (user, book) の組に対して open な record は同時に 1 件まで。
    /// Overdue は貸出パイプラインを既に抜けているので open には含めない
    /// （再借出のブロックは別のポリシーの仕事）。
    pub fn is_open(self) -> bool {
        matches!(
            self,
            BorrowStatus::Pending | BorrowStatus::Approved | BorrowStatus::ReturnRequested
        )
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BorrowStatus::Pending => "PENDING",
            BorrowStatus::Approved => "APPROVED",
            BorrowStatus::Rejected => "REJECTED",
            BorrowStatus::ReturnRequested => "RETURN_REQUESTED",
            BorrowStatus::Returned => "RETURNED",
            BorrowStatus::Overdue => "OVERDUE",
        };
        f.write_str(s)
    }
}
