//! Side-effect bundle: what a committed transition owes the outside world.
//!
//! This module is architecture-agnostic: it does not assume channels,
//! tasks, or delivery order. It only defines the "shape" of the effects a
//! transition produces, so the engine stays free of I/O and tests can
//! assert on emitted bundles instead of on email delivery.

use serde::{Deserialize, Serialize};

use super::ids::{BookId, UserId};

/// Mail template selector. The mailer decides the actual rendering.
///
/// Borrow 決定（approve/reject）だけがメール対象。
/// 返却確認は別の in-app notice を使い、決定テンプレは流用しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailTemplate {
    BorrowApproved,
    BorrowRejected,
}

impl MailTemplate {
    pub fn as_str(self) -> &'static str {
        match self {
            MailTemplate::BorrowApproved => "borrow_approved",
            MailTemplate::BorrowRejected => "borrow_rejected",
        }
    }
}

/// One in-app notice to be written for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeEffect {
    pub user_id: UserId,
    pub message: String,
}

/// One audit-trail entry to be appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEffect {
    pub user_id: UserId,
    pub book_id: BookId,
    pub action: String,
}

/// One outbound mail. The address is resolved at delivery time through the
/// directory port; the engine only knows the recipient's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailEffect {
    pub user_id: UserId,
    pub template: MailTemplate,
    pub data: serde_json::Value,
}

/// The full set of effects produced by one committed transition.
///
/// Plain value, no I/O. Built purely from (前状態, 操作, 入力) after the
/// ledger commit succeeds, then handed to the dispatcher as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideEffectBundle {
    pub notices: Vec<NoticeEffect>,
    pub audits: Vec<AuditEffect>,
    pub emails: Vec<EmailEffect>,
}

impl SideEffectBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an in-app notice for `user_id`.
    pub fn notify(mut self, user_id: UserId, message: impl Into<String>) -> Self {
        self.notices.push(NoticeEffect {
            user_id,
            message: message.into(),
        });
        self
    }

    /// Add the same notice for every user in `user_ids` (admin fan-out).
    pub fn notify_all(
        mut self,
        user_ids: impl IntoIterator<Item = UserId>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        for user_id in user_ids {
            self.notices.push(NoticeEffect {
                user_id,
                message: message.clone(),
            });
        }
        self
    }

    /// Append an audit entry.
    pub fn audit(mut self, user_id: UserId, book_id: BookId, action: impl Into<String>) -> Self {
        self.audits.push(AuditEffect {
            user_id,
            book_id,
            action: action.into(),
        });
        self
    }

    /// Queue a mail for `user_id`.
    pub fn mail(mut self, user_id: UserId, template: MailTemplate, data: serde_json::Value) -> Self {
        self.emails.push(EmailEffect {
            user_id,
            template,
            data,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty() && self.audits.is_empty() && self.emails.is_empty()
    }
}
