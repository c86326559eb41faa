//! Domain model (IDs, statuses, records, side-effect bundles, errors).
//!
//! モジュール構成:
//! - **ids**: phantom-typed ULID identifiers
//! - **status**: BorrowStatus state machine
//! - **record**: BorrowRecord（状態遷移の単一情報源）
//! - **approval**: 承認時に発行する capability token
//! - **bundle**: 遷移がコミットした後に配送される副作用の集合
//! - **notice**: 通知・監査の永続レコード
//! - **errors**: 呼び出し側に返す同期エラー

pub mod approval;
pub mod bundle;
pub mod errors;
pub mod ids;
pub mod notice;
pub mod record;
pub mod status;

pub use self::approval::ApprovalCode;
pub use self::bundle::{AuditEffect, EmailEffect, MailTemplate, NoticeEffect, SideEffectBundle};
pub use self::errors::{LendingError, LendingResult};
pub use self::ids::{ActivityId, BookId, BorrowId, NotificationId, UserId};
pub use self::notice::{AuditEntry, Notification};
pub use self::record::BorrowRecord;
pub use self::status::BorrowStatus;
