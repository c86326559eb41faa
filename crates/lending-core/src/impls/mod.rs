//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryLedger**: 開発・テスト用の ledger（lock 1 回で check+write）
//! - **InMemoryNotificationSink / InMemoryAuditLog**: 追記先の記録用実装
//! - **RecordingMailer**: 送信内容を記録するだけの Mailer
//! - **StaticDirectory**: 固定データの identity lookup
//!
//! # 本番用実装
//! 本番用の実装は別クレートに配置します：
//! - DB-backed ledger（open ステータス限定の partial unique constraint）
//! - SMTP / API 連携の Mailer

pub mod inmem_ledger;
pub mod inmem_sinks;
pub mod recording_mailer;
pub mod static_directory;

// 主要な型を再エクスポート
pub use self::inmem_ledger::InMemoryLedger;
pub use self::inmem_sinks::{InMemoryAuditLog, InMemoryNotificationSink};
pub use self::recording_mailer::{RecordingMailer, SentMail};
pub use self::static_directory::StaticDirectory;
