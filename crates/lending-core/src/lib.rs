//! lending-core
//!
//! Core building blocks for the borrow-lifecycle workflow engine:
//! a library patron requests a book, staff approve/reject, the patron
//! returns it, and every committed transition fans out notifications,
//! an audit entry, and (for decisions) a mail off the critical path.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, status, record, approval, bundle, notice, errors）
//! - **ports**: 抽象化レイヤー（LedgerStore, NotificationSink, AuditLog, Mailer, Directory, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（engine, dispatcher, builder）
//! - **impls**: 実装（InMemoryLedger など開発・テスト用）
//! - **observability**: ステータスビュー（LedgerCounts, BorrowView）
//!
//! # 設計の要点
//! - 状態遷移は ledger の compare-and-transition だけを通る
//!   （散らばった文字列比較ではなく、単一チョークポイントで弾く）
//! - (user, book) の open-status 一意性は insert と不可分にチェックする
//! - 副作用は遷移コミット後に不変の bundle として切り出し、
//!   バックグラウンドで best-effort 配送する（失敗は log して捨てる）

pub mod app;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
