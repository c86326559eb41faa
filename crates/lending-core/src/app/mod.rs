//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **BorrowEngine**: 状態機械の validate → commit → enqueue
//! - **Dispatcher**: 副作用バンドルのバックグラウンド配送
//! - **EngineBuilder**: ワイヤリングと起動時検証（Fail-fast）

pub mod builder;
pub mod dispatcher;
pub mod engine;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, EngineBuilder, LendingApp};
pub use self::dispatcher::{DeliveryTargets, DispatchError, DispatchHandle, Dispatcher};
pub use self::engine::{BorrowEngine, Decision, LoanPolicy};
