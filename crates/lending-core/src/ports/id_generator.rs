//! IdGenerator port - ID 生成の抽象化
//!
//! IdGenerator は分散システムで使える ID を生成するためのインターフェースです。
//! テスト容易性のために、trait として抽象化しています。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::{ActivityId, BorrowId, NotificationId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は分散システムで使える ID を生成
///
/// # ULID の特性
/// - 時刻でソート可能
/// - 分散環境で生成可能（調整不要）
/// - 128-bit（UUID 互換）
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    /// Borrow record の ID を生成
    fn generate_borrow_id(&self) -> BorrowId;

    /// Notification の ID を生成
    fn generate_notification_id(&self) -> NotificationId;

    /// Audit entry の ID を生成
    fn generate_activity_id(&self) -> ActivityId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// これにより、テスト時に FixedClock を使って決定的な ID を生成できます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    /// 新しい UlidGenerator を作成
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn fresh_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_borrow_id(&self) -> BorrowId {
        BorrowId::from(self.fresh_ulid())
    }

    fn generate_notification_id(&self) -> NotificationId {
        NotificationId::from(self.fresh_ulid())
    }

    fn generate_activity_id(&self) -> ActivityId {
        ActivityId::from(self.fresh_ulid())
    }
}
