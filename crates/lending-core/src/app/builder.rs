//! EngineBuilder - アプリケーションの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 必須ポート（ledger / sinks / mailer / directory）の欠けは
//!   build() 時に BuildError として即座に返す
//! - clock / id 生成器 / policy には本番向けデフォルトがある

use std::sync::Arc;
use std::time::Duration;

use super::dispatcher::{DeliveryTargets, Dispatcher};
use super::engine::{BorrowEngine, LoanPolicy};
use crate::ports::{
    AuditLog, Clock, Directory, IdGenerator, LedgerStore, Mailer, NotificationSink, SystemClock,
    UlidGenerator,
};

/// Default per-mail delivery timeout.
const DEFAULT_MAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing required port: {0}")]
    MissingPort(&'static str),
}

/// Engine + dispatcher を組み立てる builder
///
/// # 使用例
/// ```ignore
/// let app = EngineBuilder::new()
///     .ledger(Arc::new(InMemoryLedger::new()))
///     .notifications(Arc::new(InMemoryNotificationSink::new()))
///     .audit(Arc::new(InMemoryAuditLog::new()))
///     .mailer(Arc::new(RecordingMailer::new()))
///     .directory(Arc::new(directory))
///     .build()?;
/// ```
pub struct EngineBuilder {
    ledger: Option<Arc<dyn LedgerStore>>,
    notifications: Option<Arc<dyn NotificationSink>>,
    audit: Option<Arc<dyn AuditLog>>,
    mailer: Option<Arc<dyn Mailer>>,
    directory: Option<Arc<dyn Directory>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    policy: LoanPolicy,
    mail_timeout: Duration,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            ledger: None,
            notifications: None,
            audit: None,
            mailer: None,
            directory: None,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UlidGenerator::new(SystemClock)),
            policy: LoanPolicy::default(),
            mail_timeout: DEFAULT_MAIL_TIMEOUT,
        }
    }

    pub fn ledger(mut self, ledger: Arc<dyn LedgerStore>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn notifications(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notifications = Some(sink);
        self
    }

    pub fn audit(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Replace the default SystemClock (tests use FixedClock here).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn policy(mut self, policy: LoanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Per-mail delivery timeout applied by the dispatcher.
    pub fn mail_timeout(mut self, timeout: Duration) -> Self {
        self.mail_timeout = timeout;
        self
    }

    /// Wire everything together and spawn the dispatcher.
    ///
    /// # 検証
    /// - 必須ポートが全部揃っているかチェック
    /// - 欠けていれば BuildError::MissingPort を返す
    pub fn build(self) -> Result<LendingApp, BuildError> {
        let ledger = self.ledger.ok_or(BuildError::MissingPort("ledger"))?;
        let notifications = self
            .notifications
            .ok_or(BuildError::MissingPort("notifications"))?;
        let audit = self.audit.ok_or(BuildError::MissingPort("audit"))?;
        let mailer = self.mailer.ok_or(BuildError::MissingPort("mailer"))?;
        let directory = self.directory.ok_or(BuildError::MissingPort("directory"))?;

        let dispatcher = Dispatcher::spawn(
            DeliveryTargets {
                notifications,
                audit,
                mailer,
                directory: Arc::clone(&directory),
            },
            self.mail_timeout,
        );

        let engine = BorrowEngine::new(
            ledger,
            directory,
            self.ids,
            self.clock,
            self.policy,
            dispatcher.handle(),
        );

        Ok(LendingApp { engine, dispatcher })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The wired application: engine plus its running dispatcher.
pub struct LendingApp {
    pub engine: BorrowEngine,
    pub dispatcher: Dispatcher,
}

impl std::fmt::Debug for LendingApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LendingApp").finish_non_exhaustive()
    }
}
