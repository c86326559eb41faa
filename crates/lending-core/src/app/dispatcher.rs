//! Dispatcher - 副作用バンドルのバックグラウンド配送
//!
//! Engine は ledger のコミットが成功したら bundle を enqueue して
//! すぐ呼び出し元に戻る。実際の I/O（通知・監査・メール）は
//! ここで別タスクとして行う。
//!
//! # 配送ポリシー
//! - best-effort / at-most-once：失敗は log して捨てる、リトライしない
//! - 配送失敗はコミット済みの遷移に決して波及しない
//! - 1 つの bundle の中である配送が失敗しても、残りの配送は続ける
//! - メールだけ per-delivery timeout を掛ける（遅い Mailer が
//!   キューを永遠に塞がないように）

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::{SideEffectBundle, UserId};
use crate::ports::{
    AuditLog, Directory, DirectoryError, MailError, Mailer, NotificationSink, SinkError,
};

/// Delivery failure, contained entirely inside the dispatcher.
///
/// Engine の API を横切ることはない。「通知に失敗した」という
/// ユーザー可視の状態は存在しない。
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("mail delivery timed out after {0:?}")]
    MailTimeout(Duration),

    #[error("no mail address on file for {0}")]
    UnknownAddress(UserId),
}

/// Non-blocking handle the engine enqueues bundles through.
///
/// `enqueue` は unbounded channel への送信 1 回で、await しない。
#[derive(Clone)]
pub struct DispatchHandle {
    tx: mpsc::UnboundedSender<SideEffectBundle>,
}

impl DispatchHandle {
    pub fn enqueue(&self, bundle: SideEffectBundle) {
        if bundle.is_empty() {
            return;
        }
        if self.tx.send(bundle).is_err() {
            // Dispatcher が先に落ちている。遷移自体はコミット済みなので
            // ここでも log-and-drop しかない。
            tracing::warn!("dispatcher is gone; dropping side-effect bundle");
        }
    }
}

/// Collaborators the dispatcher delivers to.
pub struct DeliveryTargets {
    pub notifications: Arc<dyn NotificationSink>,
    pub audit: Arc<dyn AuditLog>,
    pub mailer: Arc<dyn Mailer>,
    pub directory: Arc<dyn Directory>,
}

/// Background dispatch task handle.
/// - `request_shutdown()` で新規受付を止める
/// - `shutdown_and_join()` は enqueue 済みの bundle を流し切ってから戻る
pub struct Dispatcher {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
    tx: mpsc::UnboundedSender<SideEffectBundle>,
}

impl Dispatcher {
    /// Spawn the background delivery task.
    pub fn spawn(targets: DeliveryTargets, mail_timeout: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (tx, rx) = mpsc::unbounded_channel();

        let join = tokio::spawn(async move {
            dispatch_loop(rx, shutdown_rx, targets, mail_timeout).await;
        });

        Self {
            shutdown_tx,
            join,
            tx,
        }
    }

    /// Handle for producers (the engine).
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            tx: self.tx.clone(),
        }
    }

    /// Request shutdown. In-flight delivery finishes; queued bundles are
    /// drained before the loop exits.
    pub fn request_shutdown(&self) {
        // ignore send error: receiver may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait until every already-enqueued bundle is delivered.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        drop(self.tx);
        let _ = self.join.await;
    }
}

async fn dispatch_loop(
    mut rx: mpsc::UnboundedReceiver<SideEffectBundle>,
    mut shutdown_rx: watch::Receiver<bool>,
    targets: DeliveryTargets,
    mail_timeout: Duration,
) {
    loop {
        let bundle = tokio::select! {
            _ = shutdown_rx.changed() => {
                // 受付停止。残っている bundle は流し切る。
                while let Ok(bundle) = rx.try_recv() {
                    deliver(&bundle, &targets, mail_timeout).await;
                }
                break;
            }
            bundle = rx.recv() => bundle,
        };

        let Some(bundle) = bundle else {
            // 全 sender が閉じた
            break;
        };
        deliver(&bundle, &targets, mail_timeout).await;
    }
}

/// Deliver one bundle. Every failure is logged and dropped; later effects
/// in the same bundle still run.
async fn deliver(bundle: &SideEffectBundle, targets: &DeliveryTargets, mail_timeout: Duration) {
    for notice in &bundle.notices {
        if let Err(err) = targets
            .notifications
            .write(notice.user_id, &notice.message)
            .await
            .map_err(DispatchError::from)
        {
            tracing::warn!(user = %notice.user_id, error = %err, "notification write failed; dropped");
        }
    }

    for audit in &bundle.audits {
        if let Err(err) = targets
            .audit
            .write(audit.user_id, audit.book_id, &audit.action)
            .await
            .map_err(DispatchError::from)
        {
            tracing::warn!(user = %audit.user_id, error = %err, "audit write failed; dropped");
        }
    }

    for email in &bundle.emails {
        if let Err(err) = deliver_mail(email, targets, mail_timeout).await {
            tracing::warn!(user = %email.user_id, error = %err, "mail delivery failed; dropped");
        }
    }
}

async fn deliver_mail(
    email: &crate::domain::EmailEffect,
    targets: &DeliveryTargets,
    mail_timeout: Duration,
) -> Result<(), DispatchError> {
    let address = targets
        .directory
        .email_of(email.user_id)
        .await?
        .ok_or(DispatchError::UnknownAddress(email.user_id))?;

    match tokio::time::timeout(
        mail_timeout,
        targets.mailer.send(&address, email.template, &email.data),
    )
    .await
    {
        Ok(result) => result.map_err(DispatchError::from),
        Err(_) => Err(DispatchError::MailTimeout(mail_timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookId, MailTemplate, SideEffectBundle};
    use crate::impls::{
        InMemoryAuditLog, InMemoryNotificationSink, RecordingMailer, StaticDirectory,
    };
    use async_trait::async_trait;
    use std::time::Instant;
    use ulid::Ulid;

    struct HangingMailer;

    #[async_trait]
    impl Mailer for HangingMailer {
        async fn send(
            &self,
            _address: &str,
            _template: MailTemplate,
            _data: &serde_json::Value,
        ) -> Result<(), MailError> {
            // 返ってこない Mailer
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn write(&self, _user_id: UserId, _message: &str) -> Result<(), SinkError> {
            Err(SinkError::WriteFailed("notification store is down".into()))
        }
    }

    fn user() -> UserId {
        UserId::from_ulid(Ulid::new())
    }

    fn book() -> BookId {
        BookId::from_ulid(Ulid::new())
    }

    struct Fixture {
        notifications: Arc<InMemoryNotificationSink>,
        audit: Arc<InMemoryAuditLog>,
        mailer: Arc<RecordingMailer>,
    }

    fn targets_with(directory: StaticDirectory) -> (Fixture, DeliveryTargets) {
        let notifications = Arc::new(InMemoryNotificationSink::new());
        let audit = Arc::new(InMemoryAuditLog::new());
        let mailer = Arc::new(RecordingMailer::new());
        let fixture = Fixture {
            notifications: Arc::clone(&notifications),
            audit: Arc::clone(&audit),
            mailer: Arc::clone(&mailer),
        };
        let targets = DeliveryTargets {
            notifications,
            audit,
            mailer,
            directory: Arc::new(directory),
        };
        (fixture, targets)
    }

    #[tokio::test]
    async fn delivers_every_effect_of_a_bundle() {
        let patron = user();
        let title = book();
        let directory = StaticDirectory::new().with_user(patron, "patron@example.com");
        let (fixture, targets) = targets_with(directory);

        let dispatcher = Dispatcher::spawn(targets, Duration::from_secs(1));
        dispatcher.handle().enqueue(
            SideEffectBundle::new()
                .notify(patron, "approved")
                .audit(patron, title, "borrow approved")
                .mail(
                    patron,
                    MailTemplate::BorrowApproved,
                    serde_json::json!({"due": "2024-04-15"}),
                ),
        );
        dispatcher.shutdown_and_join().await;

        assert_eq!(fixture.notifications.snapshot().await.len(), 1);
        assert_eq!(fixture.audit.snapshot().await.len(), 1);
        let sent = fixture.mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].address, "patron@example.com");
        assert_eq!(sent[0].template, MailTemplate::BorrowApproved);
    }

    #[tokio::test]
    async fn enqueue_does_not_wait_for_a_hanging_mailer() {
        let patron = user();
        let directory = StaticDirectory::new().with_user(patron, "patron@example.com");
        let notifications = Arc::new(InMemoryNotificationSink::new());
        let targets = DeliveryTargets {
            notifications: Arc::clone(&notifications) as Arc<dyn NotificationSink>,
            audit: Arc::new(InMemoryAuditLog::new()),
            mailer: Arc::new(HangingMailer),
            directory: Arc::new(directory),
        };

        let dispatcher = Dispatcher::spawn(targets, Duration::from_millis(50));
        let handle = dispatcher.handle();

        let started = Instant::now();
        handle.enqueue(
            SideEffectBundle::new().mail(patron, MailTemplate::BorrowApproved, serde_json::json!({})),
        );
        // enqueue は配送を待たない
        assert!(started.elapsed() < Duration::from_millis(100));

        // hang しているメールは timeout で捨てられ、後続の bundle は届く
        handle.enqueue(SideEffectBundle::new().notify(patron, "still alive"));
        dispatcher.shutdown_and_join().await;

        let notices = notifications.snapshot().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "still alive");
    }

    #[tokio::test]
    async fn failing_sink_does_not_stop_audit_or_mail() {
        let patron = user();
        let title = book();
        let directory = StaticDirectory::new().with_user(patron, "patron@example.com");
        let audit = Arc::new(InMemoryAuditLog::new());
        let mailer = Arc::new(RecordingMailer::new());
        let targets = DeliveryTargets {
            notifications: Arc::new(FailingSink),
            audit: Arc::clone(&audit) as Arc<dyn AuditLog>,
            mailer: Arc::clone(&mailer) as Arc<dyn Mailer>,
            directory: Arc::new(directory),
        };

        let dispatcher = Dispatcher::spawn(targets, Duration::from_secs(1));
        dispatcher.handle().enqueue(
            SideEffectBundle::new()
                .notify(patron, "will fail")
                .audit(patron, title, "borrow requested")
                .mail(patron, MailTemplate::BorrowRejected, serde_json::json!({})),
        );
        dispatcher.shutdown_and_join().await;

        // 通知が落ちても監査とメールは進む
        assert_eq!(audit.snapshot().await.len(), 1);
        assert_eq!(mailer.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn mail_without_an_address_is_skipped() {
        let patron = user();
        let known = user();
        let directory = StaticDirectory::new().with_user(known, "known@example.com");
        let (fixture, targets) = targets_with(directory);

        let dispatcher = Dispatcher::spawn(targets, Duration::from_secs(1));
        dispatcher.handle().enqueue(
            SideEffectBundle::new()
                .mail(patron, MailTemplate::BorrowApproved, serde_json::json!({}))
                .mail(known, MailTemplate::BorrowApproved, serde_json::json!({})),
        );
        dispatcher.shutdown_and_join().await;

        // 宛先不明は捨てる、残りは届く
        let sent = fixture.mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].address, "known@example.com");
    }

    #[tokio::test]
    async fn empty_bundles_are_not_queued() {
        let (fixture, targets) = targets_with(StaticDirectory::new());
        let dispatcher = Dispatcher::spawn(targets, Duration::from_secs(1));
        dispatcher.handle().enqueue(SideEffectBundle::new());
        dispatcher.shutdown_and_join().await;

        assert!(fixture.notifications.snapshot().await.is_empty());
        assert!(fixture.audit.snapshot().await.is_empty());
        assert!(fixture.mailer.sent().await.is_empty());
    }
}
