//! Demo: drive one borrow through its whole lifecycle on the in-memory stack.

use std::sync::Arc;

use lending_core::app::{Decision, EngineBuilder};
use lending_core::domain::{BookId, UserId};
use lending_core::impls::{
    InMemoryAuditLog, InMemoryLedger, InMemoryNotificationSink, RecordingMailer, StaticDirectory,
};
use ulid::Ulid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // (A) 登場人物と in-memory スタックを用意
    // user/book の ID は identity provider / catalog の持ち物なので、
    // デモではその場で採番する
    let patron = UserId::from_ulid(Ulid::new());
    let admin = UserId::from_ulid(Ulid::new());
    let book = BookId::from_ulid(Ulid::new());

    let notifications = Arc::new(InMemoryNotificationSink::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let mailer = Arc::new(RecordingMailer::new());
    let directory = Arc::new(
        StaticDirectory::new()
            .with_user(patron, "patron@example.com")
            .with_admins([admin]),
    );

    let app = EngineBuilder::new()
        .ledger(Arc::new(InMemoryLedger::new()))
        .notifications(Arc::clone(&notifications) as _)
        .audit(Arc::clone(&audit) as _)
        .mailer(Arc::clone(&mailer) as _)
        .directory(directory)
        .build()?;

    // (B) 借出ライフサイクルを一周させる
    let pending = app.engine.request_borrow(patron, book).await?;
    println!("requested: id={} status={}", pending.borrow_id, pending.status);

    let approved = app
        .engine
        .decide_request(pending.borrow_id, Decision::Approve)
        .await?;
    println!(
        "approved:  due={:?} code={}",
        approved.due_date.map(|d| d.to_rfc3339()),
        approved.approval_code.as_ref().map(|c| c.as_str()).unwrap_or("-"),
    );

    app.engine.request_return(pending.borrow_id).await?;
    let returned = app.engine.confirm_return(pending.borrow_id).await?;
    println!("returned:  status={} returned={}", returned.status, returned.returned);

    // 二重確定は状態で弾かれる（リトライしても安全な理由）
    if let Err(err) = app.engine.confirm_return(pending.borrow_id).await {
        println!("second confirm rejected: {err}");
    }

    // (C) enqueue 済みの配送を流し切ってから中身を見る
    let counts = app.engine.counts().await?;
    app.dispatcher.shutdown_and_join().await;

    println!("\ncounts: {counts:?}");

    println!("\nnotifications:");
    for notice in notifications.snapshot().await {
        println!("  -> {}: {}", notice.user_id, notice.message);
    }

    println!("\naudit trail:");
    for entry in audit.snapshot().await {
        println!("  {} {} {}", entry.timestamp.to_rfc3339(), entry.user_id, entry.action);
    }

    println!("\nmail outbox:");
    for mail in mailer.sent().await {
        println!("  {} <- {} {}", mail.address, mail.template.as_str(), mail.data);
    }

    Ok(())
}
