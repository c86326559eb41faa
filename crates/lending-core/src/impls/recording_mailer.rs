//! RecordingMailer - 送信内容を記録するだけの Mailer（開発・テスト用）

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::MailTemplate;
use crate::ports::{MailError, Mailer};

/// One captured outbound mail.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub address: String,
    pub template: MailTemplate,
    pub data: serde_json::Value,
}

/// Mailer that records instead of sending.
///
/// 実際の SMTP/API 連携は別クレートの仕事。コアのテストは
/// 「何が送られようとしたか」だけを見る。
#[derive(Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every mail handed to `send`, in call order.
    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        address: &str,
        template: MailTemplate,
        data: &serde_json::Value,
    ) -> Result<(), MailError> {
        self.sent.lock().await.push(SentMail {
            address: address.to_string(),
            template,
            data: data.clone(),
        });
        Ok(())
    }
}
