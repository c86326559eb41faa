//! Mailer port - 外部メール送信（fire-and-forget）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::MailTemplate;

/// Failure delivering one mail.
///
/// リトライしない・呼び出し元に出さない（dispatcher が log して捨てる）。
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// Mailer は外部のメール送信サービスへの seam
///
/// テンプレートのレンダリングは実装側の責務。Engine 側は
/// template 名と data だけを渡す。
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one templated mail to `address`.
    async fn send(
        &self,
        address: &str,
        template: MailTemplate,
        data: &serde_json::Value,
    ) -> Result<(), MailError>;
}
