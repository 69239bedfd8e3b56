use async_trait::async_trait;

use crate::services::smtp_mailer::{MailError, Mailer};

/// Writes activation links to the log instead of sending them. Selected
/// when no SMTP relay is configured.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_activation_email(&self, to: &str, link: &str) -> Result<(), MailError> {
        tracing::info!(%to, %link, "SMTP disabled; activation email not sent");
        Ok(())
    }
}
