use crate::services::smtp_mailer::{MailError, Mailer};
use async_trait::async_trait;
use std::sync::Mutex;

/// A mock mailer that records sent emails for testing purposes.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct MockMailer {
    pub sent_activation_emails: Mutex<Vec<(String, String)>>,
    pub fail_send: bool,
}

impl MockMailer {
    pub fn failing() -> Self {
        Self {
            fail_send: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_activation_email(&self, to: &str, link: &str) -> Result<(), MailError> {
        if self.fail_send {
            return Err(MailError::Other("mock failure".into()));
        }
        self.sent_activation_emails
            .lock()
            .map_err(|_| MailError::Other("mock mailer poisoned".into()))?
            .push((to.to_string(), link.to_string()));
        Ok(())
    }
}
