use async_trait::async_trait;
use lettre::{
    address::AddressError,
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

use crate::config::SmtpSettings;
use crate::services::smtp_mailer::{activation_body, activation_subject, Mailer};

use super::MailError;

#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    sender: Mailbox,
    store_name: String,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings, store_name: &str) -> Result<Self, MailError> {
        let sender: Mailbox = settings.from.parse()?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?.port(settings.port);
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: Arc::new(builder.build()),
            sender,
            store_name: store_name.to_string(),
        })
    }

    async fn send_email(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.sender.clone())
            .to(to
                .parse()
                .map_err(|e: AddressError| MailError::InvalidEmailAddress(e.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| e.into())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_activation_email(&self, to: &str, link: &str) -> Result<(), MailError> {
        self.send_email(to, &activation_subject(&self.store_name), activation_body(link))
            .await
    }
}
