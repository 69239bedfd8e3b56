use async_trait::async_trait;
use std::fmt;

use lettre::address::AddressError;

#[derive(Debug)]
pub enum MailError {
    Other(String),
    InvalidEmailAddress(String),
    SendError(String),
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::Other(e) => write!(f, "Error: {}", e),
            MailError::InvalidEmailAddress(e) => write!(f, "Invalid Address: {}", e),
            MailError::SendError(e) => write!(f, "Send error: {}", e),
        }
    }
}

impl std::error::Error for MailError {}

use lettre::transport::smtp::Error as SmtpError;

impl From<SmtpError> for MailError {
    fn from(err: SmtpError) -> Self {
        MailError::SendError(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        MailError::SendError(err.to_string())
    }
}

impl From<AddressError> for MailError {
    fn from(e: AddressError) -> Self {
        MailError::InvalidEmailAddress(e.to_string())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the account activation link to a freshly registered user.
    async fn send_activation_email(&self, to: &str, link: &str) -> Result<(), MailError>;
}

mod log_mailer;
mod mock_mailer;
mod smtp_impl;

pub use log_mailer::LogMailer;
#[allow(unused_imports)]
pub use mock_mailer::MockMailer;
pub use smtp_impl::SmtpMailer;

pub(crate) fn activation_subject(store_name: &str) -> String {
    format!("Activate your {} account", store_name)
}

pub(crate) fn activation_body(link: &str) -> String {
    format!(
        r#"<div>
  <h1>Follow the link to activate your account</h1>
  <a href="{link}">{link}</a>
</div>"#
    )
}
