//! Outbound account notifications.
//!
//! The account flows hand a destination address and the message inputs to a
//! [`Notifier`]; rendering lives in [`templates`] and delivery in
//! [`smtp`]. Callers treat every send as best-effort: a failure is logged
//! and never changes the outcome of the originating request.

pub mod smtp;
pub mod templates;

use crate::types::Result;
use async_trait::async_trait;

pub use smtp::SmtpNotifier;
pub use templates::{MailTemplates, RenderedMail};

/// Sends the three account e-mails.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Invitation carrying the one-time temporary password.
    async fn send_invitation(&self, to: &str, temp_password: &str) -> Result<()>;

    /// Confirmation that the password was changed.
    async fn send_password_changed(&self, to: &str, first_name: &str) -> Result<()>;

    /// Link to the reset page embedding the raw reset token.
    async fn send_reset_link(&self, to: &str, token: &str) -> Result<()>;
}

/// Notifier used when mail is disabled: records the intent in the log only.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_invitation(&self, to: &str, _temp_password: &str) -> Result<()> {
        tracing::info!(to, "mail disabled, invitation not sent");
        Ok(())
    }

    async fn send_password_changed(&self, to: &str, _first_name: &str) -> Result<()> {
        tracing::info!(to, "mail disabled, password change notice not sent");
        Ok(())
    }

    async fn send_reset_link(&self, to: &str, _token: &str) -> Result<()> {
        tracing::info!(to, "mail disabled, reset link not sent");
        Ok(())
    }
}
