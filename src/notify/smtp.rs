use super::{MailTemplates, Notifier, RenderedMail};
use crate::db::DatabaseClient;
use crate::types::{AppError, Organization, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

/// Delivers account e-mails over SMTP using the organization's mail settings.
///
/// Settings are read from the organization record on every send, so changes
/// made through `PUT /organization` apply without a restart.
pub struct SmtpNotifier {
    db: Arc<dyn DatabaseClient>,
    templates: MailTemplates,
}

impl SmtpNotifier {
    pub fn new(db: Arc<dyn DatabaseClient>, templates: MailTemplates) -> Self {
        Self { db, templates }
    }

    async fn deliver(&self, to: &str, mail: RenderedMail) -> Result<()> {
        let org = self.db.get_organization().await?.ok_or_else(|| {
            AppError::Notification("Organization is not configured".to_string())
        })?;

        let message = build_message(&org, to, mail)?;
        let transport = build_transport(&org)?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Notification(format!("SMTP delivery failed: {}", e)))?;

        tracing::info!(to, "mail delivered");
        Ok(())
    }
}

fn build_message(org: &Organization, to: &str, mail: RenderedMail) -> Result<Message> {
    let from: Mailbox = org
        .default_from_email
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Notification("No default sender address".to_string()))?
        .parse()
        .map_err(|e| AppError::Notification(format!("Invalid sender address: {}", e)))?;

    let to: Mailbox = to
        .parse()
        .map_err(|e| AppError::Notification(format!("Invalid recipient address: {}", e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject)
        .header(ContentType::TEXT_HTML)
        .body(mail.html)
        .map_err(|e| AppError::Notification(format!("Failed to build message: {}", e)))
}

fn build_transport(org: &Organization) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    let host = org
        .smtp_host
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Notification("SMTP host is not configured".to_string()))?;

    // Implicit TLS takes precedence over STARTTLS when both flags are set.
    let mut builder = if org.smtp_use_ssl {
        AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| AppError::Notification(format!("Invalid SMTP relay: {}", e)))?
    } else if org.smtp_use_tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Notification(format!("Invalid SMTP relay: {}", e)))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
    };

    if let Some(port) = org.smtp_port {
        builder = builder.port(port);
    }

    if let (Some(user), Some(password)) = (&org.smtp_user, &org.smtp_password) {
        builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
    }

    Ok(builder.build())
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_invitation(&self, to: &str, temp_password: &str) -> Result<()> {
        self.deliver(to, self.templates.invitation(temp_password))
            .await
    }

    async fn send_password_changed(&self, to: &str, first_name: &str) -> Result<()> {
        self.deliver(to, self.templates.password_changed(first_name))
            .await
    }

    async fn send_reset_link(&self, to: &str, token: &str) -> Result<()> {
        self.deliver(to, self.templates.reset_link(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> Organization {
        Organization {
            id: 1,
            name: Some("ElStudio".into()),
            smtp_host: Some("smtp.example.com".into()),
            smtp_port: Some(2525),
            default_from_email: Some("noreply@example.com".into()),
            ..Default::default()
        }
    }

    fn mail() -> RenderedMail {
        RenderedMail {
            subject: "Hello".into(),
            html: "<p>hi</p>".into(),
        }
    }

    #[test]
    fn test_build_message_requires_sender() {
        let mut org = org();
        org.default_from_email = None;

        assert!(matches!(
            build_message(&org, "a@example.com", mail()),
            Err(AppError::Notification(_))
        ));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        assert!(build_message(&org(), "not an address", mail()).is_err());
        assert!(build_message(&org(), "a@example.com", mail()).is_ok());
    }

    #[tokio::test]
    async fn test_build_transport_requires_host() {
        let mut org = org();
        org.smtp_host = None;
        assert!(build_transport(&org).is_err());

        org.smtp_host = Some("smtp.example.com".into());
        org.smtp_use_tls = true;
        assert!(build_transport(&org).is_ok());
    }
}
