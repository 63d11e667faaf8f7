//! Mock implementations for testing.
//!
//! Notifiers that capture what the account flows would have mailed, so
//! tests can read the temporary password or the reset token back.

use async_trait::async_trait;
use elstudio::notify::Notifier;
use elstudio::types::{AppError, Result};
use std::sync::Mutex;

/// One captured notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    Invitation { to: String, temp_password: String },
    PasswordChanged { to: String, first_name: String },
    ResetLink { to: String, token: String },
}

/// Notifier that records every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Temporary password from the latest invitation sent to `to`.
    pub fn temp_password_for(&self, to: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|mail| match mail {
            SentMail::Invitation {
                to: addr,
                temp_password,
            } if addr == to => Some(temp_password),
            _ => None,
        })
    }

    /// Token from the latest reset link sent to `to`.
    pub fn reset_token_for(&self, to: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|mail| match mail {
            SentMail::ResetLink { to: addr, token } if addr == to => Some(token),
            _ => None,
        })
    }

    pub fn count_password_changed(&self, to: &str) -> usize {
        self.sent()
            .iter()
            .filter(|mail| matches!(mail, SentMail::PasswordChanged { to: addr, .. } if addr == to))
            .count()
    }

    fn record(&self, mail: SentMail) {
        self.sent.lock().unwrap().push(mail);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_invitation(&self, to: &str, temp_password: &str) -> Result<()> {
        self.record(SentMail::Invitation {
            to: to.to_string(),
            temp_password: temp_password.to_string(),
        });
        Ok(())
    }

    async fn send_password_changed(&self, to: &str, first_name: &str) -> Result<()> {
        self.record(SentMail::PasswordChanged {
            to: to.to_string(),
            first_name: first_name.to_string(),
        });
        Ok(())
    }

    async fn send_reset_link(&self, to: &str, token: &str) -> Result<()> {
        self.record(SentMail::ResetLink {
            to: to.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }
}

/// Notifier whose every send fails, as an unreachable SMTP server would.
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_invitation(&self, _to: &str, _temp_password: &str) -> Result<()> {
        Err(AppError::Notification("smtp unreachable".to_string()))
    }

    async fn send_password_changed(&self, _to: &str, _first_name: &str) -> Result<()> {
        Err(AppError::Notification("smtp unreachable".to_string()))
    }

    async fn send_reset_link(&self, _to: &str, _token: &str) -> Result<()> {
        Err(AppError::Notification("smtp unreachable".to_string()))
    }
}
