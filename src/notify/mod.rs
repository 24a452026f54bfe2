// src/notify/mod.rs
mod brevo;
mod console;
mod twilio;

pub use brevo::BrevoMailer;
pub use console::ConsoleSender;
pub use twilio::TwilioSms;

use log::{info, warn};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: {0}")]
    ApiError(String),
}

pub trait EmailSender: Send + Sync {
    fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

pub trait SmsSender: Send + Sync {
    fn send_sms(&self, recipient: &str, body: &str) -> Result<(), NotifyError>;
}

/// Best-effort delivery. Failures are logged and never reach the caller.
pub struct Notifier {
    email: Box<dyn EmailSender>,
    sms: Option<Box<dyn SmsSender>>,
}

impl Notifier {
    pub fn new(email: Box<dyn EmailSender>, sms: Option<Box<dyn SmsSender>>) -> Self {
        Self { email, sms }
    }

    /// Brevo when an API key is configured, console otherwise. SMS only
    /// with complete Twilio credentials.
    pub fn from_config(cfg: &Config) -> Self {
        let email: Box<dyn EmailSender> = match &cfg.brevo_api_key {
            Some(key) => Box::new(BrevoMailer::new(
                key.clone(),
                cfg.from_email.clone(),
                cfg.sender_name.clone(),
            )),
            None => {
                info!("BREVO_API_KEY not set; emails will be logged only");
                Box::new(ConsoleSender)
            }
        };
        let sms = cfg
            .twilio
            .as_ref()
            .map(|t| Box::new(TwilioSms::new(t.clone())) as Box<dyn SmsSender>);
        Self::new(email, sms)
    }

    pub fn notify_email(&self, recipient: Option<&str>, subject: &str, body: &str) {
        let Some(recipient) = recipient.filter(|r| !r.trim().is_empty()) else {
            return;
        };
        if let Err(e) = self.email.send_email(recipient, subject, body) {
            warn!("email to {recipient} failed ({subject}): {e}");
        }
    }

    pub fn notify_sms(&self, recipient: Option<&str>, body: &str) {
        let (Some(sms), Some(recipient)) = (&self.sms, recipient.filter(|r| !r.trim().is_empty()))
        else {
            return;
        };
        if let Err(e) = sms.send_sms(recipient, body) {
            warn!("sms to {recipient} failed: {e}");
        }
    }
}
