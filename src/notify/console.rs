// src/notify/console.rs
use log::info;

use crate::notify::{EmailSender, NotifyError, SmsSender};

/// Logs messages instead of delivering them. Used when no transport is
/// configured.
pub struct ConsoleSender;

impl EmailSender for ConsoleSender {
    fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!("[email] to={recipient} subject={subject:?}\n{body}");
        Ok(())
    }
}

impl SmsSender for ConsoleSender {
    fn send_sms(&self, recipient: &str, body: &str) -> Result<(), NotifyError> {
        info!("[sms] to={recipient} {body:?}");
        Ok(())
    }
}
