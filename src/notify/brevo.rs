// src/notify/brevo.rs
use reqwest::blocking::Client;
use serde::Serialize;

use crate::notify::{EmailSender, NotifyError};

const BREVO_URL: &str = "https://api.brevo.com/v3/smtp/email";

pub struct BrevoMailer {
    api_key: String,
    sender_email: String,
    sender_name: String,
    client: Client,
}

#[derive(Serialize)]
struct BrevoSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoSender<'a>,
    to: Vec<BrevoRecipient<'a>>,
    subject: &'a str,
    text_content: &'a str,
}

impl BrevoMailer {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Self {
        Self {
            api_key,
            sender_email,
            sender_name,
            client: Client::new(),
        }
    }
}

impl EmailSender for BrevoMailer {
    fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let payload = BrevoPayload {
            sender: BrevoSender {
                name: &self.sender_name,
                email: &self.sender_email,
            },
            to: vec![BrevoRecipient { email: recipient }],
            subject,
            text_content: body,
        };

        let resp = self
            .client
            .post(BREVO_URL)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| NotifyError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(NotifyError::ApiError(format!("Brevo {status}: {text}")));
        }

        Ok(())
    }
}
