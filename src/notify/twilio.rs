// src/notify/twilio.rs
use reqwest::blocking::Client;

use crate::config::TwilioConfig;
use crate::notify::{NotifyError, SmsSender};

pub struct TwilioSms {
    cfg: TwilioConfig,
    client: Client,
}

impl TwilioSms {
    pub fn new(cfg: TwilioConfig) -> Self {
        Self {
            cfg,
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.cfg.account_sid
        )
    }
}

impl SmsSender for TwilioSms {
    fn send_sms(&self, recipient: &str, body: &str) -> Result<(), NotifyError> {
        let form = [
            ("To", recipient),
            ("From", self.cfg.from_phone.as_str()),
            ("Body", body),
        ];

        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.cfg.account_sid, Some(&self.cfg.auth_token))
            .form(&form)
            .send()
            .map_err(|e| NotifyError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(NotifyError::ApiError(format!("Twilio {status}: {text}")));
        }

        Ok(())
    }
}
