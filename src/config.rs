// src/config.rs
use chrono::{FixedOffset, Offset, Utc};
use std::env;
use thiserror::Error;

const DEFAULT_OFFSET_HOURS: i32 = 3;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_phone: String,
}

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub max_workers: usize,
    pub database_path: String,
    pub public_base_url: String,
    /// Offset of the utility's local calendar; dates and month buckets use it.
    pub local_offset: FixedOffset,
    pub from_email: String,
    pub sender_name: String,
    pub brevo_api_key: Option<String>,
    pub twilio: Option<TwilioConfig>,
}

fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours.checked_mul(3600)?)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            max_workers: 8,
            database_path: "complaints.sqlite3".into(),
            public_base_url: "http://127.0.0.1:3000".into(),
            local_offset: offset_from_hours(DEFAULT_OFFSET_HOURS).unwrap_or_else(|| Utc.fix()),
            from_email: "noreply@localhost".into(),
            sender_name: "Water Complaints".into(),
            brevo_api_key: None,
            twilio: None,
        }
    }
}

impl Config {
    /// Load `.env` if there is one, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut cfg = Config::default();

        if let Some(v) = get("BIND_ADDR") {
            cfg.bind_addr = v;
        }
        if let Some(v) = get("MAX_WORKERS") {
            cfg.max_workers = v
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "MAX_WORKERS",
                    expected: "a positive integer",
                    value: v,
                })?;
        }
        if let Some(v) = get("DATABASE_PATH") {
            cfg.database_path = v;
        }
        if let Some(v) = get("PUBLIC_BASE_URL") {
            cfg.public_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("LOCAL_UTC_OFFSET_HOURS") {
            cfg.local_offset = v
                .parse::<i32>()
                .ok()
                .and_then(offset_from_hours)
                .ok_or(ConfigError::Invalid {
                    name: "LOCAL_UTC_OFFSET_HOURS",
                    expected: "a whole number of hours between -23 and 23",
                    value: v,
                })?;
        }
        if let Some(v) = get("DEFAULT_FROM_EMAIL") {
            cfg.from_email = v;
        }
        if let Some(v) = get("SENDER_NAME") {
            cfg.sender_name = v;
        }
        cfg.brevo_api_key = get("BREVO_API_KEY");

        // SMS needs all three.
        cfg.twilio = match (get("TWILIO_SID"), get("TWILIO_AUTH_TOKEN"), get("TWILIO_PHONE")) {
            (Some(account_sid), Some(auth_token), Some(from_phone)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                from_phone,
            }),
            _ => None,
        };

        Ok(cfg)
    }
}
