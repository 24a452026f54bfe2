// src/app.rs
use crate::auth::{BearerTokenIdentity, IdentityProvider};
use crate::config::Config;
use crate::db::Database;
use crate::notify::Notifier;

/// Everything a request handler needs, shared by all astra workers.
pub struct App {
    pub db: Database,
    pub config: Config,
    pub notifier: Notifier,
    pub identity: Box<dyn IdentityProvider>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let notifier = Notifier::from_config(&config);
        Self::with_parts(config, notifier, Box::new(BearerTokenIdentity))
    }

    pub fn with_parts(
        config: Config,
        notifier: Notifier,
        identity: Box<dyn IdentityProvider>,
    ) -> Self {
        Self {
            db: Database::new(config.database_path.clone()),
            config,
            notifier,
            identity,
        }
    }
}
