//! Bot configuration loaded from the environment.

use anyhow::{Context, Result};
use std::env;
use teloxide::types::{User, UserId};

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub database_url: String,
    admin_id: u64,
}

impl BotConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://db.sqlite3".to_string());
        let admin_id = env::var("ADMIN_ID")
            .context("ADMIN_ID must be set")?
            .parse::<u64>()
            .context("ADMIN_ID must be a numeric Telegram user id")?;

        Ok(Self {
            bot_token,
            database_url,
            admin_id,
        })
    }

    #[cfg(test)]
    fn with_admin(admin_id: u64) -> Self {
        Self {
            bot_token: String::new(),
            database_url: String::new(),
            admin_id,
        }
    }

    /// There is exactly one admin identity; everyone else is a customer.
    /// Re-checked on every event, never cached in session state.
    pub fn is_admin(&self, user: Option<&User>) -> bool {
        user.map(|u| self.is_admin_id(u.id)).unwrap_or(false)
    }

    pub fn is_admin_id(&self, user_id: UserId) -> bool {
        user_id.0 == self.admin_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_id_matching() {
        let config = BotConfig::with_admin(42);
        assert!(config.is_admin_id(UserId(42)));
        assert!(!config.is_admin_id(UserId(43)));
    }

    #[test]
    fn test_missing_user_is_not_admin() {
        let config = BotConfig::with_admin(42);
        assert!(!config.is_admin(None));
    }
}
