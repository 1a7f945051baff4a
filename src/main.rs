use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront_bot::bot;
use storefront_bot::config::BotConfig;
use storefront_bot::db;
use storefront_bot::session::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting storefront bot");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Arc::new(BotConfig::from_env()?);

    info!(database_url = %config.database_url, "Opening catalog database");
    let options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    db::init_schema(&pool).await?;

    let bot = Bot::new(config.bot_token.clone());
    let store = SessionStore::new();

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(bot::message_handler))
        .branch(Update::filter_callback_query().endpoint(bot::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![pool, store, config])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
