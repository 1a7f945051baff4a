//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: commands, free-text form input and photo messages
//! - `callback_handler`: inline keyboard button presses
//! - `navigation`: fetch-build-render calls for the catalog screens
//! - `ui_builder`: pure screen construction (text + keyboards)
//! - `renderer`: single-active-screen rendering and the delayed refresh

pub mod callback_handler;
pub mod message_handler;
pub mod navigation;
pub mod renderer;
pub mod ui_builder;

// Re-export the dispatcher endpoints for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

use std::time::Duration;

use crate::db::RepoError;

/// Upper bound on any single repository call; no suspension point is
/// allowed to block indefinitely.
pub(crate) const REPO_TIMEOUT: Duration = Duration::from_secs(5);

/// Wrap a repository future with the bounded timeout. An elapsed timer
/// maps to `RepoError::Timeout`, which callers surface to the user as a
/// generic failure.
pub(crate) async fn with_repo_timeout<T>(
    fut: impl std::future::Future<Output = Result<T, RepoError>>,
) -> Result<T, RepoError> {
    tokio::time::timeout(REPO_TIMEOUT, fut)
        .await
        .unwrap_or(Err(RepoError::Timeout))
}
