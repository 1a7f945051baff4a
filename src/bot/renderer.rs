//! Chat Renderer: applies a `Screen` to a chat while keeping exactly one
//! active screen visible (delete-before-send), and schedules the delayed
//! refresh that replaces success confirmations.

use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile};
use tracing::{debug, warn};

use crate::session::{Session, SessionStore};

use super::navigation;
use super::ui_builder::Screen;

/// How long a success line stays on screen before the auto-refresh.
pub const REFRESH_DELAY: Duration = Duration::from_secs(2);

/// Record an inbound message as the chat's last user message, so the next
/// render can clean it up no matter which state ends up handling it.
pub fn note_user_message(session: &mut Session, msg: &Message) {
    session.last_user_message = Some(msg.id);
}

/// Send `screen` to the chat, optionally deleting the previous screen
/// first.
///
/// Delete failures (message already gone, too old, no rights) are expected
/// and never abort the render. The send itself is retried once before the
/// error propagates.
pub async fn render(
    bot: &Bot,
    chat_id: ChatId,
    session: &mut Session,
    screen: &Screen,
    delete_previous: bool,
) -> Result<()> {
    if delete_previous {
        let stale = [
            session.last_bot_message.take(),
            session.last_user_message.take(),
        ];
        for message_id in stale.into_iter().flatten() {
            if let Err(e) = bot.delete_message(chat_id, message_id).await {
                debug!(%chat_id, message_id = message_id.0, error = %e, "Could not delete stale message");
            }
        }
    }

    let sent = match send_screen(bot, chat_id, screen).await {
        Ok(message) => message,
        Err(e) => {
            warn!(%chat_id, error = %e, "Send failed, retrying once");
            send_screen(bot, chat_id, screen).await?
        }
    };
    session.last_bot_message = Some(sent.id);

    Ok(())
}

async fn send_screen(
    bot: &Bot,
    chat_id: ChatId,
    screen: &Screen,
) -> Result<Message, teloxide::RequestError> {
    if let Some(file_id) = &screen.photo {
        let mut request = bot
            .send_photo(chat_id, InputFile::file_id(FileId(file_id.clone())))
            .caption(screen.text.clone());
        if let Some(keyboard) = &screen.keyboard {
            request = request.reply_markup(keyboard.clone());
        }
        request.await
    } else {
        let mut request = bot.send_message(chat_id, screen.text.clone());
        if let Some(keyboard) = &screen.keyboard {
            request = request.reply_markup(keyboard.clone());
        }
        request.await
    }
}

/// What a scheduled auto-refresh should re-render.
#[derive(Clone, Copy, Debug)]
pub enum RefreshTarget {
    Categories,
    Subcategories(i64),
    Products(i64),
}

/// Schedule the post-success screen refresh for this chat.
///
/// The task sleeps for [`REFRESH_DELAY`], then re-renders `target` with
/// delete-previous semantics so the success line disappears. The handle is
/// stored on the session and aborted by any newer inbound event, so a
/// pending refresh never races a user-triggered render.
pub fn schedule_refresh(
    bot: Bot,
    pool: SqlitePool,
    store: SessionStore,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
    target: RefreshTarget,
) {
    session.cancel_refresh();

    let handle = tokio::spawn(async move {
        tokio::time::sleep(REFRESH_DELAY).await;

        let session = store.session(chat_id).await;
        let mut session = session.lock().await;

        let result = match target {
            RefreshTarget::Categories => {
                navigation::render_category_list(&bot, &pool, &mut session, chat_id, is_admin, true)
                    .await
            }
            RefreshTarget::Subcategories(category_id) => {
                navigation::render_subcategory_list(
                    &bot,
                    &pool,
                    &mut session,
                    chat_id,
                    category_id,
                    is_admin,
                    true,
                )
                .await
            }
            RefreshTarget::Products(subcategory_id) => {
                navigation::render_product_list(
                    &bot,
                    &pool,
                    &mut session,
                    chat_id,
                    subcategory_id,
                    is_admin,
                    true,
                )
                .await
            }
        };

        if let Err(e) = result {
            warn!(%chat_id, error = %e, "Scheduled refresh failed");
        }
        session.pending_refresh = None;
    });

    session.pending_refresh = Some(handle);
}
