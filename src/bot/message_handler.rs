//! Message handler: commands, free-text form input and photo messages.
//!
//! Together with `callback_handler` this is the dialogue engine — the only
//! code that moves `DialogueState` between variants.

use std::sync::Arc;

use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use teloxide::prelude::*;
use tracing::{debug, error};

use crate::config::BotConfig;
use crate::db::{self, RepoError};
use crate::dialogue::{self, DialogueState};
use crate::session::{Session, SessionStore};

use super::renderer::{self, RefreshTarget};
use super::ui_builder::{self, Screen};
use super::{navigation, with_repo_timeout};

/// Entry point for every inbound message (dispatcher endpoint).
///
/// Locks the chat's session for the duration of the event, which gives
/// strict per-chat ordering. Failures roll the dialogue back to `Idle`
/// and show a generic retry message instead of leaving the user stuck
/// mid-form.
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    pool: SqlitePool,
    store: SessionStore,
    config: Arc<BotConfig>,
) -> Result<()> {
    let chat_id = msg.chat.id;

    let session = store.session(chat_id).await;
    let mut session = session.lock().await;
    session.cancel_refresh();
    renderer::note_user_message(&mut session, &msg);

    if let Err(e) = handle_message(&bot, &msg, &pool, &store, &config, &mut session).await {
        error!(%chat_id, error = %e, "Message handling failed");
        session.reset();
        let _ = bot.send_message(chat_id, ui_builder::ERR_TRY_AGAIN).await;
    }

    Ok(())
}

async fn handle_message(
    bot: &Bot,
    msg: &Message,
    pool: &SqlitePool,
    store: &SessionStore,
    config: &BotConfig,
    session: &mut Session,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let is_admin = config.is_admin(msg.from.as_ref());

    if let Some(text) = msg.text() {
        debug!(%chat_id, message_length = text.len(), "Received text message");

        if text == "/start" || text == "/menu" {
            return navigation::render_category_list(bot, pool, session, chat_id, is_admin, true)
                .await;
        }
        return handle_text(bot, pool, store, session, chat_id, is_admin, text).await;
    }

    if msg.photo().is_some() {
        return handle_photo(bot, msg, pool, store, session, chat_id, is_admin).await;
    }

    // Stickers, documents, voice notes and the like have no meaning here;
    // complain but keep the active screen.
    reject_input(
        bot,
        pool,
        session,
        chat_id,
        is_admin,
        ui_builder::UNSUPPORTED_INPUT,
    )
    .await
}

async fn handle_text(
    bot: &Bot,
    pool: &SqlitePool,
    store: &SessionStore,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
    text: &str,
) -> Result<()> {
    match session.state.clone() {
        // Free text outside any form: just bring the menu back.
        DialogueState::Idle => {
            navigation::render_category_list(bot, pool, session, chat_id, is_admin, true).await
        }

        DialogueState::AwaitingCategoryName => {
            let name = match dialogue::validate_category_name(text) {
                Ok(name) => name,
                Err("too_long") => {
                    return reprompt(bot, chat_id, session, ui_builder::ERR_NAME_TOO_LONG).await
                }
                Err(_) => return reprompt(bot, chat_id, session, ui_builder::ERR_NAME_EMPTY).await,
            };
            match with_repo_timeout(db::create_category(pool, &name)).await {
                Ok(_) => {
                    session.reset();
                    success_then_refresh(
                        bot,
                        pool,
                        store,
                        session,
                        chat_id,
                        is_admin,
                        ui_builder::created_message(&name),
                        RefreshTarget::Categories,
                    )
                    .await
                }
                Err(RepoError::Duplicate) => {
                    reprompt(bot, chat_id, session, ui_builder::ERR_NAME_TAKEN).await
                }
                Err(e) => Err(e.into()),
            }
        }

        DialogueState::AwaitingSubcategoryName { category_id } => {
            // The parent may have been deleted while the prompt was up.
            if with_repo_timeout(db::get_category(pool, category_id))
                .await?
                .is_none()
            {
                return navigation::render_category_list(bot, pool, session, chat_id, is_admin, true)
                    .await;
            }
            let name = match dialogue::validate_subcategory_name(text) {
                Ok(name) => name,
                Err("too_long") => {
                    return reprompt(bot, chat_id, session, ui_builder::ERR_NAME_TOO_LONG).await
                }
                Err(_) => return reprompt(bot, chat_id, session, ui_builder::ERR_NAME_EMPTY).await,
            };
            match with_repo_timeout(db::create_subcategory(pool, &name, category_id)).await {
                Ok(_) => {
                    session.reset();
                    success_then_refresh(
                        bot,
                        pool,
                        store,
                        session,
                        chat_id,
                        is_admin,
                        ui_builder::created_message(&name),
                        RefreshTarget::Subcategories(category_id),
                    )
                    .await
                }
                Err(RepoError::Duplicate) => {
                    reprompt(bot, chat_id, session, ui_builder::ERR_NAME_TAKEN).await
                }
                Err(e) => Err(e.into()),
            }
        }

        DialogueState::AwaitingProductName { subcategory_id } => {
            if with_repo_timeout(db::get_subcategory(pool, subcategory_id))
                .await?
                .is_none()
            {
                return navigation::render_category_list(bot, pool, session, chat_id, is_admin, true)
                    .await;
            }
            match dialogue::validate_product_name(text) {
                Ok(name) => {
                    session.state = DialogueState::AwaitingProductPrice {
                        subcategory_id,
                        name,
                    };
                    reprompt(bot, chat_id, session, ui_builder::PROMPT_PRODUCT_PRICE).await
                }
                Err("too_long") => {
                    reprompt(bot, chat_id, session, ui_builder::ERR_NAME_TOO_LONG).await
                }
                Err(_) => reprompt(bot, chat_id, session, ui_builder::ERR_NAME_EMPTY).await,
            }
        }

        DialogueState::AwaitingProductPrice {
            subcategory_id,
            name,
        } => match dialogue::parse_price(text) {
            Ok(price) => {
                session.state = DialogueState::AwaitingProductPhoto {
                    subcategory_id,
                    name,
                    price,
                };
                reprompt(bot, chat_id, session, ui_builder::PROMPT_PRODUCT_PHOTO).await
            }
            Err(_) => reprompt(bot, chat_id, session, ui_builder::ERR_PRICE_INVALID).await,
        },

        DialogueState::AwaitingProductPhoto {
            subcategory_id,
            name,
            price,
        } => {
            if text == "/skip" {
                create_product(
                    bot,
                    pool,
                    store,
                    session,
                    chat_id,
                    is_admin,
                    &name,
                    price,
                    None,
                    subcategory_id,
                )
                .await
            } else {
                reprompt(bot, chat_id, session, ui_builder::ERR_SEND_PHOTO_OR_SKIP).await
            }
        }

        // These screens expect a button press; text means the user typed
        // past the keyboard. The screen with its buttons must survive the
        // complaint.
        DialogueState::AwaitingCategoryDeleteTarget
        | DialogueState::AwaitingCategoryDeleteConfirm { .. }
        | DialogueState::AwaitingSubcategoryDeleteTarget { .. }
        | DialogueState::AwaitingSubcategoryDeleteConfirm { .. }
        | DialogueState::AwaitingProductDeleteTarget { .. }
        | DialogueState::AwaitingProductDeleteConfirm { .. } => {
            reject_input(bot, pool, session, chat_id, is_admin, ui_builder::ERR_USE_BUTTONS).await
        }
    }
}

async fn handle_photo(
    bot: &Bot,
    msg: &Message,
    pool: &SqlitePool,
    store: &SessionStore,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
) -> Result<()> {
    match session.state.clone() {
        DialogueState::AwaitingProductPhoto {
            subcategory_id,
            name,
            price,
        } => {
            // Telegram sends several sizes; keep the largest.
            let file_id = msg
                .photo()
                .and_then(|sizes| sizes.last())
                .map(|photo| photo.file.id.0.clone());
            let Some(file_id) = file_id else {
                return reprompt(bot, chat_id, session, ui_builder::ERR_SEND_PHOTO_OR_SKIP).await;
            };
            create_product(
                bot,
                pool,
                store,
                session,
                chat_id,
                is_admin,
                &name,
                price,
                Some(&file_id),
                subcategory_id,
            )
            .await
        }
        _ => {
            reject_input(
                bot,
                pool,
                session,
                chat_id,
                is_admin,
                ui_builder::UNSUPPORTED_INPUT,
            )
            .await
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn create_product(
    bot: &Bot,
    pool: &SqlitePool,
    store: &SessionStore,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
    name: &str,
    price: f64,
    photo: Option<&str>,
    subcategory_id: i64,
) -> Result<()> {
    // Re-check the parent: it may have been deleted since the form began.
    if with_repo_timeout(db::get_subcategory(pool, subcategory_id))
        .await?
        .is_none()
    {
        return navigation::render_category_list(bot, pool, session, chat_id, is_admin, true).await;
    }

    with_repo_timeout(db::create_product(pool, name, price, photo, subcategory_id)).await?;
    session.reset();
    success_then_refresh(
        bot,
        pool,
        store,
        session,
        chat_id,
        is_admin,
        ui_builder::created_message(name),
        RefreshTarget::Products(subcategory_id),
    )
    .await
}

/// Re-prompt and stay in the current state. The previous screen and the
/// user's rejected input are cleaned up so only the prompt remains.
/// Only for text-form prompts, which never carry buttons.
async fn reprompt(bot: &Bot, chat_id: ChatId, session: &mut Session, text: &str) -> Result<()> {
    renderer::render(bot, chat_id, session, &Screen::text(text), true).await
}

/// Reject an input without losing the active screen: re-render the state's
/// screen with the complaint prepended, so its buttons stay pressable.
/// Falls back to the category list when the screen's backing rows have
/// vanished.
async fn reject_input(
    bot: &Bot,
    pool: &SqlitePool,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
    notice: &str,
) -> Result<()> {
    match navigation::current_screen(pool, session, is_admin).await? {
        Some(screen) => {
            let screen = Screen {
                text: format!("{notice}\n\n{}", screen.text),
                ..screen
            };
            renderer::render(bot, chat_id, session, &screen, true).await
        }
        None => navigation::render_category_list(bot, pool, session, chat_id, is_admin, true).await,
    }
}

/// Show a success line, then let the scheduled refresh replace it with the
/// target screen.
#[allow(clippy::too_many_arguments)]
async fn success_then_refresh(
    bot: &Bot,
    pool: &SqlitePool,
    store: &SessionStore,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
    line: String,
    target: RefreshTarget,
) -> Result<()> {
    renderer::render(bot, chat_id, session, &Screen::text(line), true).await?;
    renderer::schedule_refresh(
        bot.clone(),
        pool.clone(),
        store.clone(),
        session,
        chat_id,
        is_admin,
        target,
    );
    Ok(())
}
