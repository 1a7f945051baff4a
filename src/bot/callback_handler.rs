//! Callback handler: decodes button payloads and drives the state machine
//! transitions that come from inline keyboards.

use std::sync::Arc;

use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use teloxide::prelude::*;
use tracing::{debug, error};

use crate::config::BotConfig;
use crate::db;
use crate::dialogue::DialogueState;
use crate::payload::CallbackPayload;
use crate::session::{Session, SessionStore};

use super::renderer;
use super::ui_builder;
use super::{navigation, with_repo_timeout};

/// Toast shown when answering a callback query.
struct CallbackAnswer {
    text: &'static str,
    alert: bool,
}

fn notice(text: &'static str) -> Option<CallbackAnswer> {
    Some(CallbackAnswer { text, alert: false })
}

fn alert(text: &'static str) -> Option<CallbackAnswer> {
    Some(CallbackAnswer { text, alert: true })
}

/// Entry point for every button press (dispatcher endpoint).
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    pool: SqlitePool,
    store: SessionStore,
    config: Arc<BotConfig>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query");

    let Some(message) = q.message.as_ref() else {
        // The message is too old for Telegram to reference; there is
        // nothing to render into.
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let chat_id = message.chat().id;
    let is_admin = config.is_admin(Some(&q.from));

    let session = store.session(chat_id).await;
    let mut session = session.lock().await;
    session.cancel_refresh();

    let payload = q.data.as_deref().and_then(CallbackPayload::decode);

    match handle_callback(&bot, &pool, &mut session, chat_id, is_admin, payload).await {
        Ok(answer) => {
            // Always answer, to clear the button's loading spinner.
            let mut request = bot.answer_callback_query(q.id);
            if let Some(answer) = answer {
                request = request.text(answer.text);
                if answer.alert {
                    request = request.show_alert(true);
                }
            }
            request.await?;
        }
        Err(e) => {
            error!(%chat_id, error = %e, "Callback handling failed");
            session.reset();
            let _ = bot.answer_callback_query(q.id).await;
            let _ = bot.send_message(chat_id, ui_builder::ERR_TRY_AGAIN).await;
        }
    }

    Ok(())
}

fn requires_admin(payload: &CallbackPayload) -> bool {
    !matches!(
        payload,
        CallbackPayload::Category(_)
            | CallbackPayload::Subcategory(_)
            | CallbackPayload::Order(_)
            | CallbackPayload::PrevProduct
            | CallbackPayload::NextProduct
            | CallbackPayload::BackToCategories
    )
}

async fn handle_callback(
    bot: &Bot,
    pool: &SqlitePool,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
    payload: Option<CallbackPayload>,
) -> Result<Option<CallbackAnswer>> {
    let Some(payload) = payload else {
        // Unknown or malformed payload: treat like a press on something
        // that no longer exists.
        return stale(bot, pool, session, chat_id, is_admin).await;
    };

    if requires_admin(&payload) && !is_admin {
        return Ok(alert(ui_builder::ERR_NOT_ALLOWED));
    }

    match payload {
        CallbackPayload::BackToCategories => {
            navigation::render_category_list(bot, pool, session, chat_id, is_admin, true).await?;
            Ok(None)
        }

        CallbackPayload::Category(category_id) => {
            // A vanished category falls back to the list inside navigation.
            navigation::render_subcategory_list(
                bot, pool, session, chat_id, category_id, is_admin, true,
            )
            .await?;
            Ok(None)
        }

        CallbackPayload::Subcategory(subcategory_id) => {
            navigation::render_product_list(
                bot,
                pool,
                session,
                chat_id,
                subcategory_id,
                is_admin,
                true,
            )
            .await?;
            Ok(None)
        }

        CallbackPayload::Product(product_id) => {
            match with_repo_timeout(db::get_product(pool, product_id)).await? {
                Some(product) => {
                    session.reset();
                    let screen = ui_builder::product_detail(&product);
                    renderer::render(bot, chat_id, session, &screen, true).await?;
                    Ok(None)
                }
                None => stale(bot, pool, session, chat_id, is_admin).await,
            }
        }

        CallbackPayload::ViewAsCustomer => {
            // One-screen preview of what customers see; any later event
            // re-derives the real role.
            navigation::render_category_list(bot, pool, session, chat_id, false, true).await?;
            Ok(None)
        }

        CallbackPayload::Order(product_id) => {
            // Payment is out of scope; just acknowledge the order.
            match with_repo_timeout(db::get_product(pool, product_id)).await? {
                Some(_) => Ok(notice(ui_builder::ORDER_RECEIVED)),
                None => stale(bot, pool, session, chat_id, is_admin).await,
            }
        }

        CallbackPayload::PrevProduct => {
            turn_page(bot, pool, session, chat_id, is_admin, false).await
        }
        CallbackPayload::NextProduct => {
            turn_page(bot, pool, session, chat_id, is_admin, true).await
        }

        CallbackPayload::AddCategory => {
            session.reset();
            session.state = DialogueState::AwaitingCategoryName;
            prompt(bot, chat_id, session, ui_builder::PROMPT_CATEGORY_NAME).await?;
            Ok(None)
        }

        CallbackPayload::DeleteCategory => {
            let categories = with_repo_timeout(db::list_categories(pool)).await?;
            if categories.is_empty() {
                return stale(bot, pool, session, chat_id, is_admin).await;
            }
            session.reset();
            session.state = DialogueState::AwaitingCategoryDeleteTarget;
            let screen = ui_builder::category_delete_list(&categories);
            renderer::render(bot, chat_id, session, &screen, true).await?;
            Ok(None)
        }

        CallbackPayload::DeleteCategoryTarget(category_id) => {
            if session.state != DialogueState::AwaitingCategoryDeleteTarget {
                return stale(bot, pool, session, chat_id, is_admin).await;
            }
            match with_repo_timeout(db::get_category(pool, category_id)).await? {
                Some(category) => {
                    session.state = DialogueState::AwaitingCategoryDeleteConfirm { category_id };
                    let screen = ui_builder::confirm_delete_category(&category);
                    renderer::render(bot, chat_id, session, &screen, true).await?;
                    Ok(None)
                }
                None => stale(bot, pool, session, chat_id, is_admin).await,
            }
        }

        CallbackPayload::ConfirmDeleteCategory => {
            let Some(category_id) = session.state.category_delete_confirm() else {
                return stale(bot, pool, session, chat_id, is_admin).await;
            };
            with_repo_timeout(db::delete_category(pool, category_id)).await?;
            session.reset();
            navigation::render_category_list(bot, pool, session, chat_id, is_admin, true).await?;
            Ok(notice(ui_builder::DELETED))
        }

        CallbackPayload::CancelDeleteCategory => {
            if session.state.category_delete_confirm().is_none() {
                return stale(bot, pool, session, chat_id, is_admin).await;
            }
            navigation::render_category_list(bot, pool, session, chat_id, is_admin, true).await?;
            Ok(None)
        }

        CallbackPayload::AddSubcategory(category_id) => {
            if with_repo_timeout(db::get_category(pool, category_id))
                .await?
                .is_none()
            {
                return stale(bot, pool, session, chat_id, is_admin).await;
            }
            session.reset();
            session.state = DialogueState::AwaitingSubcategoryName { category_id };
            prompt(bot, chat_id, session, ui_builder::PROMPT_SUBCATEGORY_NAME).await?;
            Ok(None)
        }

        CallbackPayload::DeleteSubcategory(category_id) => {
            let subcategories =
                with_repo_timeout(db::list_subcategories(pool, category_id)).await?;
            if subcategories.is_empty() {
                return stale(bot, pool, session, chat_id, is_admin).await;
            }
            session.reset();
            session.state = DialogueState::AwaitingSubcategoryDeleteTarget { category_id };
            let screen = ui_builder::subcategory_delete_list(&subcategories);
            renderer::render(bot, chat_id, session, &screen, true).await?;
            Ok(None)
        }

        CallbackPayload::DeleteSubcategoryTarget(subcategory_id) => {
            let Some(category_id) = session.state.subcategory_delete_target() else {
                return stale(bot, pool, session, chat_id, is_admin).await;
            };
            match with_repo_timeout(db::get_subcategory(pool, subcategory_id)).await? {
                Some(subcategory) => {
                    session.state = DialogueState::AwaitingSubcategoryDeleteConfirm {
                        subcategory_id,
                        category_id,
                    };
                    let screen = ui_builder::confirm_delete_subcategory(&subcategory);
                    renderer::render(bot, chat_id, session, &screen, true).await?;
                    Ok(None)
                }
                None => stale(bot, pool, session, chat_id, is_admin).await,
            }
        }

        CallbackPayload::ConfirmDeleteSubcategory => {
            let Some((subcategory_id, category_id)) = session.state.subcategory_delete_confirm()
            else {
                return stale(bot, pool, session, chat_id, is_admin).await;
            };
            with_repo_timeout(db::delete_subcategory(pool, subcategory_id)).await?;
            session.reset();
            navigation::render_subcategory_list(
                bot, pool, session, chat_id, category_id, is_admin, true,
            )
            .await?;
            Ok(notice(ui_builder::DELETED))
        }

        CallbackPayload::CancelDeleteSubcategory => {
            let Some((_, category_id)) = session.state.subcategory_delete_confirm() else {
                return stale(bot, pool, session, chat_id, is_admin).await;
            };
            navigation::render_subcategory_list(
                bot, pool, session, chat_id, category_id, is_admin, true,
            )
            .await?;
            Ok(None)
        }

        CallbackPayload::AddProduct(subcategory_id) => {
            if with_repo_timeout(db::get_subcategory(pool, subcategory_id))
                .await?
                .is_none()
            {
                return stale(bot, pool, session, chat_id, is_admin).await;
            }
            session.reset();
            session.state = DialogueState::AwaitingProductName { subcategory_id };
            prompt(bot, chat_id, session, ui_builder::PROMPT_PRODUCT_NAME).await?;
            Ok(None)
        }

        CallbackPayload::DeleteProduct(subcategory_id) => {
            let products = with_repo_timeout(db::list_products(pool, subcategory_id)).await?;
            if products.is_empty() {
                return stale(bot, pool, session, chat_id, is_admin).await;
            }
            session.reset();
            session.state = DialogueState::AwaitingProductDeleteTarget { subcategory_id };
            let screen = ui_builder::product_delete_list(&products);
            renderer::render(bot, chat_id, session, &screen, true).await?;
            Ok(None)
        }

        CallbackPayload::DeleteProductTarget(product_id) => {
            let Some(subcategory_id) = session.state.product_delete_target() else {
                return stale(bot, pool, session, chat_id, is_admin).await;
            };
            match with_repo_timeout(db::get_product(pool, product_id)).await? {
                Some(product) => {
                    session.state = DialogueState::AwaitingProductDeleteConfirm {
                        product_id,
                        subcategory_id,
                    };
                    let screen = ui_builder::confirm_delete_product(&product);
                    renderer::render(bot, chat_id, session, &screen, true).await?;
                    Ok(None)
                }
                None => stale(bot, pool, session, chat_id, is_admin).await,
            }
        }

        CallbackPayload::ConfirmDeleteProduct => {
            let Some((product_id, subcategory_id)) = session.state.product_delete_confirm() else {
                return stale(bot, pool, session, chat_id, is_admin).await;
            };
            with_repo_timeout(db::delete_product(pool, product_id)).await?;
            session.reset();
            navigation::render_product_list(
                bot,
                pool,
                session,
                chat_id,
                subcategory_id,
                is_admin,
                true,
            )
            .await?;
            Ok(notice(ui_builder::DELETED))
        }

        CallbackPayload::CancelDeleteProduct => {
            let Some((_, subcategory_id)) = session.state.product_delete_confirm() else {
                return stale(bot, pool, session, chat_id, is_admin).await;
            };
            navigation::render_product_list(
                bot,
                pool,
                session,
                chat_id,
                subcategory_id,
                is_admin,
                true,
            )
            .await?;
            Ok(None)
        }
    }
}

/// Move the customer browse cursor one step and re-render the page.
///
/// The product listing is re-fetched first so a cursor referencing rows
/// deleted by an admin in the meantime re-anchors instead of pointing past
/// the end; an emptied listing falls back to re-rendering the subcategory
/// scope.
async fn turn_page(
    bot: &Bot,
    pool: &SqlitePool,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
    forward: bool,
) -> Result<Option<CallbackAnswer>> {
    let Some(mut cursor) = session.cursor.take() else {
        // A paging button from a screen that is no longer current.
        return stale(bot, pool, session, chat_id, is_admin).await;
    };

    let products = with_repo_timeout(db::list_products(pool, cursor.subcategory_id)).await?;
    if !cursor.sync(products.iter().map(|p| p.id).collect()) {
        navigation::render_product_list(
            bot,
            pool,
            session,
            chat_id,
            cursor.subcategory_id,
            is_admin,
            true,
        )
        .await?;
        return Ok(None);
    }

    if forward {
        cursor.advance();
    } else {
        cursor.retreat();
    }

    let screen = ui_builder::product_page(&products, &cursor);
    session.cursor = Some(cursor);
    renderer::render(bot, chat_id, session, &screen, true).await?;
    Ok(None)
}

/// A press that no longer matches the dialogue or the catalog (stale
/// button, vanished row): reset and fall back to the category list.
async fn stale(
    bot: &Bot,
    pool: &SqlitePool,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
) -> Result<Option<CallbackAnswer>> {
    session.reset();
    navigation::render_category_list(bot, pool, session, chat_id, is_admin, true).await?;
    Ok(alert(ui_builder::ERR_GONE))
}

async fn prompt(bot: &Bot, chat_id: ChatId, session: &mut Session, text: &str) -> Result<()> {
    renderer::render(bot, chat_id, session, &ui_builder::Screen::text(text), true).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_verbs_need_no_admin() {
        for payload in [
            CallbackPayload::Category(1),
            CallbackPayload::Subcategory(5),
            CallbackPayload::Order(12),
            CallbackPayload::PrevProduct,
            CallbackPayload::NextProduct,
            CallbackPayload::BackToCategories,
        ] {
            assert!(!requires_admin(&payload), "{payload:?}");
        }
    }

    #[test]
    fn test_management_verbs_are_admin_gated() {
        for payload in [
            CallbackPayload::Product(12),
            CallbackPayload::AddCategory,
            CallbackPayload::DeleteCategory,
            CallbackPayload::DeleteCategoryTarget(7),
            CallbackPayload::ConfirmDeleteCategory,
            CallbackPayload::CancelDeleteCategory,
            CallbackPayload::AddSubcategory(1),
            CallbackPayload::DeleteSubcategory(1),
            CallbackPayload::DeleteSubcategoryTarget(9),
            CallbackPayload::ConfirmDeleteSubcategory,
            CallbackPayload::CancelDeleteSubcategory,
            CallbackPayload::AddProduct(5),
            CallbackPayload::DeleteProduct(5),
            CallbackPayload::DeleteProductTarget(3),
            CallbackPayload::ConfirmDeleteProduct,
            CallbackPayload::CancelDeleteProduct,
            CallbackPayload::ViewAsCustomer,
        ] {
            assert!(requires_admin(&payload), "{payload:?}");
        }
    }
}
