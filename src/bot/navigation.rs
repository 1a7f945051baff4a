//! Direct navigation calls: fetch the catalog slice, build the screen,
//! render it and settle the session on `Idle`.
//!
//! Callback presses, form completions and scheduled refreshes all land
//! here, so every path renders a given screen the same way. When the
//! requested entity has vanished (deleted concurrently), these fall back
//! to the nearest valid parent screen instead of failing.

use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use teloxide::prelude::*;
use tracing::warn;

use crate::db;
use crate::dialogue::DialogueState;
use crate::session::{BrowseCursor, Session};

use super::renderer;
use super::ui_builder::{self, Screen};
use super::with_repo_timeout;

/// Render the top-level category list and reset the dialogue.
pub async fn render_category_list(
    bot: &Bot,
    pool: &SqlitePool,
    session: &mut Session,
    chat_id: ChatId,
    is_admin: bool,
    delete_previous: bool,
) -> Result<()> {
    let categories = with_repo_timeout(db::list_categories(pool)).await?;
    session.reset();

    let screen = ui_builder::category_list(&categories, is_admin);
    renderer::render(bot, chat_id, session, &screen, delete_previous).await
}

/// Rebuild the screen the chat is currently supposed to show, without
/// changing the dialogue state.
///
/// Rejected inputs re-render this screen together with the complaint, so
/// a screen that carries buttons keeps them. `None` means the backing
/// rows vanished (or a pick-a-target list emptied) and the caller should
/// fall back to the category list.
pub async fn current_screen(
    pool: &SqlitePool,
    session: &mut Session,
    is_admin: bool,
) -> Result<Option<Screen>> {
    let screen = match session.state.clone() {
        DialogueState::Idle => match session.cursor.take() {
            Some(mut cursor) => {
                let products =
                    with_repo_timeout(db::list_products(pool, cursor.subcategory_id)).await?;
                if !cursor.sync(products.iter().map(|p| p.id).collect()) {
                    return Ok(None);
                }
                let screen = ui_builder::product_page(&products, &cursor);
                session.cursor = Some(cursor);
                screen
            }
            None => {
                let categories = with_repo_timeout(db::list_categories(pool)).await?;
                ui_builder::category_list(&categories, is_admin)
            }
        },

        // Text-form prompts carry no buttons; showing the prompt again is
        // enough.
        DialogueState::AwaitingCategoryName => Screen::text(ui_builder::PROMPT_CATEGORY_NAME),
        DialogueState::AwaitingSubcategoryName { .. } => {
            Screen::text(ui_builder::PROMPT_SUBCATEGORY_NAME)
        }
        DialogueState::AwaitingProductName { .. } => Screen::text(ui_builder::PROMPT_PRODUCT_NAME),
        DialogueState::AwaitingProductPrice { .. } => {
            Screen::text(ui_builder::PROMPT_PRODUCT_PRICE)
        }
        DialogueState::AwaitingProductPhoto { .. } => {
            Screen::text(ui_builder::PROMPT_PRODUCT_PHOTO)
        }

        DialogueState::AwaitingCategoryDeleteTarget => {
            let categories = with_repo_timeout(db::list_categories(pool)).await?;
            if categories.is_empty() {
                return Ok(None);
            }
            ui_builder::category_delete_list(&categories)
        }
        DialogueState::AwaitingCategoryDeleteConfirm { category_id } => {
            match with_repo_timeout(db::get_category(pool, category_id)).await? {
                Some(category) => ui_builder::confirm_delete_category(&category),
                None => return Ok(None),
            }
        }
        DialogueState::AwaitingSubcategoryDeleteTarget { category_id } => {
            let subcategories =
                with_repo_timeout(db::list_subcategories(pool, category_id)).await?;
            if subcategories.is_empty() {
                return Ok(None);
            }
            ui_builder::subcategory_delete_list(&subcategories)
        }
        DialogueState::AwaitingSubcategoryDeleteConfirm { subcategory_id, .. } => {
            match with_repo_timeout(db::get_subcategory(pool, subcategory_id)).await? {
                Some(subcategory) => ui_builder::confirm_delete_subcategory(&subcategory),
                None => return Ok(None),
            }
        }
        DialogueState::AwaitingProductDeleteTarget { subcategory_id } => {
            let products = with_repo_timeout(db::list_products(pool, subcategory_id)).await?;
            if products.is_empty() {
                return Ok(None);
            }
            ui_builder::product_delete_list(&products)
        }
        DialogueState::AwaitingProductDeleteConfirm { product_id, .. } => {
            match with_repo_timeout(db::get_product(pool, product_id)).await? {
                Some(product) => ui_builder::confirm_delete_product(&product),
                None => return Ok(None),
            }
        }
    };
    Ok(Some(screen))
}

/// Render the subcategory list of one category and reset the dialogue.
pub async fn render_subcategory_list(
    bot: &Bot,
    pool: &SqlitePool,
    session: &mut Session,
    chat_id: ChatId,
    category_id: i64,
    is_admin: bool,
    delete_previous: bool,
) -> Result<()> {
    let Some(category) = with_repo_timeout(db::get_category(pool, category_id)).await? else {
        warn!(%chat_id, category_id, "Category vanished, falling back to category list");
        return render_category_list(bot, pool, session, chat_id, is_admin, delete_previous).await;
    };
    let subcategories = with_repo_timeout(db::list_subcategories(pool, category_id)).await?;
    session.reset();

    let screen = ui_builder::subcategory_list(&category, &subcategories, is_admin);
    renderer::render(bot, chat_id, session, &screen, delete_previous).await
}

/// Render the product listing of one subcategory and reset the dialogue.
///
/// Admins get the full button list; customers get the first page of the
/// one-at-a-time view with a fresh browse cursor.
pub async fn render_product_list(
    bot: &Bot,
    pool: &SqlitePool,
    session: &mut Session,
    chat_id: ChatId,
    subcategory_id: i64,
    is_admin: bool,
    delete_previous: bool,
) -> Result<()> {
    let Some(subcategory) = with_repo_timeout(db::get_subcategory(pool, subcategory_id)).await?
    else {
        warn!(%chat_id, subcategory_id, "Subcategory vanished, falling back to category list");
        return render_category_list(bot, pool, session, chat_id, is_admin, delete_previous).await;
    };
    let products = with_repo_timeout(db::list_products(pool, subcategory_id)).await?;
    session.reset();

    let screen = if is_admin {
        ui_builder::product_list_admin(&subcategory, &products)
    } else {
        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        match BrowseCursor::new(subcategory_id, ids) {
            Some(cursor) => {
                let screen = ui_builder::product_page(&products, &cursor);
                session.cursor = Some(cursor);
                screen
            }
            None => ui_builder::empty_product_list(&subcategory),
        }
    };
    renderer::render(bot, chat_id, session, &screen, delete_previous).await
}
