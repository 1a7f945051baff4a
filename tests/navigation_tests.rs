use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use teloxide::types::{InlineKeyboardButtonKind, InlineKeyboardMarkup};

use storefront_bot::bot::navigation;
use storefront_bot::bot::ui_builder::Screen;
use storefront_bot::db;
use storefront_bot::dialogue::DialogueState;
use storefront_bot::session::{BrowseCursor, Session};

async fn setup_test_db() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    db::init_schema(&pool).await?;
    Ok(pool)
}

fn rows(screen: &Screen) -> Vec<Vec<String>> {
    fn data(markup: &InlineKeyboardMarkup) -> Vec<Vec<String>> {
        markup
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| match &b.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                        other => panic!("unexpected button kind: {other:?}"),
                    })
                    .collect()
            })
            .collect()
    }
    screen.keyboard.as_ref().map(data).unwrap_or_default()
}

/// Typing past the delete keyboard must not cost the user the keyboard:
/// the rebuilt screen still carries the pick-a-target buttons.
#[tokio::test]
async fn test_rejected_text_keeps_delete_target_keyboard() -> Result<()> {
    let pool = setup_test_db().await?;
    let drinks = db::create_category(&pool, "Drinks").await?;

    let mut session = Session::default();
    session.state = DialogueState::AwaitingCategoryDeleteTarget;

    let screen = navigation::current_screen(&pool, &mut session, true)
        .await?
        .expect("categories still exist");
    assert_eq!(rows(&screen)[0], vec![format!("delcat_{drinks}")]);
    assert_eq!(session.state, DialogueState::AwaitingCategoryDeleteTarget);
    Ok(())
}

/// The confirm screen is rebuilt with its confirm/cancel buttons while the
/// row exists, and reports gone once it has been deleted underneath.
#[tokio::test]
async fn test_confirm_screen_follows_backing_row() -> Result<()> {
    let pool = setup_test_db().await?;
    let drinks = db::create_category(&pool, "Drinks").await?;

    let mut session = Session::default();
    session.state = DialogueState::AwaitingCategoryDeleteConfirm {
        category_id: drinks,
    };

    let screen = navigation::current_screen(&pool, &mut session, true)
        .await?
        .expect("category still exists");
    assert_eq!(
        rows(&screen),
        vec![vec![
            "confirm_delete_category".to_string(),
            "cancel_delete_category".to_string()
        ]]
    );

    db::delete_category(&pool, drinks).await?;
    let gone = navigation::current_screen(&pool, &mut session, true).await?;
    assert!(gone.is_none());
    Ok(())
}

/// A stray non-text input while browsing re-renders the product page,
/// re-anchored against the fresh listing.
#[tokio::test]
async fn test_idle_browse_screen_reanchors_after_delete() -> Result<()> {
    let pool = setup_test_db().await?;
    let drinks = db::create_category(&pool, "Drinks").await?;
    let cold = db::create_subcategory(&pool, "Cold", drinks).await?;
    let cola = db::create_product(&pool, "Cola", 1.5, None, cold).await?;
    let fanta = db::create_product(&pool, "Fanta", 1.5, None, cold).await?;
    let spa = db::create_product(&pool, "Spa", 1.0, None, cold).await?;

    let mut session = Session::default();
    let mut cursor = BrowseCursor::new(cold, vec![cola, fanta, spa]).expect("non-empty");
    cursor.advance();
    session.cursor = Some(cursor);

    db::delete_product(&pool, cola).await?;

    let screen = navigation::current_screen(&pool, &mut session, false)
        .await?
        .expect("products remain");
    // Fanta stayed current and is now first of two.
    assert!(screen.text.contains("Fanta"));
    assert!(screen.text.contains("1/2"));
    let cursor = session.cursor.as_ref().expect("cursor survives");
    assert_eq!(cursor.current(), fanta);
    Ok(())
}

/// Idle without a cursor falls back to the category list for the viewer's
/// role.
#[tokio::test]
async fn test_idle_without_cursor_rebuilds_category_list() -> Result<()> {
    let pool = setup_test_db().await?;
    db::create_category(&pool, "Drinks").await?;

    let mut session = Session::default();
    let screen = navigation::current_screen(&pool, &mut session, true)
        .await?
        .expect("always renderable");
    let rows = rows(&screen);
    assert_eq!(rows[1], vec!["add_category", "delete_category"]);
    assert_eq!(rows[2], vec!["view_as_customer"]);
    Ok(())
}

/// A pick-a-target screen whose listing emptied concurrently reports gone
/// so the caller can fall back to the category list.
#[tokio::test]
async fn test_emptied_target_list_reports_gone() -> Result<()> {
    let pool = setup_test_db().await?;
    let drinks = db::create_category(&pool, "Drinks").await?;
    let cold = db::create_subcategory(&pool, "Cold", drinks).await?;

    let mut session = Session::default();
    session.state = DialogueState::AwaitingProductDeleteTarget {
        subcategory_id: cold,
    };

    let gone = navigation::current_screen(&pool, &mut session, true).await?;
    assert!(gone.is_none());
    Ok(())
}
