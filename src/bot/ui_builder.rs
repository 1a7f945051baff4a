//! UI Builder module for creating keyboards and formatting screens.
//!
//! Everything here is a pure mapping from catalog data plus the viewer's
//! role to a `Screen`; nothing talks to Telegram or the database.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::db::{Category, Product, SubCategory};
use crate::payload::CallbackPayload;
use crate::session::BrowseCursor;

// User-facing strings. Kept static per the single-language scope.
pub const NOTHING_AVAILABLE: &str = "Nothing available here yet.";
pub const PROMPT_CATEGORY_NAME: &str = "Enter the new category name:";
pub const PROMPT_SUBCATEGORY_NAME: &str = "Enter the new subcategory name:";
pub const PROMPT_PRODUCT_NAME: &str = "Enter the new product name:";
pub const PROMPT_PRODUCT_PRICE: &str = "Enter the product price:";
pub const PROMPT_PRODUCT_PHOTO: &str =
    "Send a product photo, or /skip to create the product without one.";
pub const PROMPT_DELETE_CATEGORY: &str = "Select a category to delete:";
pub const PROMPT_DELETE_SUBCATEGORY: &str = "Select a subcategory to delete:";
pub const PROMPT_DELETE_PRODUCT: &str = "Select a product to delete:";
pub const ERR_NAME_EMPTY: &str = "❌ The name cannot be empty. Try again:";
pub const ERR_NAME_TOO_LONG: &str = "❌ That name is too long. Try a shorter one:";
pub const ERR_NAME_TAKEN: &str = "❌ That name already exists. Pick another one:";
pub const ERR_PRICE_INVALID: &str =
    "❌ That does not look like a price. Send a positive number like 9.99:";
pub const ERR_USE_BUTTONS: &str = "Please use the buttons above.";
pub const ERR_SEND_PHOTO_OR_SKIP: &str = "Please send a photo, or /skip.";
pub const ERR_TRY_AGAIN: &str = "😔 Something went wrong. Please try again.";
pub const ERR_GONE: &str = "That item is no longer available.";
pub const ERR_NOT_ALLOWED: &str = "You are not allowed to do that.";
pub const ORDER_RECEIVED: &str = "✅ Order received! We will contact you shortly.";
pub const DELETED: &str = "🗑 Deleted.";
pub const UNSUPPORTED_INPUT: &str =
    "I can only work with the menu here. Send /menu to start over.";

pub fn created_message(name: &str) -> String {
    format!("✅ \"{name}\" added successfully!")
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// One renderable unit: text (or photo caption), optional keyboard and an
/// optional photo file id.
#[derive(Clone, Debug)]
pub struct Screen {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
    pub photo: Option<String>,
}

impl Screen {
    /// A plain text screen without buttons.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            photo: None,
        }
    }
}

fn button(label: impl Into<String>, payload: CallbackPayload) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.into(), payload.encode())
}

fn back_row() -> Vec<InlineKeyboardButton> {
    vec![button("⬅️ Back to categories", CallbackPayload::BackToCategories)]
}

fn markup(rows: Vec<Vec<InlineKeyboardButton>>) -> Option<InlineKeyboardMarkup> {
    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(rows))
    }
}

/// The top-level category list; admins get the management row appended.
pub fn category_list(categories: &[Category], is_admin: bool) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = categories
        .iter()
        .map(|c| vec![button(c.name.clone(), CallbackPayload::Category(c.id))])
        .collect();

    if is_admin {
        let mut actions = vec![button("➕ Add category", CallbackPayload::AddCategory)];
        if !categories.is_empty() {
            actions.push(button("🗑 Delete category", CallbackPayload::DeleteCategory));
        }
        rows.push(actions);
        rows.push(vec![button(
            "👀 View as customer",
            CallbackPayload::ViewAsCustomer,
        )]);
    }

    let title = if categories.is_empty() {
        NOTHING_AVAILABLE.to_string()
    } else {
        "🗂 Categories:".to_string()
    };
    let text = if is_admin {
        format!("🛠 Admin mode\n\n{title}")
    } else {
        title
    };

    Screen {
        text,
        keyboard: markup(rows),
        photo: None,
    }
}

/// The subcategory list of one category.
pub fn subcategory_list(
    category: &Category,
    subcategories: &[SubCategory],
    is_admin: bool,
) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = subcategories
        .iter()
        .map(|s| vec![button(s.name.clone(), CallbackPayload::Subcategory(s.id))])
        .collect();

    if is_admin {
        let mut actions = vec![button(
            "➕ Add subcategory",
            CallbackPayload::AddSubcategory(category.id),
        )];
        if !subcategories.is_empty() {
            actions.push(button(
                "🗑 Delete subcategory",
                CallbackPayload::DeleteSubcategory(category.id),
            ));
        }
        rows.push(actions);
    }
    if !rows.is_empty() {
        rows.push(back_row());
    }

    let text = if subcategories.is_empty() {
        format!("📂 {}\n\n{}", category.name, NOTHING_AVAILABLE)
    } else {
        format!("📂 {}:", category.name)
    };

    Screen {
        text,
        keyboard: markup(rows),
        photo: None,
    }
}

/// One product at a time for customers, with a movable cursor.
///
/// Prev/Next appear only where a neighbor exists; the cursor clamps, it
/// never wraps.
pub fn product_page(products: &[Product], cursor: &BrowseCursor) -> Screen {
    let Some(product) = products.get(cursor.index) else {
        return Screen::text(NOTHING_AVAILABLE);
    };

    let text = format!(
        "🛍 {}\n💵 {}\n\n{}/{}",
        product.name,
        format_price(product.price),
        cursor.index + 1,
        products.len()
    );

    let mut rows = Vec::new();
    let mut nav = Vec::new();
    if cursor.has_prev() {
        nav.push(button("⬅️ Prev", CallbackPayload::PrevProduct));
    }
    if cursor.has_next() {
        nav.push(button("Next ➡️", CallbackPayload::NextProduct));
    }
    if !nav.is_empty() {
        rows.push(nav);
    }
    rows.push(vec![button("🛒 Order", CallbackPayload::Order(product.id))]);
    rows.push(back_row());

    Screen {
        text,
        keyboard: markup(rows),
        photo: product.photo.clone(),
    }
}

/// The customer view of a subcategory with no products: title only.
pub fn empty_product_list(subcategory: &SubCategory) -> Screen {
    Screen::text(format!("📦 {}\n\n{}", subcategory.name, NOTHING_AVAILABLE))
}

/// The admin view of a subcategory's products: the full button list plus
/// the management row.
pub fn product_list_admin(subcategory: &SubCategory, products: &[Product]) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = products
        .iter()
        .map(|p| {
            vec![button(
                format!("{} — {}", p.name, format_price(p.price)),
                CallbackPayload::Product(p.id),
            )]
        })
        .collect();

    let mut actions = vec![button(
        "➕ Add product",
        CallbackPayload::AddProduct(subcategory.id),
    )];
    if !products.is_empty() {
        actions.push(button(
            "🗑 Delete product",
            CallbackPayload::DeleteProduct(subcategory.id),
        ));
    }
    rows.push(actions);
    rows.push(back_row());

    let text = if products.is_empty() {
        format!("📦 {}\n\n{}", subcategory.name, NOTHING_AVAILABLE)
    } else {
        format!("📦 {}:", subcategory.name)
    };

    Screen {
        text,
        keyboard: markup(rows),
        photo: None,
    }
}

/// A single product with its management actions. Customers never land
/// here; they browse through `product_page` instead.
pub fn product_detail(product: &Product) -> Screen {
    let text = format!("🛍 {}\n💵 {}", product.name, format_price(product.price));

    let rows = vec![
        vec![
            button(
                "➕ Add product",
                CallbackPayload::AddProduct(product.sub_category_id),
            ),
            button(
                "🗑 Delete product",
                CallbackPayload::DeleteProduct(product.sub_category_id),
            ),
        ],
        back_row(),
    ];

    Screen {
        text,
        keyboard: markup(rows),
        photo: product.photo.clone(),
    }
}

/// Pick-a-target screen for deleting a category.
pub fn category_delete_list(categories: &[Category]) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = categories
        .iter()
        .map(|c| {
            vec![button(
                format!("🗑 {}", c.name),
                CallbackPayload::DeleteCategoryTarget(c.id),
            )]
        })
        .collect();
    rows.push(back_row());

    Screen {
        text: PROMPT_DELETE_CATEGORY.to_string(),
        keyboard: markup(rows),
        photo: None,
    }
}

/// Pick-a-target screen for deleting a subcategory.
pub fn subcategory_delete_list(subcategories: &[SubCategory]) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = subcategories
        .iter()
        .map(|s| {
            vec![button(
                format!("🗑 {}", s.name),
                CallbackPayload::DeleteSubcategoryTarget(s.id),
            )]
        })
        .collect();
    rows.push(back_row());

    Screen {
        text: PROMPT_DELETE_SUBCATEGORY.to_string(),
        keyboard: markup(rows),
        photo: None,
    }
}

/// Pick-a-target screen for deleting a product.
pub fn product_delete_list(products: &[Product]) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = products
        .iter()
        .map(|p| {
            vec![button(
                format!("🗑 {} — {}", p.name, format_price(p.price)),
                CallbackPayload::DeleteProductTarget(p.id),
            )]
        })
        .collect();
    rows.push(back_row());

    Screen {
        text: PROMPT_DELETE_PRODUCT.to_string(),
        keyboard: markup(rows),
        photo: None,
    }
}

/// Yes/No gate before a category cascade delete.
pub fn confirm_delete_category(category: &Category) -> Screen {
    Screen {
        text: format!(
            "⚠️ Delete category \"{}\"?\nAll of its subcategories and products will be removed as well.",
            category.name
        ),
        keyboard: markup(vec![vec![
            button("✅ Yes, delete", CallbackPayload::ConfirmDeleteCategory),
            button("❌ Cancel", CallbackPayload::CancelDeleteCategory),
        ]]),
        photo: None,
    }
}

/// Yes/No gate before a subcategory cascade delete.
pub fn confirm_delete_subcategory(subcategory: &SubCategory) -> Screen {
    Screen {
        text: format!(
            "⚠️ Delete subcategory \"{}\"?\nAll of its products will be removed as well.",
            subcategory.name
        ),
        keyboard: markup(vec![vec![
            button("✅ Yes, delete", CallbackPayload::ConfirmDeleteSubcategory),
            button("❌ Cancel", CallbackPayload::CancelDeleteSubcategory),
        ]]),
        photo: None,
    }
}

/// Yes/No gate before a product delete.
pub fn confirm_delete_product(product: &Product) -> Screen {
    Screen {
        text: format!("⚠️ Delete product \"{}\"?", product.name),
        keyboard: markup(vec![vec![
            button("✅ Yes, delete", CallbackPayload::ConfirmDeleteProduct),
            button("❌ Cancel", CallbackPayload::CancelDeleteProduct),
        ]]),
        photo: None,
    }
}
