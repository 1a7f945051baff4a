use teloxide::types::{InlineKeyboardButtonKind, InlineKeyboardMarkup};

use storefront_bot::bot::ui_builder::{self, Screen};
use storefront_bot::db::{Category, Product, SubCategory};
use storefront_bot::session::BrowseCursor;

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

fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: 10,
            name: "Cola".to_string(),
            price: 1.5,
            photo: None,
            sub_category_id: 5,
        },
        Product {
            id: 11,
            name: "Fanta".to_string(),
            price: 1.5,
            photo: None,
            sub_category_id: 5,
        },
        Product {
            id: 12,
            name: "Spa".to_string(),
            price: 1.0,
            photo: None,
            sub_category_id: 5,
        },
    ]
}

/// A customer walks a 3-product subcategory from front to back: Next-only
/// at the first product, Prev-only at the last.
#[test]
fn test_pagination_walkthrough() {
    let products = sample_products();
    let mut cursor = BrowseCursor::new(5, vec![10, 11, 12]).expect("non-empty");

    let first = ui_builder::product_page(&products, &cursor);
    assert!(first.text.contains("1/3"));
    assert_eq!(rows(&first)[0], vec!["next_product"]);

    cursor.advance();
    cursor.advance();
    let last = ui_builder::product_page(&products, &cursor);
    assert!(last.text.contains("3/3"));
    assert_eq!(rows(&last)[0], vec!["prev_product"]);
    assert_eq!(rows(&last)[1], vec!["order_12"]);
}

/// Admin and customer get different category screens from the same data.
#[test]
fn test_role_sensitive_category_list() {
    let categories = vec![
        Category {
            id: 1,
            name: "Drinks".to_string(),
        },
        Category {
            id: 2,
            name: "Snacks".to_string(),
        },
    ];

    let customer = ui_builder::category_list(&categories, false);
    assert_eq!(
        rows(&customer),
        vec![vec!["cat_1".to_string()], vec!["cat_2".to_string()]]
    );

    let admin = ui_builder::category_list(&categories, true);
    let admin_rows = rows(&admin);
    assert_eq!(admin_rows.len(), 4);
    assert_eq!(admin_rows[2], vec!["add_category", "delete_category"]);
    assert_eq!(admin_rows[3], vec!["view_as_customer"]);
}

/// The empty subcategory screen leaves customers without buttons and
/// admins with the management row plus Back.
#[test]
fn test_empty_subcategory_list_by_role() {
    let category = Category {
        id: 1,
        name: "Drinks".to_string(),
    };

    let customer = ui_builder::subcategory_list(&category, &[], false);
    assert!(customer.keyboard.is_none());
    assert!(customer.text.contains(ui_builder::NOTHING_AVAILABLE));

    let admin = ui_builder::subcategory_list(&category, &[], true);
    let admin_rows = rows(&admin);
    assert_eq!(admin_rows[0], vec!["add_subcategory_1"]);
    assert_eq!(admin_rows[1], vec!["back_to_categories"]);
}

/// Deletable-target lists address rows with the del* verbs, and the
/// confirm screens pair the matching confirm/cancel verbs.
#[test]
fn test_delete_flow_screens() {
    let sub = SubCategory {
        id: 9,
        name: "Cold".to_string(),
        category_id: 1,
    };

    let pick = ui_builder::subcategory_delete_list(std::slice::from_ref(&sub));
    assert_eq!(rows(&pick)[0], vec!["delsub_9"]);

    let confirm = ui_builder::confirm_delete_subcategory(&sub);
    assert_eq!(
        rows(&confirm),
        vec![vec![
            "confirm_delete_subcategory".to_string(),
            "cancel_delete_subcategory".to_string()
        ]]
    );

    let product = &sample_products()[0];
    let confirm = ui_builder::confirm_delete_product(product);
    assert_eq!(
        rows(&confirm),
        vec![vec![
            "confirm_delete_product".to_string(),
            "cancel_delete_product".to_string()
        ]]
    );
    assert!(confirm.text.contains("Cola"));
}

/// Product detail carries the photo file id and the management actions.
#[test]
fn test_product_detail_actions() {
    let mut product = sample_products().remove(0);
    product.photo = Some("file123".to_string());

    let detail = ui_builder::product_detail(&product);
    assert_eq!(detail.photo.as_deref(), Some("file123"));
    assert_eq!(rows(&detail)[0], vec!["add_product_5", "delete_product_5"]);
    assert_eq!(rows(&detail)[1], vec!["back_to_categories"]);
}
