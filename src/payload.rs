//! Typed callback payload codec.
//!
//! Inline-keyboard buttons carry short ASCII strings (`cat_3`,
//! `confirm_delete_product`, ...). All encoding and decoding goes through
//! one schema: malformed or unknown data decodes to `None` and the caller
//! treats the press as referring to something that no longer exists. Every
//! encoding stays well under Telegram's 64-byte callback-data limit.

/// One decoded button press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackPayload {
    /// `cat_<id>` — open the subcategory list of a category.
    Category(i64),
    /// `sub_<id>` — open the product listing of a subcategory.
    Subcategory(i64),
    /// `product_<id>` — open one product (admin detail view).
    Product(i64),
    /// `order_<id>` — customer orders a product.
    Order(i64),
    AddCategory,
    DeleteCategory,
    /// `delcat_<id>` — pick which category to delete.
    DeleteCategoryTarget(i64),
    ConfirmDeleteCategory,
    CancelDeleteCategory,
    /// `add_subcategory_<category_id>`
    AddSubcategory(i64),
    /// `delete_subcategory_<category_id>`
    DeleteSubcategory(i64),
    /// `delsub_<id>` — pick which subcategory to delete.
    DeleteSubcategoryTarget(i64),
    ConfirmDeleteSubcategory,
    CancelDeleteSubcategory,
    /// `add_product_<subcategory_id>`
    AddProduct(i64),
    /// `delete_product_<subcategory_id>`
    DeleteProduct(i64),
    /// `delprod_<id>` — pick which product to delete.
    DeleteProductTarget(i64),
    ConfirmDeleteProduct,
    CancelDeleteProduct,
    PrevProduct,
    NextProduct,
    BackToCategories,
    /// `view_as_customer` — admin previews the customer-facing screens.
    ViewAsCustomer,
}

impl CallbackPayload {
    /// Encode into the wire string placed on a button.
    pub fn encode(&self) -> String {
        match self {
            CallbackPayload::Category(id) => format!("cat_{id}"),
            CallbackPayload::Subcategory(id) => format!("sub_{id}"),
            CallbackPayload::Product(id) => format!("product_{id}"),
            CallbackPayload::Order(id) => format!("order_{id}"),
            CallbackPayload::AddCategory => "add_category".to_string(),
            CallbackPayload::DeleteCategory => "delete_category".to_string(),
            CallbackPayload::DeleteCategoryTarget(id) => format!("delcat_{id}"),
            CallbackPayload::ConfirmDeleteCategory => "confirm_delete_category".to_string(),
            CallbackPayload::CancelDeleteCategory => "cancel_delete_category".to_string(),
            CallbackPayload::AddSubcategory(id) => format!("add_subcategory_{id}"),
            CallbackPayload::DeleteSubcategory(id) => format!("delete_subcategory_{id}"),
            CallbackPayload::DeleteSubcategoryTarget(id) => format!("delsub_{id}"),
            CallbackPayload::ConfirmDeleteSubcategory => "confirm_delete_subcategory".to_string(),
            CallbackPayload::CancelDeleteSubcategory => "cancel_delete_subcategory".to_string(),
            CallbackPayload::AddProduct(id) => format!("add_product_{id}"),
            CallbackPayload::DeleteProduct(id) => format!("delete_product_{id}"),
            CallbackPayload::DeleteProductTarget(id) => format!("delprod_{id}"),
            CallbackPayload::ConfirmDeleteProduct => "confirm_delete_product".to_string(),
            CallbackPayload::CancelDeleteProduct => "cancel_delete_product".to_string(),
            CallbackPayload::PrevProduct => "prev_product".to_string(),
            CallbackPayload::NextProduct => "next_product".to_string(),
            CallbackPayload::BackToCategories => "back_to_categories".to_string(),
            CallbackPayload::ViewAsCustomer => "view_as_customer".to_string(),
        }
    }

    /// Decode a raw callback-data string. Unknown verbs, missing ids and
    /// non-numeric ids all yield `None`.
    pub fn decode(data: &str) -> Option<Self> {
        // Fixed verbs first; everything else carries a trailing id.
        match data {
            "add_category" => return Some(Self::AddCategory),
            "delete_category" => return Some(Self::DeleteCategory),
            "confirm_delete_category" => return Some(Self::ConfirmDeleteCategory),
            "cancel_delete_category" => return Some(Self::CancelDeleteCategory),
            "confirm_delete_subcategory" => return Some(Self::ConfirmDeleteSubcategory),
            "cancel_delete_subcategory" => return Some(Self::CancelDeleteSubcategory),
            "confirm_delete_product" => return Some(Self::ConfirmDeleteProduct),
            "cancel_delete_product" => return Some(Self::CancelDeleteProduct),
            "prev_product" => return Some(Self::PrevProduct),
            "next_product" => return Some(Self::NextProduct),
            "back_to_categories" => return Some(Self::BackToCategories),
            "view_as_customer" => return Some(Self::ViewAsCustomer),
            _ => {}
        }

        let (verb, id) = data.rsplit_once('_')?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let id: i64 = id.parse().ok()?;

        match verb {
            "cat" => Some(Self::Category(id)),
            "sub" => Some(Self::Subcategory(id)),
            "product" => Some(Self::Product(id)),
            "order" => Some(Self::Order(id)),
            "delcat" => Some(Self::DeleteCategoryTarget(id)),
            "delsub" => Some(Self::DeleteSubcategoryTarget(id)),
            "delprod" => Some(Self::DeleteProductTarget(id)),
            "add_subcategory" => Some(Self::AddSubcategory(id)),
            "delete_subcategory" => Some(Self::DeleteSubcategory(id)),
            "add_product" => Some(Self::AddProduct(id)),
            "delete_product" => Some(Self::DeleteProduct(id)),
            _ => None,
        }
    }
}
