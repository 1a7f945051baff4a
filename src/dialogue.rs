//! Dialogue state machine types and input validation.

use serde::{Deserialize, Serialize};

pub const MAX_CATEGORY_NAME_LEN: usize = 50;
pub const MAX_SUBCATEGORY_NAME_LEN: usize = 100;
pub const MAX_PRODUCT_NAME_LEN: usize = 100;

/// What the bot currently expects from a given chat.
///
/// Scratch data collected across form steps (a pending product's name while
/// its price is awaited, the id picked for deletion while confirmation is
/// awaited) travels inside the variant and is dropped on any reset to
/// `Idle`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingCategoryName,
    AwaitingCategoryDeleteTarget,
    AwaitingCategoryDeleteConfirm {
        category_id: i64,
    },
    AwaitingSubcategoryName {
        category_id: i64,
    },
    AwaitingSubcategoryDeleteTarget {
        category_id: i64,
    },
    AwaitingSubcategoryDeleteConfirm {
        subcategory_id: i64,
        category_id: i64,
    },
    AwaitingProductName {
        subcategory_id: i64,
    },
    AwaitingProductPrice {
        subcategory_id: i64,
        name: String,
    },
    AwaitingProductPhoto {
        subcategory_id: i64,
        name: String,
        price: f64,
    },
    AwaitingProductDeleteTarget {
        subcategory_id: i64,
    },
    AwaitingProductDeleteConfirm {
        product_id: i64,
        subcategory_id: i64,
    },
}

impl DialogueState {
    /// Category id under confirmation, when the category confirm screen is
    /// the current one. Any other state means the press was stale.
    pub fn category_delete_confirm(&self) -> Option<i64> {
        match self {
            Self::AwaitingCategoryDeleteConfirm { category_id } => Some(*category_id),
            _ => None,
        }
    }

    /// `(subcategory_id, category_id)` under confirmation, when the
    /// subcategory confirm screen is the current one.
    pub fn subcategory_delete_confirm(&self) -> Option<(i64, i64)> {
        match self {
            Self::AwaitingSubcategoryDeleteConfirm {
                subcategory_id,
                category_id,
            } => Some((*subcategory_id, *category_id)),
            _ => None,
        }
    }

    /// `(product_id, subcategory_id)` under confirmation, when the product
    /// confirm screen is the current one.
    pub fn product_delete_confirm(&self) -> Option<(i64, i64)> {
        match self {
            Self::AwaitingProductDeleteConfirm {
                product_id,
                subcategory_id,
            } => Some((*product_id, *subcategory_id)),
            _ => None,
        }
    }

    /// Category scope of the subcategory pick-a-target screen, when it is
    /// the current one.
    pub fn subcategory_delete_target(&self) -> Option<i64> {
        match self {
            Self::AwaitingSubcategoryDeleteTarget { category_id } => Some(*category_id),
            _ => None,
        }
    }

    /// Subcategory scope of the product pick-a-target screen, when it is
    /// the current one.
    pub fn product_delete_target(&self) -> Option<i64> {
        match self {
            Self::AwaitingProductDeleteTarget { subcategory_id } => Some(*subcategory_id),
            _ => None,
        }
    }
}

/// Validates a category name input (1–50 characters after trimming).
pub fn validate_category_name(name: &str) -> Result<String, &'static str> {
    validate_name(name, MAX_CATEGORY_NAME_LEN)
}

/// Validates a subcategory name input (1–100 characters after trimming).
pub fn validate_subcategory_name(name: &str) -> Result<String, &'static str> {
    validate_name(name, MAX_SUBCATEGORY_NAME_LEN)
}

/// Validates a product name input (1–100 characters after trimming).
pub fn validate_product_name(name: &str) -> Result<String, &'static str> {
    validate_name(name, MAX_PRODUCT_NAME_LEN)
}

fn validate_name(name: &str, max_len: usize) -> Result<String, &'static str> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() > max_len {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}

/// Parses a price input into a positive amount.
///
/// A comma is accepted as the decimal separator ("9,99").
pub fn parse_price(input: &str) -> Result<f64, &'static str> {
    let normalized = input.trim().replace(',', ".");
    let price: f64 = normalized.parse().map_err(|_| "invalid")?;

    if !price.is_finite() {
        return Err("invalid");
    }
    if price <= 0.0 {
        return Err("not_positive");
    }

    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_name_validation() {
        // Valid names
        assert!(validate_category_name("Drinks").is_ok());
        assert!(validate_category_name("  Hot Drinks  ").is_ok());
        assert!(validate_category_name(&"a".repeat(50)).is_ok());

        // Invalid names
        assert!(validate_category_name("").is_err());
        assert!(validate_category_name("   ").is_err());
        assert_eq!(validate_category_name(&"a".repeat(51)), Err("too_long"));
    }

    #[test]
    fn test_name_trimming() {
        let result = validate_category_name("  Snacks  ");
        assert_eq!(result.unwrap(), "Snacks");
    }

    #[test]
    fn test_product_name_allows_longer_input() {
        assert!(validate_product_name(&"b".repeat(100)).is_ok());
        assert_eq!(validate_product_name(&"b".repeat(101)), Err("too_long"));
    }

    #[test]
    fn test_price_parsing() {
        assert_eq!(parse_price("9.99"), Ok(9.99));
        assert_eq!(parse_price("9,99"), Ok(9.99));
        assert_eq!(parse_price(" 5 "), Ok(5.0));

        assert_eq!(parse_price("abc"), Err("invalid"));
        assert_eq!(parse_price(""), Err("invalid"));
        assert_eq!(parse_price("inf"), Err("invalid"));
        assert_eq!(parse_price("0"), Err("not_positive"));
        assert_eq!(parse_price("-1.50"), Err("not_positive"));
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(DialogueState::default(), DialogueState::Idle);
    }

    #[test]
    fn test_confirm_accessors_match_only_their_state() {
        let state = DialogueState::AwaitingCategoryDeleteConfirm { category_id: 7 };
        assert_eq!(state.category_delete_confirm(), Some(7));
        assert_eq!(state.subcategory_delete_confirm(), None);
        assert_eq!(state.product_delete_confirm(), None);

        let state = DialogueState::AwaitingSubcategoryDeleteConfirm {
            subcategory_id: 9,
            category_id: 1,
        };
        assert_eq!(state.subcategory_delete_confirm(), Some((9, 1)));
        assert_eq!(state.category_delete_confirm(), None);

        let state = DialogueState::AwaitingProductDeleteConfirm {
            product_id: 12,
            subcategory_id: 5,
        };
        assert_eq!(state.product_delete_confirm(), Some((12, 5)));

        // No confirm screen is up in Idle; every accessor declines.
        assert_eq!(DialogueState::Idle.category_delete_confirm(), None);
        assert_eq!(DialogueState::Idle.subcategory_delete_confirm(), None);
        assert_eq!(DialogueState::Idle.product_delete_confirm(), None);
    }

    #[test]
    fn test_target_accessors_match_only_their_state() {
        let state = DialogueState::AwaitingSubcategoryDeleteTarget { category_id: 3 };
        assert_eq!(state.subcategory_delete_target(), Some(3));
        assert_eq!(state.product_delete_target(), None);

        let state = DialogueState::AwaitingProductDeleteTarget { subcategory_id: 5 };
        assert_eq!(state.product_delete_target(), Some(5));
        assert_eq!(state.subcategory_delete_target(), None);

        assert_eq!(DialogueState::Idle.subcategory_delete_target(), None);
        assert_eq!(DialogueState::Idle.product_delete_target(), None);
    }
}
