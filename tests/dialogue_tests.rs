use anyhow::Result;

use storefront_bot::dialogue::{
    parse_price, validate_category_name, validate_product_name, validate_subcategory_name,
    DialogueState,
};

/// Name validation across the three entity kinds
#[tokio::test]
async fn test_name_validation_limits() -> Result<()> {
    // Category names cap at 50 characters
    assert!(validate_category_name(&"a".repeat(50)).is_ok());
    assert!(validate_category_name(&"a".repeat(51)).is_err());

    // Subcategory and product names cap at 100
    assert!(validate_subcategory_name(&"a".repeat(100)).is_ok());
    assert!(validate_subcategory_name(&"a".repeat(101)).is_err());
    assert!(validate_product_name(&"a".repeat(100)).is_ok());
    assert!(validate_product_name(&"a".repeat(101)).is_err());

    // Whitespace-only input is empty everywhere
    assert!(validate_category_name("   ").is_err());
    assert!(validate_subcategory_name("").is_err());
    assert!(validate_product_name("\n\t").is_err());

    Ok(())
}

/// Price validation scenario: bad input keeps the form alive, good input
/// advances it
#[test]
fn test_price_validation_sequence() {
    assert!(parse_price("abc").is_err());
    assert_eq!(parse_price("9.99"), Ok(9.99));
}

/// Dialogue states carry their scratch data through serialization
#[tokio::test]
async fn test_dialogue_state_serialization() -> Result<()> {
    let state = DialogueState::AwaitingProductPhoto {
        subcategory_id: 5,
        name: "Cola".to_string(),
        price: 1.5,
    };

    let json = serde_json::to_string(&state)?;
    let restored: DialogueState = serde_json::from_str(&json)?;
    assert_eq!(restored, state);

    match restored {
        DialogueState::AwaitingProductPhoto {
            subcategory_id,
            name,
            price,
        } => {
            assert_eq!(subcategory_id, 5);
            assert_eq!(name, "Cola");
            assert_eq!(price, 1.5);
        }
        _ => panic!("Unexpected dialogue state"),
    }

    Ok(())
}

/// The default state is Idle, where only navigation is accepted
#[test]
fn test_default_state() {
    assert!(matches!(DialogueState::default(), DialogueState::Idle));
}

/// A confirm button pressed outside its confirmation screen must read as
/// stale: the accessors that gate the delete flows decline every other
/// state.
#[test]
fn test_confirm_guards_reject_foreign_states() {
    let foreign = [
        DialogueState::Idle,
        DialogueState::AwaitingCategoryName,
        DialogueState::AwaitingCategoryDeleteTarget,
        DialogueState::AwaitingSubcategoryDeleteConfirm {
            subcategory_id: 9,
            category_id: 1,
        },
        DialogueState::AwaitingProductDeleteTarget { subcategory_id: 5 },
    ];
    for state in &foreign {
        assert_eq!(state.category_delete_confirm(), None, "{state:?}");
        assert_eq!(state.product_delete_confirm(), None, "{state:?}");
    }

    // Only the matching screen yields its scratch ids.
    let state = DialogueState::AwaitingCategoryDeleteConfirm { category_id: 7 };
    assert_eq!(state.category_delete_confirm(), Some(7));
}

/// A pick-a-target button from a stale screen likewise fails its guard.
#[test]
fn test_target_guards_reject_foreign_states() {
    assert_eq!(DialogueState::Idle.subcategory_delete_target(), None);
    assert_eq!(
        DialogueState::AwaitingCategoryDeleteTarget.product_delete_target(),
        None
    );

    let state = DialogueState::AwaitingProductDeleteTarget { subcategory_id: 5 };
    assert_eq!(state.product_delete_target(), Some(5));
}
