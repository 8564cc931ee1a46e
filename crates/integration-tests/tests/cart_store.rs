//! Integration tests for the cart store and its persistence contract.
//!
//! These exercise the store through the public API only, the way a client
//! would: open, mutate, reopen from the saved snapshot.

use maxfood_core::{
    CartError, CartItem, CartPersistence, CartStore, CheckoutOptions, MemoryPersistence,
    PersistenceError, PricingError, ProductId, ShippingMethod,
};
use rust_decimal::Decimal;
use maxfood_integration_tests::{dec, item};

// =============================================================================
// Merge and Quantity Rules
// =============================================================================

#[test]
fn test_adding_same_product_twice_merges() {
    let mut store = CartStore::open(MemoryPersistence::new());
    store.add_item(item("A", "2.00", 2)).unwrap();
    store.add_item(item("A", "2.00", 1)).unwrap();

    assert_eq!(store.items().len(), 1);
    assert_eq!(store.total_item_count(), 3);
    assert_eq!(store.total_price(), dec("6.00"));
}

#[test]
fn test_product_ids_stay_unique_after_mixed_operations() {
    let mut store = CartStore::open(MemoryPersistence::new());
    for (id, qty) in [("A", 1), ("B", 2), ("A", 3), ("C", 1), ("B", 1)] {
        store.add_item(item(id, "1.00", qty)).unwrap();
    }
    store.update_quantity(&ProductId::new("C"), 0);

    let ids: Vec<_> = store.items().iter().map(|i| i.product_id.as_str()).collect();
    assert_eq!(ids, ["A", "B"]);
    assert_eq!(store.total_item_count(), 7);
    assert!(store.cart().validate().is_ok());
}

#[test]
fn test_update_quantity_negative_removes() {
    let mut store = CartStore::open(MemoryPersistence::new());
    store.add_item(item("A", "5.00", 2)).unwrap();
    store.update_quantity(&ProductId::new("A"), -3);
    assert!(store.is_empty());
    assert_eq!(store.total_price(), dec("0"));
}

#[test]
fn test_operations_on_missing_product_are_noops() {
    let mut store = CartStore::open(MemoryPersistence::new());
    store.add_item(item("A", "5.00", 2)).unwrap();
    store.remove_item(&ProductId::new("missing"));
    store.update_quantity(&ProductId::new("missing"), 9);
    assert_eq!(store.total_item_count(), 2);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_reopen_restores_cart() {
    let storage = MemoryPersistence::new();
    {
        let mut store = CartStore::open(&storage);
        store.add_item(item("A", "2.00", 3)).unwrap();
        store.add_item(item("B", "0.50", 4)).unwrap();
    }

    let store = CartStore::open(&storage);
    assert_eq!(store.total_item_count(), 7);
    assert_eq!(store.total_price(), dec("8.00"));
}

#[test]
fn test_clear_persists_empty_cart() {
    let storage = MemoryPersistence::new();
    let mut store = CartStore::open(&storage);
    store.add_item(item("A", "2.00", 3)).unwrap();
    store.clear();

    assert!(CartStore::open(&storage).is_empty());
}

#[test]
fn test_corrupt_snapshot_opens_empty() {
    let storage = MemoryPersistence::with_snapshot("{not json");
    let store = CartStore::open(&storage);
    assert!(store.is_empty());
}

/// Storage that can be read but rejects every write.
struct ReadOnlyStorage;

impl CartPersistence for ReadOnlyStorage {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(None)
    }

    fn save(&self, _snapshot: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("read-only".to_string()))
    }
}

#[test]
fn test_failed_save_keeps_in_memory_state() {
    let mut store = CartStore::open(ReadOnlyStorage);
    store.add_item(item("A", "2.00", 1)).unwrap();
    assert_eq!(store.total_item_count(), 1);
}

// =============================================================================
// Totals
// =============================================================================

#[test]
fn test_totals_add_tax_and_shipping() {
    let mut store = CartStore::open(MemoryPersistence::new());
    store.add_item(item("A", "2.00", 3)).unwrap();

    let options = CheckoutOptions {
        shipping: Some((ShippingMethod::Standard, Some(dec("3")))),
        coupon: None,
    };
    let totals = store.totals(&options).unwrap();
    assert_eq!(totals.subtotal, dec("6.00"));
    assert_eq!(totals.tax, dec("0.60"));
    assert_eq!(totals.shipping, dec("7"));
    assert_eq!(totals.total, dec("13.60"));
}

#[test]
fn test_amounts_past_decimal_range_are_rejected() {
    let mut store = CartStore::open(MemoryPersistence::new());
    assert_eq!(
        store.add_item(CartItem::new("A", "A", Decimal::MAX, 2)),
        Err(CartError::AmountOverflow)
    );

    store.add_item(CartItem::new("A", "A", Decimal::MAX, 1)).unwrap();
    store.update_quantity(&ProductId::new("A"), 5);
    assert_eq!(store.total_item_count(), 1);
    assert_eq!(store.total_price(), Decimal::MAX);
    assert_eq!(store.totals(&CheckoutOptions::default()), Err(PricingError::AmountOverflow));
}
