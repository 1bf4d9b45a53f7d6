//! Integration tests for the persistent cart/favorites store.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use pocketshop_client::store::{SCHEMA_VERSION, STORAGE_KEY};
use pocketshop_client::{
    CartStore, FileStore, ItemId, KeyValueStore, MemoryStore, PersistedSnapshot, SortMode,
};
use pocketshop_integration_tests::{FailingStore, item};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn memory_store() -> (CartStore, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    (CartStore::new(storage.clone()), storage)
}

fn assert_invariants(store: &CartStore) {
    let lines = store.cart_lines();
    let ids: HashSet<ItemId> = lines.iter().map(|l| l.item.id).collect();
    assert_eq!(ids.len(), lines.len(), "duplicate cart lines");
    assert!(lines.iter().all(|l| l.quantity >= 1), "zero quantity line");

    let expected: Decimal = lines
        .iter()
        .map(|l| l.item.price * Decimal::from(l.quantity))
        .sum();
    assert_eq!(store.cart_total(), expected);
    assert_eq!(
        store.cart_item_count(),
        lines.iter().map(|l| l.quantity).sum::<u32>()
    );
}

// =============================================================================
// Invariants
// =============================================================================

#[derive(Debug, Clone)]
enum CartOp {
    Add(i32, u32),
    Set(i32, i64),
    Remove(i32),
}

fn cart_op() -> impl Strategy<Value = CartOp> {
    prop_oneof![
        (1i32..=6, 0u32..5).prop_map(|(id, qty)| CartOp::Add(id, qty)),
        (1i32..=6, -2i64..5).prop_map(|(id, qty)| CartOp::Set(id, qty)),
        (1i32..=6).prop_map(CartOp::Remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_mutation_sequences_preserve_invariants(
        ops in prop::collection::vec(cart_op(), 1..200)
    ) {
        let (store, _) = memory_store();
        let mut expected: BTreeMap<i32, u32> = BTreeMap::new();

        for op in ops {
            match op {
                CartOp::Add(id, qty) => {
                    store.add_to_cart(&item(id, "electronics", i64::from(id) * 100), qty);
                    if qty > 0 {
                        *expected.entry(id).or_default() += qty;
                    }
                }
                CartOp::Set(id, qty) => {
                    store.set_quantity(ItemId::new(id), qty);
                    if let Some(current) = expected.get_mut(&id) {
                        match u32::try_from(qty) {
                            Ok(qty) if qty > 0 => *current = qty,
                            _ => {
                                expected.remove(&id);
                            }
                        }
                    }
                }
                CartOp::Remove(id) => {
                    store.remove_from_cart(ItemId::new(id));
                    expected.remove(&id);
                }
            }

            assert_invariants(&store);
            for (&id, &qty) in &expected {
                prop_assert_eq!(store.quantity_in_cart(ItemId::new(id)), qty);
            }
            prop_assert_eq!(store.line_count(), expected.len());
        }
    }

    #[test]
    fn test_snapshot_round_trip_restores_identical_lines(
        cart in prop::collection::btree_map(1i32..50, (1u32..20, 1i64..100_000), 0..10),
        favorites in prop::collection::btree_set(1i32..50, 0..10),
    ) {
        let (store, _) = memory_store();
        for (&id, &(qty, cents)) in &cart {
            store.add_to_cart(&item(id, "jewelery", cents), qty);
        }
        for &id in &favorites {
            store.add_to_favorites(&item(id, "electronics", 999));
        }

        let bytes = store.snapshot().encode().unwrap();
        let restored = PersistedSnapshot::decode(&bytes).unwrap().into_state();

        prop_assert_eq!(restored.cart_lines().cloned().collect::<Vec<_>>(), store.cart_lines());
        prop_assert_eq!(restored.favorites().cloned().collect::<Vec<_>>(), store.favorites());
        prop_assert_eq!(restored.cart_total(), store.cart_total());
    }
}

#[test]
fn test_add_merges_and_set_replaces() {
    let (store, _) = memory_store();
    let shirt = item(1, "men's clothing", 2299);

    store.add_to_cart(&shirt, 1);
    store.add_to_cart(&shirt, 2);
    assert_eq!(store.quantity_in_cart(shirt.id), 3);
    assert_eq!(store.line_count(), 1);

    store.set_quantity(shirt.id, 5);
    assert_eq!(store.quantity_in_cart(shirt.id), 5);
    assert_eq!(store.cart_total(), Decimal::new(11495, 2));

    store.set_quantity(shirt.id, 0);
    assert_eq!(store.quantity_in_cart(shirt.id), 0);
    assert_eq!(store.line_count(), 0);
    assert_eq!(store.cart_total(), Decimal::ZERO);
}

#[test]
fn test_item_count_differs_from_line_count() {
    let (store, _) = memory_store();
    store.add_to_cart(&item(1, "jewelery", 100), 4);
    store.add_to_cart(&item(2, "jewelery", 100), 1);
    assert_eq!(store.cart_item_count(), 5);
    assert_eq!(store.line_count(), 2);
}

#[test]
fn test_favorites_are_idempotent() {
    let (store, _) = memory_store();
    let ring = item(5, "jewelery", 69500);

    store.add_to_favorites(&ring);
    store.add_to_favorites(&ring);
    assert_eq!(store.favorites().len(), 1);
    assert!(store.is_favorite(ring.id));

    assert!(!store.remove_from_favorites(ItemId::new(77)));
    assert_eq!(store.favorites().len(), 1);

    store.remove_from_favorites(ring.id);
    assert!(!store.is_favorite(ring.id));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_file_backed_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()).unwrap());

    let store = CartStore::restore(storage.clone());
    store.add_to_cart(&item(3, "electronics", 10999), 2);
    store.add_to_cart(&item(1, "electronics", 6400), 1);
    store.add_to_cart(&item(2, "jewelery", 999), 3);
    store.add_to_favorites(&item(8, "jewelery", 1099));
    store.add_to_favorites(&item(3, "electronics", 10999));
    store.set_search_text("ssd");
    let lines = store.cart_lines();
    let favorites = store.favorites();
    drop(store);

    let restored = CartStore::restore(Arc::new(FileStore::new(dir.path()).unwrap()));
    assert_eq!(restored.cart_lines(), lines);
    assert_eq!(restored.favorites(), favorites);
    assert_eq!(restored.browse().search_text, "");
    assert_eq!(restored.cart_total(), Decimal::new(31395, 2));
}

#[test]
fn test_persisted_document_has_only_durable_fields() {
    let (store, storage) = memory_store();
    store.add_to_cart(&item(1, "electronics", 500), 1);
    store.set_sort_mode(SortMode::PriceAsc);
    store.set_search_text("usb");
    store.add_to_favorites(&item(2, "electronics", 500));

    let bytes = storage.read(STORAGE_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["cartLines", "favoriteEntries", "schemaVersion"]);
    assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
}

#[test]
fn test_browse_changes_do_not_write() {
    let storage = Arc::new(FailingStore::new());
    let store = CartStore::new(storage.clone());

    store.set_search_text("jacket");
    store.set_sort_mode(SortMode::Rating);
    assert_eq!(storage.write_attempts(), 0);

    store.add_to_cart(&item(1, "women's clothing", 799), 1);
    assert_eq!(storage.write_attempts(), 1);
}

#[test]
fn test_corrupt_snapshot_restores_empty() {
    let storage = Arc::new(MemoryStore::new());
    storage.write(STORAGE_KEY, b"{\"cartLines\": [").unwrap();

    let store = CartStore::restore(storage.clone());
    assert_eq!(store.line_count(), 0);
    assert!(store.favorites().is_empty());

    // The next mutation overwrites the corrupt document.
    store.add_to_cart(&item(1, "jewelery", 100), 1);
    let bytes = storage.read(STORAGE_KEY).unwrap().unwrap();
    assert_eq!(PersistedSnapshot::decode(&bytes).unwrap().cart_lines.len(), 1);
}

#[test]
fn test_mismatched_schema_restores_empty() {
    let storage = Arc::new(MemoryStore::new());
    let document = serde_json::json!({
        "cartLines": [{ "item": item(1, "jewelery", 100), "quantity": 2 }],
        "favoriteEntries": [],
        "schemaVersion": SCHEMA_VERSION + 1,
    });
    storage
        .write(STORAGE_KEY, &serde_json::to_vec(&document).unwrap())
        .unwrap();

    let store = CartStore::restore(storage);
    assert_eq!(store.line_count(), 0);
}

#[test]
fn test_unreadable_storage_restores_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()).unwrap());
    // A directory where the snapshot file should be makes the read fail.
    std::fs::create_dir(dir.path().join(format!("{STORAGE_KEY}.json"))).unwrap();

    let store = CartStore::restore(storage);
    assert_eq!(store.line_count(), 0);
}

#[test]
fn test_failed_write_keeps_mutation_and_next_write_catches_up() {
    let storage = Arc::new(FailingStore::new());
    let store = CartStore::new(storage.clone());

    storage.set_failing(true);
    store.add_to_cart(&item(1, "electronics", 1000), 2);
    assert_eq!(store.quantity_in_cart(ItemId::new(1)), 2);
    assert!(storage.read(STORAGE_KEY).unwrap().is_none());

    storage.set_failing(false);
    store.add_to_favorites(&item(2, "electronics", 500));

    let restored = CartStore::restore(storage);
    assert_eq!(restored.quantity_in_cart(ItemId::new(1)), 2);
    assert!(restored.is_favorite(ItemId::new(2)));
}

// =============================================================================
// Observation
// =============================================================================

#[tokio::test]
async fn test_badge_selector_ignores_unrelated_changes() {
    let (store, _) = memory_store();
    let mut badge = store.select(|state| state.cart_item_count());

    store.add_to_favorites(&item(9, "jewelery", 100));
    store.set_search_text("gold");
    store.add_to_cart(&item(1, "jewelery", 100), 3);

    assert_eq!(badge.changed().await, Some(3));
    assert_eq!(badge.current(), 3);

    store.increment(ItemId::new(1));
    assert_eq!(badge.changed().await, Some(4));
}

#[tokio::test]
async fn test_subscribers_never_see_partial_lines() {
    let (store, _) = memory_store();
    let mut rx = store.subscribe();
    let shirt = item(1, "men's clothing", 1500);

    store.add_to_cart(&shirt, 2);
    rx.changed().await.unwrap();
    {
        let state = rx.borrow_and_update();
        assert_eq!(state.quantity_in_cart(shirt.id), 2);
        assert_eq!(state.cart_total(), Decimal::new(3000, 2));
    }

    store.set_quantity(shirt.id, -1);
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().line_count(), 0);
}
