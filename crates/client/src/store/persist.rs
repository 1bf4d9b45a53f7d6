//! Durable snapshot of the cart and favorites.
//!
//! Only cart lines and favorites are part of the persisted shape. Browse
//! state lives next to them in memory but has no field here, so it can
//! never be written.

use indexmap::IndexMap;
use pocketshop_core::{CartLine, Item};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::state::StoreState;

/// Key the snapshot is stored under.
pub const STORAGE_KEY: &str = "pocketshop.cart";

/// Current snapshot layout version.
pub const SCHEMA_VERSION: u32 = 1;

/// Reasons a stored snapshot is rejected at startup.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("Snapshot is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Snapshot has no schema version")]
    MissingVersion,
    #[error("Unsupported schema version {found} (expected {SCHEMA_VERSION})")]
    VersionMismatch { found: u64 },
}

/// The JSON document written to durable storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub cart_lines: Vec<CartLine>,
    pub favorite_entries: Vec<Item>,
    pub schema_version: u32,
}

impl PersistedSnapshot {
    /// Capture the durable part of `state`.
    #[must_use]
    pub fn from_state(state: &StoreState) -> Self {
        Self {
            cart_lines: state.cart_lines().cloned().collect(),
            favorite_entries: state.favorites().cloned().collect(),
            schema_version: SCHEMA_VERSION,
        }
    }

    /// Serialize to the stored byte form.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse stored bytes, checking the schema version before the body.
    ///
    /// # Errors
    ///
    /// Returns `RestoreError` for malformed JSON or a version other than
    /// [`SCHEMA_VERSION`].
    pub fn decode(bytes: &[u8]) -> Result<Self, RestoreError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let found = value
            .get("schemaVersion")
            .and_then(serde_json::Value::as_u64)
            .ok_or(RestoreError::MissingVersion)?;
        if found != u64::from(SCHEMA_VERSION) {
            return Err(RestoreError::VersionMismatch { found });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Rebuild in-memory state, enforcing the cart and favorites invariants.
    ///
    /// Lines with quantity 0 are dropped. For repeated ids the first entry
    /// wins.
    #[must_use]
    pub fn into_state(self) -> StoreState {
        let mut cart = IndexMap::with_capacity(self.cart_lines.len());
        for line in self.cart_lines {
            let id = line.item_id();
            if line.quantity == 0 {
                warn!(item_id = %id, "Dropping persisted cart line with zero quantity");
                continue;
            }
            if cart.contains_key(&id) {
                warn!(item_id = %id, "Dropping duplicate persisted cart line");
                continue;
            }
            cart.insert(id, line);
        }

        let mut favorites = IndexMap::with_capacity(self.favorite_entries.len());
        for item in self.favorite_entries {
            favorites.entry(item.id).or_insert(item);
        }

        StoreState::from_parts(cart, favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketshop_core::{ItemId, Rating};
    use rust_decimal::Decimal;

    fn item(id: i32) -> Item {
        Item {
            id: ItemId::new(id),
            title: format!("Item {id}"),
            price: Decimal::new(1099, 2),
            description: "desc".to_string(),
            category: "electronics".to_string(),
            image: format!("https://img.example/{id}.jpg"),
            rating: Rating { rate: 4.5, count: 12 },
        }
    }

    #[test]
    fn test_encoded_shape_uses_camel_case_keys() {
        let snapshot = PersistedSnapshot {
            cart_lines: vec![CartLine::new(item(1), 2)],
            favorite_entries: vec![item(2)],
            schema_version: SCHEMA_VERSION,
        };
        let value: serde_json::Value =
            serde_json::from_slice(&snapshot.encode().unwrap()).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(value["schemaVersion"], 1);
        assert_eq!(value["cartLines"][0]["quantity"], 2);
        assert_eq!(value["cartLines"][0]["item"]["id"], 1);
        assert_eq!(value["favoriteEntries"][0]["title"], "Item 2");
    }

    #[test]
    fn test_decode_rejects_other_versions() {
        let bytes = br#"{"cartLines":[],"favoriteEntries":[],"schemaVersion":2}"#;
        assert!(matches!(
            PersistedSnapshot::decode(bytes),
            Err(RestoreError::VersionMismatch { found: 2 })
        ));
    }

    #[test]
    fn test_decode_rejects_missing_version() {
        let bytes = br#"{"cartLines":[],"favoriteEntries":[]}"#;
        assert!(matches!(
            PersistedSnapshot::decode(bytes),
            Err(RestoreError::MissingVersion)
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            PersistedSnapshot::decode(b"not json"),
            Err(RestoreError::Corrupt(_))
        ));
        let wrong_body = br#"{"cartLines":"nope","favoriteEntries":[],"schemaVersion":1}"#;
        assert!(matches!(
            PersistedSnapshot::decode(wrong_body),
            Err(RestoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_into_state_repairs_invariants() {
        let snapshot = PersistedSnapshot {
            cart_lines: vec![
                CartLine::new(item(1), 3),
                CartLine::new(item(2), 0),
                CartLine::new(item(1), 9),
            ],
            favorite_entries: vec![item(4), item(4), item(5)],
            schema_version: SCHEMA_VERSION,
        };
        let state = snapshot.into_state();

        assert_eq!(state.line_count(), 1);
        assert_eq!(state.quantity_in_cart(ItemId::new(1)), 3);
        assert_eq!(state.quantity_in_cart(ItemId::new(2)), 0);
        assert_eq!(state.favorite_count(), 2);
    }
}
