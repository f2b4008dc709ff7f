//! Durable local copy of the product collection.
//!
//! The whole collection lives in one named slot as a JSON array. Reads that
//! find nothing usable degrade to an empty collection and writes never fail
//! outward: problems are logged and the store carries on.

mod storage;

pub use storage::{SlotStorage, SqliteStorage};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::catalog::Product;

/// Slot name used when none is configured
pub const DEFAULT_SLOT: &str = "products";

/// Local mirror of the catalog collection, backed by a slot storage.
pub struct LocalMirror<S: SlotStorage> {
  storage: S,
  slot: String,
}

impl<S: SlotStorage> LocalMirror<S> {
  pub fn new(storage: S, slot: impl Into<String>) -> Self {
    Self {
      storage,
      slot: slot.into(),
    }
  }

  pub fn slot(&self) -> &str {
    &self.slot
  }

  /// Access the underlying storage.
  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Load the persisted collection, or an empty one if missing or malformed.
  pub fn load(&self) -> Vec<Product> {
    let data = match self.storage.read(&self.slot) {
      Ok(Some(data)) => data,
      Ok(None) => return Vec::new(),
      Err(e) => {
        warn!(slot = %self.slot, error = %e, "failed to read mirror, starting empty");
        return Vec::new();
      }
    };

    match serde_json::from_slice(&data) {
      Ok(products) => products,
      Err(e) => {
        warn!(slot = %self.slot, error = %e, "malformed mirror data, starting empty");
        Vec::new()
      }
    }
  }

  /// Overwrite the persisted collection.
  ///
  /// JSON has no NaN or infinity, so a collection holding such a price would
  /// not load back. The previous blob is kept instead.
  pub fn save(&self, products: &[Product]) {
    let unencodable: Vec<_> = products
      .iter()
      .filter(|p| !p.price.is_finite())
      .map(|p| p.id)
      .collect();
    if !unencodable.is_empty() {
      warn!(
        slot = %self.slot,
        ids = ?unencodable,
        "non-finite price, keeping previous mirror"
      );
      return;
    }

    let data = match serde_json::to_vec(products) {
      Ok(data) => data,
      Err(e) => {
        warn!(slot = %self.slot, error = %e, "failed to serialize mirror");
        return;
      }
    };

    if let Err(e) = self.storage.write(&self.slot, &data) {
      warn!(slot = %self.slot, error = %e, "failed to write mirror");
    }
  }

  /// When the collection was last saved, if ever.
  pub fn last_saved(&self) -> Option<DateTime<Utc>> {
    self.storage.saved_at(&self.slot).unwrap_or_else(|e| {
      warn!(slot = %self.slot, error = %e, "failed to read mirror timestamp");
      None
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn mirror() -> LocalMirror<SqliteStorage> {
    LocalMirror::new(SqliteStorage::open_in_memory().unwrap(), DEFAULT_SLOT)
  }

  fn product(id: i64, name: &str) -> Product {
    Product {
      id,
      name: name.to_string(),
      price: 1.25 * id as f64,
      quantity: id * 3,
      selected: id % 2 == 0,
    }
  }

  #[test]
  fn test_load_empty_when_missing() {
    assert!(mirror().load().is_empty());
    assert!(mirror().last_saved().is_none());
  }

  #[test]
  fn test_save_then_load_preserves_order_and_fields() {
    let mirror = mirror();
    let products = vec![product(9, "Stapler"), product(2, "Pen"), product(5, "Ink")];

    mirror.save(&products);

    assert_eq!(mirror.load(), products);
    assert!(mirror.last_saved().is_some());
  }

  #[test]
  fn test_save_overwrites_previous_collection() {
    let mirror = mirror();
    mirror.save(&[product(1, "Pen"), product(2, "Ink")]);
    mirror.save(&[product(3, "Tape")]);

    assert_eq!(mirror.load(), vec![product(3, "Tape")]);
  }

  #[test]
  fn test_non_finite_price_keeps_previous_blob() {
    let mirror = mirror();
    let saved = vec![product(1, "Pen")];
    mirror.save(&saved);

    for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
      let bad = Product {
        price,
        ..product(2, "Ink")
      };
      mirror.save(&[product(1, "Pen"), bad]);
      assert_eq!(mirror.load(), saved);
    }
  }

  #[test]
  fn test_malformed_data_loads_empty() {
    let mirror = mirror();
    mirror.storage().write(DEFAULT_SLOT, b"{not json").unwrap();
    assert!(mirror.load().is_empty());

    mirror.storage().write(DEFAULT_SLOT, br#"{"id":1}"#).unwrap();
    assert!(mirror.load().is_empty());
  }

  #[test]
  fn test_slots_are_independent() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.write("other", b"[]").unwrap();
    let mirror = LocalMirror::new(storage, "catalog");

    mirror.save(&[product(1, "Pen")]);

    assert_eq!(mirror.slot(), "catalog");
    assert_eq!(mirror.storage().read("other").unwrap().as_deref(), Some(&b"[]"[..]));
  }
}
