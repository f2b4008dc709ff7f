//! Catalog store: remote first, local collection and mirror on failure.
//!
//! Every operation makes exactly one remote call. When it succeeds the
//! server's answer is applied to the owned collection; when it fails the
//! store derives the answer locally instead. Mutations are persisted to the
//! local mirror in full either way. Only [`CatalogStore::get`] can fail, and
//! only when neither side knows the product.
//!
//! The store does not serialize operations. The collection lock is held for
//! the local step only, never across the remote call, so concurrent callers
//! interleave freely. A product minted offline can later share its id with
//! one the server assigns; nothing reconciles the two.

mod outcome;

pub use outcome::{Outcome, Source};

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{CatalogRemote, Product, ProductDraft, ProductId};
use crate::mirror::{LocalMirror, SlotStorage};

/// Errors surfaced by the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
  #[error("product {0} not found")]
  NotFound(ProductId),
}

pub struct CatalogStore<R: CatalogRemote, S: SlotStorage> {
  remote: R,
  mirror: LocalMirror<S>,
  products: Mutex<Vec<Product>>,
}

impl<R: CatalogRemote, S: SlotStorage> CatalogStore<R, S> {
  /// Create a store, seeding the collection from the mirror.
  pub fn new(remote: R, mirror: LocalMirror<S>) -> Self {
    let products = mirror.load();
    debug!(count = products.len(), "loaded collection from mirror");

    Self {
      remote,
      mirror,
      products: Mutex::new(products),
    }
  }

  pub fn mirror(&self) -> &LocalMirror<S> {
    &self.mirror
  }

  /// Snapshot of the owned collection.
  pub fn products(&self) -> Vec<Product> {
    self.collection().clone()
  }

  /// Id the next offline-created product would get.
  pub fn next_id(&self) -> ProductId {
    next_id(&self.collection())
  }

  fn collection(&self) -> MutexGuard<'_, Vec<Product>> {
    self.products.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Fetch the full collection, replacing the local one on success.
  pub async fn list(&self) -> Outcome<Vec<Product>> {
    match self.remote.list().await {
      Ok(products) => {
        let mut collection = self.collection();
        *collection = products.clone();
        self.mirror.save(&collection);
        Outcome::remote(products)
      }
      Err(e) => {
        warn!(error = %e, "list failed, serving local collection");
        Outcome::fallback(self.products())
      }
    }
  }

  /// Fetch one product. The remote answer wins over the local record.
  pub async fn get(&self, id: ProductId) -> Result<Outcome<Product>, StoreError> {
    match self.remote.get(id).await {
      Ok(product) => Ok(Outcome::remote(product)),
      Err(e) => {
        warn!(id, error = %e, "get failed, looking up local collection");
        self
          .collection()
          .iter()
          .find(|p| p.id == id)
          .cloned()
          .map(Outcome::fallback)
          .ok_or(StoreError::NotFound(id))
      }
    }
  }

  /// Create a product. Offline, the id is minted locally.
  pub async fn create(&self, draft: ProductDraft) -> Outcome<Product> {
    match self.remote.create(&draft).await {
      Ok(product) => {
        let mut collection = self.collection();
        collection.push(product.clone());
        self.mirror.save(&collection);
        Outcome::remote(product)
      }
      Err(e) => {
        warn!(error = %e, "create failed, adding product locally");
        let mut collection = self.collection();
        let product = draft.with_id(next_id(&collection));
        collection.push(product.clone());
        self.mirror.save(&collection);
        Outcome::fallback(product)
      }
    }
  }

  /// Update a product in place. Ids unknown locally are left alone.
  pub async fn update(&self, product: Product) -> Outcome<Product> {
    let id = product.id;

    match self.remote.update(&product).await {
      Ok(updated) => {
        if !self.replace(id, &updated) {
          debug!(id, "updated product not in local collection, mirror unchanged");
        }
        Outcome::remote(updated)
      }
      Err(e) => {
        warn!(id, error = %e, "update failed, applying locally");
        self.replace(id, &product);
        Outcome::fallback(product)
      }
    }
  }

  /// Delete a product. The local removal happens whatever the remote says.
  pub async fn delete(&self, id: ProductId) -> Outcome<()> {
    let source = match self.remote.delete(id).await {
      Ok(()) => Source::Remote,
      Err(e) => {
        warn!(id, error = %e, "delete failed, removing locally");
        Source::Fallback
      }
    };

    let mut collection = self.collection();
    collection.retain(|p| p.id != id);
    self.mirror.save(&collection);

    Outcome { value: (), source }
  }

  /// Replace the entry with `id` and persist. Returns false if absent.
  fn replace(&self, id: ProductId, product: &Product) -> bool {
    let mut collection = self.collection();
    match collection.iter_mut().find(|p| p.id == id) {
      Some(entry) => {
        *entry = product.clone();
        self.mirror.save(&collection);
        true
      }
      None => false,
    }
  }
}

fn next_id(products: &[Product]) -> ProductId {
  match products.iter().map(|p| p.id).max() {
    None => 1,
    Some(max) => max
      .checked_add(1)
      .unwrap_or_else(|| smallest_unused_id(products)),
  }
}

/// Lowest positive id not taken. Used once the maximum id is exhausted.
fn smallest_unused_id(products: &[Product]) -> ProductId {
  let used: HashSet<ProductId> = products.iter().map(|p| p.id).collect();
  let mut candidate = 1;
  // Fewer products than positive ids, so this terminates.
  while used.contains(&candidate) {
    candidate += 1;
  }
  candidate
}
