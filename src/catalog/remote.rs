//! Seam between the catalog store and the inventory service.

use std::future::Future;

use thiserror::Error;

use super::types::{Product, ProductDraft, ProductId};

/// Any failure of a remote call. The store never lets these escape.
#[derive(Debug, Error)]
pub enum RemoteError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {url} returned {status}")]
  Status {
    method: &'static str,
    url: String,
    status: reqwest::StatusCode,
  },

  #[error("invalid service URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("remote disabled (offline mode)")]
  Offline,
}

/// Operations offered by the `/products` resource collection.
pub trait CatalogRemote: Send + Sync {
  /// `GET /products`
  fn list(&self) -> impl Future<Output = Result<Vec<Product>, RemoteError>> + Send;

  /// `GET /products/{id}`
  fn get(&self, id: ProductId) -> impl Future<Output = Result<Product, RemoteError>> + Send;

  /// `POST /products`; the server assigns the id.
  fn create(
    &self,
    draft: &ProductDraft,
  ) -> impl Future<Output = Result<Product, RemoteError>> + Send;

  /// `PUT /products/{id}` with the full record.
  fn update(&self, product: &Product)
    -> impl Future<Output = Result<Product, RemoteError>> + Send;

  /// `DELETE /products/{id}`
  fn delete(&self, id: ProductId) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// Remote that refuses every call, so every store operation takes its fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemote;

impl CatalogRemote for OfflineRemote {
  async fn list(&self) -> Result<Vec<Product>, RemoteError> {
    Err(RemoteError::Offline)
  }

  async fn get(&self, _id: ProductId) -> Result<Product, RemoteError> {
    Err(RemoteError::Offline)
  }

  async fn create(&self, _draft: &ProductDraft) -> Result<Product, RemoteError> {
    Err(RemoteError::Offline)
  }

  async fn update(&self, _product: &Product) -> Result<Product, RemoteError> {
    Err(RemoteError::Offline)
  }

  async fn delete(&self, _id: ProductId) -> Result<(), RemoteError> {
    Err(RemoteError::Offline)
  }
}
