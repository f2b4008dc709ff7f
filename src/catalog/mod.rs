//! Product types and the remote inventory service client.

mod client;
mod remote;
mod types;

pub use client::HttpRemote;
pub use remote::{CatalogRemote, OfflineRemote, RemoteError};
pub use types::{Product, ProductDraft, ProductId};
