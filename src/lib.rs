//! Product catalog client that keeps working when the inventory service is down.
//!
//! [`store::CatalogStore`] tries the remote service first and falls back to
//! its own collection, which is mirrored to local storage after every change.

pub mod app;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod logging;
pub mod mirror;
pub mod store;
