//! A thin client for hierarchical JSON document stores reached over HTTP.
//!
//! This crate is the core of the docshelf project and provides:
//!
//! - **Resource handles** ([`instance`], [`database`], [`collection`], [`document`]) - Local
//!   handles addressing remote databases, collections and documents by name or id
//! - **Transport abstraction** ([`transport`]) - The trait a concrete HTTP stack implements
//! - **Request execution** ([`executor`]) - Mapping of backend responses to results
//! - **Lookup criteria** ([`query`]) - Literal and pattern criteria for document lookups
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! Handles hold no cached content. Each operation is one request, and identity changes
//! (collection or database renames, ids adopted after a write) are shared with every handle
//! derived from the one that made the change.
//!
//! # Example
//!
//! ```ignore
//! use docshelf_core::{instance::{Instance, AddDatabaseOptions}};
//!
//! let instance = Instance::new("http://localhost:8080", transport);
//! let shop = instance
//!     .add_database("shop", AddDatabaseOptions::default().master_password("root"))
//!     .await?;
//! let orders = shop.add_collection("orders").await?;
//! let order = orders.add_document(&serde_json::json!({ "item": "x" })).await?;
//! assert_eq!(order.id().await, "d1");
//! ```

#[allow(unused_extern_crates)]
extern crate self as docshelf_core;

pub mod collection;
pub mod database;
pub mod document;
pub mod error;
pub mod executor;
pub mod instance;
pub mod query;
pub mod transport;

#[cfg(test)]
mod testing;
