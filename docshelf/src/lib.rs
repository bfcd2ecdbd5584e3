//! Main docshelf crate providing handles over a remote JSON document store.
//!
//! This crate is the primary entry point for users of docshelf. It re-exports the core
//! types from the sub-crates and provides ready-made transports.
//!
//! # Features
//!
//! - **Stable handles** - Databases, collections and documents are addressed by name or id,
//!   and renames made through a handle are seen by every handle derived from it
//! - **Typed documents** - Payloads are any Serde type
//! - **Tagged lookups** - Literal and pattern criteria for finding documents by field
//! - **Pluggable transports** - `reqwest` over HTTP, or an in-memory backend for tests
//!
//! # Quick Start
//!
//! ```ignore
//! use docshelf::prelude::*;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Order {
//!     pub item: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> ShelfResult<()> {
//!     let instance = docshelf::connect("http://localhost:8080");
//!
//!     let shop = instance
//!         .add_database("shop", AddDatabaseOptions::default().master_password("root"))
//!         .await?;
//!     let orders = shop.add_collection("orders").await?;
//!
//!     let order = orders.add_document(&Order { item: "x".into() }).await?;
//!     println!("stored order {}", order.id().await);
//!
//!     let found = orders
//!         .find_many_documents("item", [MatchValue::literal("x"), MatchValue::pattern("^y")])
//!         .await?;
//!     println!("matching orders: {found:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Transports
//!
//! - [`http`] - `reqwest` transport (requires the `http` feature, on by default)
//! - [`memory`] - In-process backend for development and testing

pub mod prelude;

pub use docshelf_core::{collection, database, document, error, executor, instance, query, transport};

// Re-export serde_json since document payloads and error bodies are JSON values
pub use serde_json;

/// In-memory backend implementations.
pub mod memory {
    pub use docshelf_memory::{InMemoryBackend, InMemoryBackendBuilder};
}

/// HTTP transport implementations.
///
/// This module is only available when the `http` feature is enabled.
#[cfg(feature = "http")]
pub mod http {
    pub use docshelf_http::{HttpTransport, HttpTransportBuilder};
}

/// Returns an [`Instance`](instance::Instance) for `host` that talks HTTP through a default
/// `reqwest` client. A trailing `/` on `host` is dropped.
#[cfg(feature = "http")]
pub fn connect(host: &str) -> instance::Instance {
    instance::Instance::new(host, docshelf_http::HttpTransport::new())
}
