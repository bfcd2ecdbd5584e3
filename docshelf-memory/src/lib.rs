//! In-memory backend for docshelf.
//!
//! This crate provides an in-process implementation of the backend's HTTP contract, exposed
//! as a [`Transport`](docshelf_core::transport::Transport). Handles built on top of it behave
//! exactly as they would against a remote server, which makes it suited to development and
//! tests.
//!
//! # Features
//!
//! - **Full route table** - Databases, collections, documents, lookups and usage
//! - **Credentials** - Optional master password for database creation and per-database auth
//! - **Pattern lookups** - `regex:` criteria evaluated with the `regex` crate
//!
//! # Quick Start
//!
//! ```ignore
//! use docshelf::{prelude::*, memory::InMemoryBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let instance = Instance::new("memory://", InMemoryBackend::new());
//!     let shop = instance.add_database("shop", Default::default()).await?;
//!     let orders = shop.add_collection("orders").await?;
//!
//!     let order = orders.add_document(&serde_json::json!({ "item": "x" })).await?;
//!     println!("stored {}", order.id().await);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docshelf_memory;

pub mod evaluator;
pub mod store;

pub use store::{InMemoryBackend, InMemoryBackendBuilder};
