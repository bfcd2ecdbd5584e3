//! HTTP transport for docshelf built on `reqwest`.
//!
//! ```ignore
//! use docshelf_core::instance::Instance;
//! use docshelf_http::HttpTransport;
//!
//! let instance = Instance::new("http://localhost:8080", HttpTransport::new());
//! ```

#[allow(unused_extern_crates)]
extern crate self as docshelf_http;

pub mod transport;

pub use transport::{HttpTransport, HttpTransportBuilder};
