//! Convenient re-exports of commonly used types from docshelf.
//!
//! ```ignore
//! use docshelf::prelude::*;
//! ```

pub use docshelf_core::{
    collection::Collection,
    database::{Database, DatabaseUsage, RequestCounts},
    document::Document,
    error::{ShelfError, ShelfResult},
    instance::{AddDatabaseOptions, GetDatabaseOptions, Instance},
    query::{FindQuery, MatchValue},
    transport::{HttpRequest, HttpResponse, Method, Transport, TransportBuilder},
};
