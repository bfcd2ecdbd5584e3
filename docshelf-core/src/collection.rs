//! Collection handles.
//!
//! A [`Collection`] addresses one named collection inside a database and produces
//! [`Document`] handles. Its name is shared state: after a successful [`Collection::edit`],
//! every clone of the handle and every document handle it produced address the new name.
//!
//! # Example
//!
//! ```ignore
//! use docshelf::query::MatchValue;
//!
//! let orders = shop.add_collection("orders").await?;
//! let order = orders.add_document(&serde_json::json!({ "item": "x" })).await?;
//!
//! let found = orders
//!     .find_many_documents("item", [MatchValue::literal("x"), MatchValue::pattern("^y")])
//!     .await?;
//! ```

use mea::rwlock::RwLock;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::{
    database::Database,
    document::Document,
    error::ShelfResult,
    executor::RequestExecutor,
    query::{FindQuery, MatchValue},
    transport::Method,
};

/// A handle to one collection.
#[derive(Debug, Clone)]
pub struct Collection {
    database: Database,
    name: Arc<RwLock<String>>,
}

impl Collection {
    pub(crate) fn new(database: Database, name: String) -> Self {
        Self {
            database,
            name: Arc::new(RwLock::new(name)),
        }
    }

    /// Returns the name this handle currently addresses.
    pub async fn name(&self) -> String {
        self.name.read().await.clone()
    }

    /// Returns the database this collection belongs to.
    pub fn database(&self) -> &Database {
        &self.database
    }

    pub(crate) fn executor(&self) -> &RequestExecutor {
        self.database.executor()
    }

    pub(crate) fn auth(&self) -> Option<&str> {
        self.database.auth()
    }

    pub(crate) async fn path(&self) -> String {
        format!("{}/collections/{}", self.database.path().await, self.name().await)
    }

    /// Deletes the collection.
    pub async fn remove(&self) -> ShelfResult<()> {
        self.executor()
            .request(Method::Delete, self.path().await)
            .auth(self.auth())
            .send("deleting a collection")
            .await?;

        Ok(())
    }

    /// Renames the collection.
    ///
    /// The local name only changes once the backend accepts the rename. Concurrent edits on
    /// the same handle are not ordered: the name ends up as whichever response arrives last.
    pub async fn edit(&self, new_name: &str) -> ShelfResult<()> {
        self.executor()
            .request(Method::Put, self.path().await)
            .auth(self.auth())
            .json(&json!({ "name": new_name }))
            .send("editing a collection")
            .await?;

        debug!(name = new_name, "collection renamed");
        *self.name.write().await = new_name.to_string();

        Ok(())
    }

    /// Lists document identifiers.
    ///
    /// This requests `/{db}/collections`, the same route as
    /// [`Database::list_collections`]; it is the route the backend has been observed to serve.
    pub async fn list_documents(&self) -> ShelfResult<Vec<String>> {
        self.executor()
            .request(Method::Get, format!("{}/collections", self.database.path().await))
            .auth(self.auth())
            .send("listing documents")
            .await?
            .data()
    }

    /// Returns a handle for the document with the given id. No request is made.
    pub fn document<T>(&self, id: &str) -> Document<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        Document::new(self.clone(), id.to_string())
    }

    /// Stores a new document and returns a handle bound to the id assigned by the backend.
    pub async fn add_document<T>(&self, body: &T) -> ShelfResult<Document<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let body = serde_json::to_value(body)?;
        let id = self.post_document(&body).await?;

        Ok(self.document(&id))
    }

    /// Posts a body to the `setDocument` endpoint and returns the id the backend reports.
    pub(crate) async fn post_document(&self, body: &Value) -> ShelfResult<String> {
        self.executor()
            .request(Method::Post, format!("{}/setDocument", self.path().await))
            .auth(self.auth())
            .json(body)
            .send("setting document")
            .await?
            .data()
    }

    /// Finds the id of a document whose `key` field satisfies the criteria, if any.
    pub async fn find_one_document<I, V>(&self, key: &str, values: I) -> ShelfResult<Option<String>>
    where
        I: IntoIterator<Item = V>,
        V: Into<MatchValue>,
    {
        let query = FindQuery::new(key).values(values);

        self.executor()
            .request(Method::Post, format!("{}/findOneDocument", self.path().await))
            .auth(self.auth())
            .json(&query)
            .send("looking for a document")
            .await?
            .data()
    }

    /// Finds the ids of every document whose `key` field satisfies the criteria.
    pub async fn find_many_documents<I, V>(&self, key: &str, values: I) -> ShelfResult<Vec<String>>
    where
        I: IntoIterator<Item = V>,
        V: Into<MatchValue>,
    {
        let query = FindQuery::new(key).values(values);

        self.executor()
            .request(Method::Post, format!("{}/findManyDocuments", self.path().await))
            .auth(self.auth())
            .json(&query)
            .send("looking for documents")
            .await?
            .data()
    }

    /// Checks whether the collection exists.
    ///
    /// Any non-2xx status is read as absence. Transport failures are still returned as errors.
    pub async fn exists(&self) -> ShelfResult<bool> {
        let response = self
            .executor()
            .request(Method::Get, self.path().await)
            .auth(self.auth())
            .send_raw()
            .await?;

        Ok(response.is_success())
    }
}
