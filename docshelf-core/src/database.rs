//! Database handles.
//!
//! A [`Database`] addresses one named database and produces [`Collection`] handles. The
//! name is shared by every clone of the handle and by every collection and document handle
//! derived from it, so a successful [`Database::edit`] re-targets all of them at once.

use mea::rwlock::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::{
    collection::Collection,
    error::ShelfResult,
    executor::RequestExecutor,
    transport::Method,
};

/// Request counters reported by [`Database::usage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounts {
    pub read: u64,
    pub write: u64,
}

/// Storage and traffic summary of a database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseUsage {
    /// Storage size in bytes.
    pub size: u64,
    pub requests: RequestCounts,
}

#[derive(Debug)]
struct DatabaseState {
    executor: RequestExecutor,
    name: RwLock<String>,
    auth: Option<String>,
}

/// A handle to one database.
#[derive(Debug, Clone)]
pub struct Database {
    state: Arc<DatabaseState>,
}

impl Database {
    pub(crate) fn new(executor: RequestExecutor, name: String, auth: Option<String>) -> Self {
        Self {
            state: Arc::new(DatabaseState {
                executor,
                name: RwLock::new(name),
                auth,
            }),
        }
    }

    /// Returns the name this handle currently addresses.
    pub async fn name(&self) -> String {
        self.state.name.read().await.clone()
    }

    /// Returns the credential sent with every request made through this handle.
    pub fn auth(&self) -> Option<&str> {
        self.state.auth.as_deref()
    }

    pub(crate) fn executor(&self) -> &RequestExecutor {
        &self.state.executor
    }

    pub(crate) async fn path(&self) -> String {
        format!("/{}", self.name().await)
    }

    /// Deletes the database.
    pub async fn remove(&self) -> ShelfResult<()> {
        self.executor()
            .request(Method::Delete, self.path().await)
            .auth(self.auth())
            .send("deleting a database")
            .await?;

        Ok(())
    }

    /// Renames the database and replaces its credential on the backend.
    ///
    /// `new_auth` of `None` asks the backend to drop the credential. The handle keeps
    /// sending the credential it was created with.
    pub async fn edit(&self, new_name: &str, new_auth: Option<&str>) -> ShelfResult<()> {
        self.executor()
            .request(Method::Put, self.path().await)
            .auth(self.auth())
            .json(&json!({ "name": new_name, "auth": new_auth }))
            .send("editing a database")
            .await?;

        debug!(name = new_name, "database renamed");
        *self.state.name.write().await = new_name.to_string();

        Ok(())
    }

    /// Lists the names of the collections in this database.
    pub async fn list_collections(&self) -> ShelfResult<Vec<String>> {
        self.executor()
            .request(Method::Get, format!("{}/collections", self.path().await))
            .auth(self.auth())
            .send("listing collections")
            .await?
            .data()
    }

    /// Returns a handle for the named collection. No request is made.
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(self.clone(), name.to_string())
    }

    /// Creates a collection and returns a handle for it.
    pub async fn add_collection(&self, name: &str) -> ShelfResult<Collection> {
        self.executor()
            .request(Method::Post, format!("{}/collections", self.path().await))
            .auth(self.auth())
            .json(&json!({ "name": name }))
            .send("adding a collection")
            .await?;

        Ok(self.collection(name))
    }

    /// Fetches the storage and request usage of the database.
    pub async fn usage(&self) -> ShelfResult<DatabaseUsage> {
        self.executor()
            .request(Method::Get, self.path().await)
            .auth(self.auth())
            .send("getting database usage")
            .await?
            .json()
    }

    /// Checks whether the database exists by fetching its usage.
    ///
    /// Every failure, transport failures included, is read as absence.
    pub async fn exists(&self) -> bool {
        self.usage().await.is_ok()
    }
}
