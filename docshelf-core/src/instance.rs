//! Root entry point bound to a backend address.

use serde_json::json;
use std::sync::Arc;

use crate::{
    database::Database,
    error::ShelfResult,
    executor::RequestExecutor,
    transport::{Method, Transport},
};

/// Options for [`Instance::database`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetDatabaseOptions {
    /// Credential sent with every request made through the database handle.
    pub auth: Option<String>,
}

impl GetDatabaseOptions {
    pub fn auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }
}

/// Options for [`Instance::add_database`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddDatabaseOptions {
    /// Credential the new database will require, and that the returned handle sends.
    pub auth: Option<String>,
    /// Server-wide credential authorizing the creation itself.
    pub master_password: Option<String>,
}

impl AddDatabaseOptions {
    pub fn auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    pub fn master_password(mut self, password: impl Into<String>) -> Self {
        self.master_password = Some(password.into());
        self
    }
}

/// A backend address together with the transport used to reach it.
///
/// # Example
///
/// ```ignore
/// use docshelf::prelude::*;
///
/// let instance = docshelf::connect("http://localhost:8080/");
/// let shop = instance
///     .add_database("shop", AddDatabaseOptions::default().master_password("root"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    executor: RequestExecutor,
}

impl Instance {
    /// Creates an instance for `host`. A trailing `/` is dropped.
    pub fn new<T: Transport + 'static>(host: &str, transport: T) -> Self {
        Self::from_shared(host, Arc::new(transport))
    }

    /// Creates an instance that shares an existing transport.
    pub fn from_shared(host: &str, transport: Arc<dyn Transport>) -> Self {
        Self { executor: RequestExecutor::new(host, transport) }
    }

    /// Returns the backend address, without trailing `/`.
    pub fn host(&self) -> &str {
        self.executor.host()
    }

    /// Returns a handle for the named database. No request is made, so the database does
    /// not need to exist yet.
    pub fn database(&self, name: &str, options: GetDatabaseOptions) -> Database {
        Database::new(self.executor.clone(), name.to_string(), options.auth)
    }

    /// Creates a database and returns a handle for it.
    ///
    /// The creation request is authenticated with `master_password`; the returned handle
    /// uses `auth`. An empty `auth` is sent as `null`.
    pub async fn add_database(&self, name: &str, options: AddDatabaseOptions) -> ShelfResult<Database> {
        let auth = options.auth.filter(|auth| !auth.is_empty());

        self.executor
            .request(Method::Post, "/")
            .auth(options.master_password.as_deref())
            .json(&json!({ "name": name, "auth": auth }))
            .send("adding a database")
            .await?;

        Ok(Database::new(self.executor.clone(), name.to_string(), auth))
    }
}
