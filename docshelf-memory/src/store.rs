//! In-memory emulation of the docshelf backend protocol.
//!
//! [`InMemoryBackend`] implements [`Transport`] by routing each request to an in-process
//! handler instead of the network. State lives behind an async-aware read-write lock, so a
//! backend can be cloned and shared between tasks.

use async_trait::async_trait;
use mea::rwlock::RwLock;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::{collections::BTreeMap, sync::Arc};
use tracing::trace;

use docshelf_core::{
    error::ShelfResult,
    query::FindQuery,
    transport::{HttpRequest, HttpResponse, Method, Transport, TransportBuilder},
};

use crate::evaluator::DocumentEvaluator;

type DocumentMap = BTreeMap<String, Value>;

#[derive(Debug, Default)]
struct DatabaseEntry {
    auth: Option<String>,
    collections: BTreeMap<String, DocumentMap>,
    reads: u64,
    writes: u64,
}

impl DatabaseEntry {
    fn size(&self) -> u64 {
        self.collections
            .values()
            .flat_map(|documents| documents.iter())
            .map(|(id, doc)| (id.len() + doc.to_string().len()) as u64)
            .sum()
    }
}

type DatabaseMap = BTreeMap<String, DatabaseEntry>;

#[derive(Debug, Deserialize)]
struct NameBody {
    name: String,
    #[serde(default)]
    auth: Option<String>,
}

/// A parsed request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Root,
    Database(&'a str),
    Collections(&'a str),
    Collection(&'a str, &'a str),
    SetDocument(&'a str, &'a str),
    FindOne(&'a str, &'a str),
    FindMany(&'a str, &'a str),
    Document(&'a str, &'a str, &'a str),
}

impl<'a> Route<'a> {
    fn parse(path: &'a str) -> Option<Self> {
        let segments = path
            .trim_start_matches('/')
            .split('/')
            .collect::<Vec<_>>();

        Some(match segments.as_slice() {
            [""] => Route::Root,
            [db] => Route::Database(db),
            [db, "collections"] => Route::Collections(db),
            [db, "collections", coll] => Route::Collection(db, coll),
            [db, "collections", coll, "setDocument"] => Route::SetDocument(db, coll),
            [db, "collections", coll, "findOneDocument"] => Route::FindOne(db, coll),
            [db, "collections", coll, "findManyDocuments"] => Route::FindMany(db, coll),
            [db, "collections", coll, "documents", id] => Route::Document(db, coll, id),
            _ => return None,
        })
    }
}

fn reply(status: u16, body: Value) -> HttpResponse {
    HttpResponse::json(status, &body)
}

fn data(body: Value) -> HttpResponse {
    reply(200, json!({ "data": body }))
}

fn failure(status: u16, message: impl Into<String>) -> HttpResponse {
    reply(status, json!({ "error": message.into() }))
}

fn parse_body<T: DeserializeOwned>(request: &HttpRequest) -> Result<T, HttpResponse> {
    let body = request.body.clone().unwrap_or(Value::Null);

    serde_json::from_value(body).map_err(|e| failure(400, e.to_string()))
}

/// Thread-safe in-memory backend speaking the docshelf HTTP protocol.
///
/// Databases, collections and documents are kept in ordered maps, so listings and lookups
/// return ids in lexical order. Each database tracks read and write counters that are
/// reported through its usage endpoint.
///
/// # Example
///
/// ```ignore
/// use docshelf_core::instance::Instance;
/// use docshelf_memory::InMemoryBackend;
///
/// let backend = InMemoryBackend::builder().master_password("root").build().await?;
/// let instance = Instance::new("memory://", backend.clone());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryBackend {
    databases: Arc<RwLock<DatabaseMap>>,
    master_password: Option<String>,
}

impl InMemoryBackend {
    /// Creates an empty backend that accepts database creation without a master password.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InMemoryBackendBuilder {
        InMemoryBackendBuilder::default()
    }

    /// Lists the names of all databases.
    pub async fn database_names(&self) -> Vec<String> {
        self.databases.read().await.keys().cloned().collect()
    }

    async fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let Some(route) = Route::parse(&request.path) else {
            return failure(404, format!("no route for {}", request.path));
        };

        trace!(method = %request.method, ?route, "routing request");

        if route == Route::Root {
            return self.add_database(request).await;
        }

        let mut databases = self.databases.write().await;

        match route {
            Route::Database(db) => match request.method {
                Method::Get => with_database(&mut databases, db, request, |entry| {
                    reply(200, json!({
                        "size": entry.size(),
                        "requests": { "read": entry.reads, "write": entry.writes },
                    }))
                }),
                Method::Put => edit_database(&mut databases, db, request),
                Method::Delete => match authorize(&databases, db, request) {
                    Err(response) => response,
                    Ok(()) => {
                        databases.remove(db);
                        reply(200, json!({}))
                    }
                },
                Method::Post => failure(405, "method not allowed"),
            },
            Route::Collections(db) => match request.method {
                Method::Get => with_database(&mut databases, db, request, |entry| {
                    entry.reads += 1;
                    data(json!(entry.collections.keys().collect::<Vec<_>>()))
                }),
                Method::Post => {
                    let body = match parse_body::<NameBody>(request) {
                        Ok(body) => body,
                        Err(response) => return response,
                    };

                    with_database(&mut databases, db, request, |entry| {
                        if entry.collections.contains_key(&body.name) {
                            return failure(409, format!("collection {} already exists", body.name));
                        }

                        entry.writes += 1;
                        entry.collections.insert(body.name, DocumentMap::new());
                        reply(201, json!({}))
                    })
                }
                _ => failure(405, "method not allowed"),
            },
            Route::Collection(db, coll) => match request.method {
                Method::Get => with_collection(&mut databases, db, coll, request, |_, _| {
                    data(json!(coll))
                }),
                Method::Put => {
                    let body = match parse_body::<NameBody>(request) {
                        Ok(body) => body,
                        Err(response) => return response,
                    };

                    with_database(&mut databases, db, request, |entry| {
                        if !entry.collections.contains_key(coll) {
                            return failure(404, format!("collection {coll} not found"));
                        }

                        if body.name != coll && entry.collections.contains_key(&body.name) {
                            return failure(409, format!("collection {} already exists", body.name));
                        }

                        if let Some(documents) = entry.collections.remove(coll) {
                            entry.collections.insert(body.name, documents);
                        }

                        entry.writes += 1;
                        reply(200, json!({}))
                    })
                }
                Method::Delete => with_database(&mut databases, db, request, |entry| {
                    match entry.collections.remove(coll) {
                        Some(_) => {
                            entry.writes += 1;
                            reply(200, json!({}))
                        }
                        None => failure(404, format!("collection {coll} not found")),
                    }
                }),
                Method::Post => failure(405, "method not allowed"),
            },
            Route::SetDocument(db, coll) if request.method == Method::Post => {
                let body = request.body.clone().unwrap_or(Value::Null);
                let id = match body.get("id") {
                    Some(Value::String(id)) => id.clone(),
                    _ => uuid::Uuid::new_v4().to_string(),
                };

                with_collection(&mut databases, db, coll, request, |counters, documents| {
                    counters.write();
                    documents.insert(id.clone(), body);
                    data(json!(id))
                })
            }
            Route::FindOne(db, coll) | Route::FindMany(db, coll) if request.method == Method::Post => {
                let query = match parse_body::<FindQuery>(request) {
                    Ok(query) => query,
                    Err(response) => return response,
                };
                let evaluator = match DocumentEvaluator::new(&query) {
                    Ok(evaluator) => evaluator,
                    Err(err) => return failure(400, err.to_string()),
                };
                let many = matches!(route, Route::FindMany(..));

                with_collection(&mut databases, db, coll, request, |counters, documents| {
                    counters.read();
                    let ids = evaluator.filter_documents(documents.iter());

                    if many {
                        data(json!(ids))
                    } else {
                        data(json!(ids.into_iter().next()))
                    }
                })
            }
            Route::Document(db, coll, id) => match request.method {
                Method::Get => with_collection(&mut databases, db, coll, request, |counters, documents| {
                    counters.read();
                    match documents.get(id) {
                        Some(doc) => data(doc.clone()),
                        None => failure(404, format!("document {id} not found")),
                    }
                }),
                Method::Delete => with_collection(&mut databases, db, coll, request, |counters, documents| {
                    match documents.remove(id) {
                        Some(_) => {
                            counters.write();
                            reply(200, json!({}))
                        }
                        None => failure(404, format!("document {id} not found")),
                    }
                }),
                _ => failure(405, "method not allowed"),
            },
            _ => failure(405, "method not allowed"),
        }
    }

    async fn add_database(&self, request: &HttpRequest) -> HttpResponse {
        if request.method != Method::Post {
            return failure(405, "method not allowed");
        }

        if let Some(password) = &self.master_password {
            if &request.authentication != password {
                return failure(401, "invalid master password");
            }
        }

        let body = match parse_body::<NameBody>(request) {
            Ok(body) => body,
            Err(response) => return response,
        };

        let mut databases = self.databases.write().await;

        if databases.contains_key(&body.name) {
            return failure(409, format!("database {} already exists", body.name));
        }

        databases.insert(
            body.name,
            DatabaseEntry { auth: body.auth, ..Default::default() },
        );

        reply(201, json!({}))
    }
}

/// Checks the request credential against the database's.
fn authorize(databases: &DatabaseMap, db: &str, request: &HttpRequest) -> Result<(), HttpResponse> {
    let Some(entry) = databases.get(db) else {
        return Err(failure(404, format!("database {db} not found")));
    };

    match &entry.auth {
        Some(auth) if auth != &request.authentication => Err(failure(401, "invalid credentials")),
        _ => Ok(()),
    }
}

fn with_database(
    databases: &mut DatabaseMap,
    db: &str,
    request: &HttpRequest,
    f: impl FnOnce(&mut DatabaseEntry) -> HttpResponse,
) -> HttpResponse {
    if let Err(response) = authorize(databases, db, request) {
        return response;
    }

    match databases.get_mut(db) {
        Some(entry) => f(entry),
        None => failure(404, format!("database {db} not found")),
    }
}

/// Request counters of a database, split from its collections so both can be borrowed.
struct Counters<'a> {
    reads: &'a mut u64,
    writes: &'a mut u64,
}

impl Counters<'_> {
    fn read(&mut self) {
        *self.reads += 1;
    }

    fn write(&mut self) {
        *self.writes += 1;
    }
}

fn with_collection(
    databases: &mut DatabaseMap,
    db: &str,
    coll: &str,
    request: &HttpRequest,
    f: impl FnOnce(&mut Counters<'_>, &mut DocumentMap) -> HttpResponse,
) -> HttpResponse {
    with_database(databases, db, request, |entry| {
        let DatabaseEntry { collections, reads, writes, .. } = entry;

        match collections.get_mut(coll) {
            Some(documents) => f(&mut Counters { reads, writes }, documents),
            None => failure(404, format!("collection {coll} not found")),
        }
    })
}

fn edit_database(databases: &mut DatabaseMap, db: &str, request: &HttpRequest) -> HttpResponse {
    if let Err(response) = authorize(databases, db, request) {
        return response;
    }

    let body = match parse_body::<NameBody>(request) {
        Ok(body) => body,
        Err(response) => return response,
    };

    if body.name != db && databases.contains_key(&body.name) {
        return failure(409, format!("database {} already exists", body.name));
    }

    match databases.remove(db) {
        Some(mut entry) => {
            entry.auth = body.auth;
            entry.writes += 1;
            databases.insert(body.name, entry);
            reply(200, json!({}))
        }
        None => failure(404, format!("database {db} not found")),
    }
}

#[async_trait]
impl Transport for InMemoryBackend {
    async fn send(&self, request: HttpRequest) -> ShelfResult<HttpResponse> {
        Ok(self.handle(&request).await)
    }
}

/// Builder for constructing [`InMemoryBackend`] instances.
///
/// # Example
///
/// ```ignore
/// use docshelf_memory::InMemoryBackend;
/// use docshelf_core::transport::TransportBuilder;
///
/// let backend = InMemoryBackend::builder().master_password("root").build().await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackendBuilder {
    master_password: Option<String>,
}

impl InMemoryBackendBuilder {
    /// Requires this credential on database creation.
    pub fn master_password(mut self, password: impl Into<String>) -> Self {
        self.master_password = Some(password.into());
        self
    }
}

#[async_trait]
impl TransportBuilder for InMemoryBackendBuilder {
    type Transport = InMemoryBackend;

    async fn build(self) -> ShelfResult<Self::Transport> {
        Ok(InMemoryBackend {
            databases: Arc::new(RwLock::new(DatabaseMap::new())),
            master_password: self.master_password,
        })
    }
}
