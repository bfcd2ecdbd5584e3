//! Transport abstraction for reaching a document backend.
//!
//! The handles in this crate never talk to the network directly. Every request is described
//! as an [`HttpRequest`] and handed to a [`Transport`], which performs exactly one round trip
//! and reports the raw [`HttpResponse`]. Deciding whether a response counts as success is left
//! to the [`RequestExecutor`](crate::executor::RequestExecutor).
//!
//! # Traits
//!
//! - [`Transport`]: The core trait for anything that can deliver a request
//! - [`TransportBuilder`]: Factory trait for creating transport instances
//!
//! # Example
//!
//! ```ignore
//! use docshelf::transport::{HttpRequest, Method, Transport};
//!
//! let response = transport
//!     .send(HttpRequest::new(Method::Get, "http://localhost:8080", "/shop"))
//!     .await?;
//! assert!(response.is_success());
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::{fmt, fmt::Debug, sync::Arc};

use crate::error::ShelfResult;

/// The HTTP methods used by the backend protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to the backend.
///
/// `authentication` is always sent as the `authentication` header. An absent credential is
/// sent as an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub host: String,
    pub path: String,
    pub authentication: String,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            host: host.into(),
            path: path.into(),
            authentication: String::new(),
            body: None,
        }
    }

    pub fn authentication(mut self, auth: Option<&str>) -> Self {
        self.authentication = auth.unwrap_or_default().to_string();
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the full URL of this request.
    pub fn url(&self) -> String {
        format!("{}{}", self.host, self.path)
    }
}

/// The raw outcome of a request: status code and undecoded body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    /// Builds a response whose body is the serialized JSON value.
    pub fn json(status: u16, body: &Value) -> Self {
        Self { status, body: body.to_string().into_bytes() }
    }

    /// Returns `true` if the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract interface for delivering requests to a document backend.
///
/// Implementations perform exactly one request per call: no retries, no caching, and no
/// timeout beyond whatever the underlying HTTP stack applies by default.
///
/// # Error Handling
///
/// Any response, whatever its status, is returned as `Ok`. Only failures that prevent a
/// response from being produced at all are reported as
/// [`ShelfError::Transport`](crate::error::ShelfError::Transport).
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Sends a request and returns the raw response.
    async fn send(&self, request: HttpRequest) -> ShelfResult<HttpResponse>;
}

#[async_trait]
impl<T> Transport for &T
where
    T: Transport,
{
    async fn send(&self, request: HttpRequest) -> ShelfResult<HttpResponse> {
        (*self).send(request).await
    }
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: HttpRequest) -> ShelfResult<HttpResponse> {
        (**self).send(request).await
    }
}

#[async_trait]
pub trait TransportBuilder {
    type Transport: Transport;

    async fn build(self) -> ShelfResult<Self::Transport>;
}
