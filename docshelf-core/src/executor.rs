//! Request execution and response normalization.
//!
//! [`RequestExecutor`] is the single point where a backend response is classified. A 2xx
//! status yields an [`ExecutedResponse`] that can be decoded as JSON. Anything else becomes a
//! [`ShelfError::Backend`] carrying the status and the parsed error body. If the error body
//! itself is not valid JSON, that parse failure is returned instead.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

use crate::{
    error::{ShelfError, ShelfResult},
    transport::{HttpRequest, HttpResponse, Method, Transport},
};

/// Wire envelope used by every listing and lookup endpoint: `{"data": ...}`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// A response that is known to be successful.
#[derive(Debug)]
pub struct ExecutedResponse {
    inner: HttpResponse,
}

impl ExecutedResponse {
    /// Decodes the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> ShelfResult<T> {
        Ok(serde_json::from_slice(&self.inner.body)?)
    }

    /// Decodes a `{"data": ...}` envelope and returns its contents.
    pub(crate) fn data<T: DeserializeOwned>(&self) -> ShelfResult<T> {
        Ok(self.json::<Envelope<T>>()?.data)
    }
}

/// Sends requests to a fixed backend address through a shared [`Transport`].
#[derive(Clone)]
pub struct RequestExecutor {
    host: Arc<str>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    /// Creates an executor for the given backend address.
    ///
    /// Trailing `/` characters are removed so that paths can always start with one.
    pub fn new(host: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            host: Arc::from(host.trim_end_matches('/')),
            transport,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Starts building a request against this executor's backend.
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder {
            executor: self,
            request: HttpRequest::new(method, &*self.host, path),
            body: None,
        }
    }

    /// Sends a request and returns the raw response without classifying its status.
    pub async fn send_raw(&self, request: HttpRequest) -> ShelfResult<HttpResponse> {
        debug!(method = %request.method, path = %request.path, "sending request");

        let response = self.transport.send(request).await?;

        debug!(status = response.status, "received response");

        Ok(response)
    }

    /// Sends a request and fails with [`ShelfError::Backend`] on a non-2xx status.
    pub async fn execute(
        &self,
        request: HttpRequest,
        operation: &'static str,
    ) -> ShelfResult<ExecutedResponse> {
        let response = self.send_raw(request).await?;

        if response.is_success() {
            return Ok(ExecutedResponse { inner: response });
        }

        Err(backend_error(response, operation))
    }
}

/// Converts a failed response into a [`ShelfError::Backend`].
///
/// The body is assumed to be JSON. If it does not parse, the parse error is returned.
pub(crate) fn backend_error(response: HttpResponse, operation: &'static str) -> ShelfError {
    let body = match serde_json::from_slice::<Value>(&response.body) {
        Ok(body) => body,
        Err(err) => {
            warn!(status = response.status, operation, "backend returned an unreadable error body");
            return err.into();
        }
    };

    warn!(status = response.status, operation, "backend rejected request");

    ShelfError::Backend {
        operation,
        status: response.status,
        body,
    }
}

/// Fluent construction of a single request.
pub struct RequestBuilder<'a> {
    executor: &'a RequestExecutor,
    request: HttpRequest,
    body: Option<ShelfResult<Value>>,
}

impl<'a> RequestBuilder<'a> {
    pub fn auth(mut self, auth: Option<&str>) -> Self {
        self.request = self.request.authentication(auth);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Some(serde_json::to_value(body).map_err(ShelfError::from));
        self
    }

    pub fn build(self) -> ShelfResult<HttpRequest> {
        match self.body {
            Some(body) => Ok(self.request.body(body?)),
            None => Ok(self.request),
        }
    }

    /// Sends the request, failing on a non-2xx status.
    pub async fn send(self, operation: &'static str) -> ShelfResult<ExecutedResponse> {
        let executor = self.executor;
        executor.execute(self.build()?, operation).await
    }

    /// Sends the request and returns the raw response.
    pub async fn send_raw(self) -> ShelfResult<HttpResponse> {
        let executor = self.executor;
        executor.send_raw(self.build()?).await
    }
}
