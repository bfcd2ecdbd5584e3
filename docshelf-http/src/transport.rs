//! `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::{Client, header::USER_AGENT};
use tracing::trace;

use docshelf_core::{
    error::{ShelfError, ShelfResult},
    transport::{HttpRequest, HttpResponse, Method, Transport, TransportBuilder},
};

const AUTHENTICATION: &str = "authentication";

/// A [`Transport`] that sends every request through a `reqwest::Client`.
///
/// The client is reused across requests, so connection pooling and TLS are whatever the
/// client was configured with. No timeout is set unless the supplied client has one.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    user_agent: Option<String>,
}

impl HttpTransport {
    /// Creates a transport using a default `reqwest::Client`.
    pub fn new() -> Self {
        Self { client: Client::new(), user_agent: None }
    }

    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> ShelfResult<HttpResponse> {
        let mut builder = self
            .client
            .request(Self::method(request.method), request.url())
            .header(AUTHENTICATION, request.authentication.as_str());

        if let Some(user_agent) = &self.user_agent {
            builder = builder.header(USER_AGENT, user_agent.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;

        trace!(status, bytes = body.len(), "response body read");

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn transport_error(err: reqwest::Error) -> ShelfError {
    ShelfError::Transport(err.to_string())
}

/// Builder for constructing [`HttpTransport`] instances.
///
/// # Example
///
/// ```ignore
/// use docshelf_http::HttpTransport;
/// use docshelf_core::transport::TransportBuilder;
///
/// let transport = HttpTransport::builder()
///     .user_agent("inventory-sync/1.0")
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    client: Option<Client>,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    /// Uses a preconfigured client, e.g. one with a proxy or custom TLS roots.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[async_trait]
impl TransportBuilder for HttpTransportBuilder {
    type Transport = HttpTransport;

    async fn build(self) -> ShelfResult<Self::Transport> {
        Ok(HttpTransport {
            client: self.client.unwrap_or_default(),
            user_agent: self.user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::*;

    /// Accepts one connection, answers it with `status` and `body`, and yields the raw
    /// request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];

            while !request_complete(&raw) {
                let read = socket.read(&mut buf).await.unwrap();
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..read]);
            }

            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8(raw).unwrap()
        });

        (host, handle)
    }

    /// A transport that ignores proxy settings from the environment.
    fn direct() -> HttpTransport {
        HttpTransport {
            client: Client::builder().no_proxy().build().unwrap(),
            user_agent: None,
        }
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        raw.len() >= end + 4 + length
    }

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(HttpTransport::method(Method::Get), reqwest::Method::GET);
        assert_eq!(HttpTransport::method(Method::Post), reqwest::Method::POST);
        assert_eq!(HttpTransport::method(Method::Put), reqwest::Method::PUT);
        assert_eq!(HttpTransport::method(Method::Delete), reqwest::Method::DELETE);
    }

    #[tokio::test]
    async fn builder_keeps_the_user_agent() {
        let transport = HttpTransport::builder()
            .user_agent("docshelf-tests")
            .build()
            .await
            .unwrap();

        assert_eq!(transport.user_agent.as_deref(), Some("docshelf-tests"));
    }

    #[tokio::test]
    async fn get_sends_empty_credential_and_no_body() {
        let (host, server) = serve_once("404 Not Found", r#"{"error":"missing"}"#).await;

        let response = direct()
            .send(HttpRequest::new(Method::Get, host, "/shop"))
            .await
            .unwrap();
        let raw = server.await.unwrap().to_ascii_lowercase();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, br#"{"error":"missing"}"#.to_vec());
        assert!(raw.starts_with("get /shop http/1.1\r\n"));
        assert!(raw.contains("\r\nauthentication: \r\n"));
        assert!(!raw.contains("content-type"));
    }

    #[tokio::test]
    async fn post_sends_credential_and_json_body() {
        let (host, server) = serve_once("201 Created", r#"{"data":"shop"}"#).await;

        let response = direct()
            .send(
                HttpRequest::new(Method::Post, host, "/")
                    .authentication(Some("root"))
                    .body(json!({ "name": "shop" })),
            )
            .await
            .unwrap();
        let raw = server.await.unwrap();
        let lowered = raw.to_ascii_lowercase();

        assert_eq!(response.status, 201);
        assert!(lowered.starts_with("post / http/1.1\r\n"));
        assert!(lowered.contains("\r\nauthentication: root\r\n"));
        assert!(lowered.contains("\r\ncontent-type: application/json\r\n"));
        assert!(raw.ends_with("\r\n\r\n{\"name\":\"shop\"}"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let transport = HttpTransport::new();

        let err = transport
            .send(HttpRequest::new(Method::Get, "http://127.0.0.1:1", "/shop"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShelfError::Transport(_)));
    }
}
