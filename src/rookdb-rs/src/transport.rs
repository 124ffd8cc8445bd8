use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::ClientConfig;
use crate::{ClientError, Result};

/// HTTP verbs used by the RookDb API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// One request as the driver hands it to a transport.
///
/// Query pairs keep their order; transports must append them as given.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
    pub transaction: Option<String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            transaction: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_transaction(mut self, transaction: Option<String>) -> Self {
        self.transaction = transaction;
        self
    }
}

/// Raw response as a transport returns it: status plus undecoded body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

/// Seam between the driver and the HTTP stack.
///
/// The driver builds requests and decodes responses; a transport only moves
/// bytes. Tests substitute a scripted implementation, and anything beyond a
/// single attempt (retries, pooling) belongs on this side of the seam.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request, cancel: &CancellationToken) -> Result<Response>;
}

/// Production transport backed by reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: reqwest::Url,
    auth_token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if config.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;

        // A trailing slash makes Url::join treat the base as a directory.
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = reqwest::Url::parse(&base)
            .map_err(|err| ClientError::Protocol(format!("invalid base URL: {err}")))?;

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    fn url_for(&self, request: &Request) -> Result<reqwest::Url> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|err| ClientError::Protocol(format!("invalid request path: {err}")))?;

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query {
                pairs.append_pair(name, value);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request, cancel: &CancellationToken) -> Result<Response> {
        let url = self.url_for(&request)?;
        debug!(method = request.method.as_str(), %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };

        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(transaction) = &request.transaction {
            builder = builder.header("x-rookdb-trx-id", transaction);
        }
        if let Some(body) = request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            response = builder.send() => response?,
        };

        let status = response.status().as_u16();
        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            body = response.bytes() => body?,
        };

        Ok(Response { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base_url: &str) -> HttpTransport {
        HttpTransport::new(&ClientConfig::new(base_url)).unwrap()
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Patch.as_str(), "PATCH");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_url_joins_relative_path() {
        let transport = transport("http://localhost:8529");
        let request = Request::new(Method::Get, "db/test/document/users/alice");
        let url = transport.url_for(&request).unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:8529/db/test/document/users/alice"
        );
    }

    #[test]
    fn test_url_query_pairs_keep_order() {
        let transport = transport("http://localhost:8529/");
        let request = Request::new(Method::Post, "db/test/document/users").with_query(vec![
            ("waitForSync", "true".to_string()),
            ("returnNew", "false".to_string()),
        ]);
        let url = transport.url_for(&request).unwrap();

        assert_eq!(url.query(), Some("waitForSync=true&returnNew=false"));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = HttpTransport::new(&ClientConfig::new("not a url"));
        assert!(matches!(result, Err(ClientError::Protocol(_))));
    }
}
