use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use rookdb_core::DatabaseHandle;

use crate::analyzers::AnalyzerClient;
use crate::documents::DocumentClient;
use crate::functions::FunctionClient;
use crate::protocol::Envelope;
use crate::query::QueryClient;
use crate::transport::{HttpTransport, Request, Transport};
use crate::Result;

/// Connection settings for a RookDb server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Option<Duration>,
    pub insecure_skip_verify: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            request_timeout: None,
            insecure_skip_verify: false,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_insecure_skip_verify(mut self, insecure_skip_verify: bool) -> Self {
        self.insecure_skip_verify = insecure_skip_verify;
        self
    }
}

/// RookDb API client.
///
/// Cheap to clone; every clone shares one transport. Operations are grouped
/// by concern behind the accessor methods.
#[derive(Clone)]
pub struct RookClient {
    transport: Arc<dyn Transport>,
}

impl RookClient {
    /// Connect to a server at the given base URL with default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(HttpTransport::new(&config)?),
        })
    }

    /// Build a client over a custom transport (tests, instrumentation).
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Document operations: CRUD, bulk calls, import, export.
    pub fn documents(&self) -> DocumentClient {
        DocumentClient::new(self.clone())
    }

    /// Query execution via server-side cursors.
    pub fn query(&self) -> QueryClient {
        QueryClient::new(self.clone())
    }

    /// Analyzer management.
    pub fn analyzers(&self) -> AnalyzerClient {
        AnalyzerClient::new(self.clone())
    }

    /// Function management.
    pub fn functions(&self) -> FunctionClient {
        FunctionClient::new(self.clone())
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Send one request and decode the response envelope.
    pub(crate) async fn execute(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<Envelope> {
        let response = self.transport.send(request, cancel).await?;
        Envelope::decode(&response.body)
    }
}

/// Database-scoped API path. The database segment is percent-encoded; the
/// caller encodes any segments inside `rest`.
pub(crate) fn api_path(database: &DatabaseHandle, rest: &str) -> String {
    format!("db/{}/{}", urlencoding::encode(&database.name), rest)
}
