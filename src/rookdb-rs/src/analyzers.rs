use tokio_util::sync::CancellationToken;

use rookdb_core::{AnalyzerDefinition, DatabaseHandle};

use crate::client::{api_path, RookClient};
use crate::transport::{Method, Request};
use crate::Result;

/// Analyzer management.
pub struct AnalyzerClient {
    client: RookClient,
}

impl AnalyzerClient {
    pub(crate) fn new(client: RookClient) -> Self {
        Self { client }
    }

    /// List the analyzers visible in the database.
    pub async fn list(
        &self,
        database: &DatabaseHandle,
        cancel: &CancellationToken,
    ) -> Result<Vec<AnalyzerDefinition>> {
        let request = Request::new(Method::Get, api_path(database, "analyzer"))
            .with_transaction(database.transaction.clone());

        self.client.execute(request, cancel).await?.result_as()
    }

    pub async fn create(
        &self,
        database: &DatabaseHandle,
        analyzer: &AnalyzerDefinition,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = Request::new(Method::Post, api_path(database, "analyzer"))
            .with_body(serde_json::to_vec(analyzer)?)
            .with_transaction(database.transaction.clone());

        self.client.execute(request, cancel).await?;
        Ok(())
    }

    /// Delete an analyzer; `force` also drops one that is still in use.
    pub async fn delete(
        &self,
        database: &DatabaseHandle,
        name: &str,
        force: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let path = api_path(database, &format!("analyzer/{}", urlencoding::encode(name)));
        let request = Request::new(Method::Delete, path)
            .with_query(vec![("force", force.to_string())])
            .with_transaction(database.transaction.clone());

        self.client.execute(request, cancel).await?;
        Ok(())
    }
}
