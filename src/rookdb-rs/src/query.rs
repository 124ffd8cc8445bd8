use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use rookdb_core::{DatabaseHandle, QueryRequest};

use crate::client::{api_path, RookClient};
use crate::cursor::Cursor;
use crate::transport::{Method, Request};
use crate::Result;

/// Query execution via server-side cursors.
pub struct QueryClient {
    client: RookClient,
}

impl QueryClient {
    pub(crate) fn new(client: RookClient) -> Self {
        Self { client }
    }

    /// Open a cursor for a query and stream its batches lazily.
    pub async fn cursor<T: DeserializeOwned>(
        &self,
        database: &DatabaseHandle,
        query: QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<Cursor<T>> {
        let request = Request::new(Method::Post, api_path(database, "cursor"))
            .with_body(serde_json::to_vec(&query)?)
            .with_transaction(database.transaction.clone());

        Cursor::open(
            self.client.transport().clone(),
            database.clone(),
            request,
            cancel.clone(),
        )
        .await
    }

    /// Run a query and collect every batch into one vector.
    pub async fn all<T: DeserializeOwned>(
        &self,
        database: &DatabaseHandle,
        query: QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        let mut cursor = self.cursor(database, query, cancel).await?;
        let mut rows = Vec::new();
        while let Some(batch) = cursor.next_batch().await {
            rows.extend(batch?);
        }
        Ok(rows)
    }
}
