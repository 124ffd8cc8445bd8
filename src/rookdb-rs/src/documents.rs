use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use rookdb_core::{
    CreateOptions, DatabaseHandle, DeleteManyOptions, DeleteOptions, ExportOptions, ReplaceOptions,
    UpdateOptions, UpdateResult,
};

use crate::bulk::{build_bulk, match_results, BulkOperation};
use crate::client::{api_path, RookClient};
use crate::cursor::Cursor;
use crate::transport::{Method, Request};
use crate::{ClientError, Result};

/// Document operations: CRUD, bulk calls, import, export.
pub struct DocumentClient {
    client: RookClient,
}

impl DocumentClient {
    pub(crate) fn new(client: RookClient) -> Self {
        Self { client }
    }

    /// Fetch a single document by key.
    pub async fn get<T: DeserializeOwned>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let path = api_path(
            database,
            &format!(
                "document/{}/{}",
                urlencoding::encode(collection),
                urlencoding::encode(key)
            ),
        );
        let request =
            Request::new(Method::Get, path).with_transaction(database.transaction.clone());

        self.client.execute(request, cancel).await?.result_as()
    }

    /// Create a batch of documents with one call.
    ///
    /// Returns one result per input document, in input order; individual
    /// failures appear as item-errors and never shorten the sequence.
    pub async fn create_many<T, R>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        docs: &[T],
        options: CreateOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<UpdateResult<R>>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        self.bulk(
            BulkOperation::Create,
            database,
            collection,
            docs,
            options.params(),
            cancel,
        )
        .await
    }

    /// Create a single document.
    pub async fn create<T, R>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        doc: &T,
        options: CreateOptions,
        cancel: &CancellationToken,
    ) -> Result<UpdateResult<R>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let results = self
            .create_many(database, collection, std::slice::from_ref(doc), options, cancel)
            .await?;
        single(results)
    }

    /// Patch a batch of documents with one call.
    pub async fn update_many<T, R>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        docs: &[T],
        options: UpdateOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<UpdateResult<R>>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        self.bulk(
            BulkOperation::Update,
            database,
            collection,
            docs,
            options.params(),
            cancel,
        )
        .await
    }

    /// Patch a single document.
    pub async fn update<T, R>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        doc: &T,
        options: UpdateOptions,
        cancel: &CancellationToken,
    ) -> Result<UpdateResult<R>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let results = self
            .update_many(database, collection, std::slice::from_ref(doc), options, cancel)
            .await?;
        single(results)
    }

    /// Replace a batch of documents with one call.
    pub async fn replace_many<T, R>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        docs: &[T],
        options: ReplaceOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<UpdateResult<R>>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        self.bulk(
            BulkOperation::Replace,
            database,
            collection,
            docs,
            options.params(),
            cancel,
        )
        .await
    }

    /// Replace a single document.
    pub async fn replace<T, R>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        doc: &T,
        options: ReplaceOptions,
        cancel: &CancellationToken,
    ) -> Result<UpdateResult<R>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let results = self
            .replace_many(database, collection, std::slice::from_ref(doc), options, cancel)
            .await?;
        single(results)
    }

    /// Delete a batch of documents with one call. Inputs may be full
    /// documents or key-only stubs.
    pub async fn delete_many<T, R>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        docs: &[T],
        options: DeleteManyOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<UpdateResult<R>>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        self.bulk(
            BulkOperation::Delete,
            database,
            collection,
            docs,
            options.params(),
            cancel,
        )
        .await
    }

    /// Delete a single document by key.
    pub async fn delete<R: DeserializeOwned>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        key: &str,
        options: DeleteOptions,
        cancel: &CancellationToken,
    ) -> Result<UpdateResult<R>> {
        let path = api_path(
            database,
            &format!(
                "document/{}/{}",
                urlencoding::encode(collection),
                urlencoding::encode(key)
            ),
        );
        let request = Request::new(Method::Delete, path)
            .with_query(options.params())
            .with_transaction(database.transaction.clone());

        let envelope = self.client.execute(request, cancel).await?;
        UpdateResult::from_element(envelope.result).map_err(ClientError::Serialization)
    }

    /// Array import: load a batch of documents through the import endpoint.
    ///
    /// With `complete` set the server aborts the whole import on the first
    /// failing document instead of skipping it.
    pub async fn import<T: Serialize>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        docs: &[T],
        complete: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = Request::new(Method::Post, api_path(database, "import"))
            .with_query(vec![
                ("type", "array".to_string()),
                ("complete", complete.to_string()),
                ("collection", collection.to_string()),
            ])
            .with_body(serde_json::to_vec(docs)?)
            .with_transaction(database.transaction.clone());

        self.client.execute(request, cancel).await?;
        Ok(())
    }

    /// Stream every document of a collection in server-defined batches.
    pub async fn export<T: DeserializeOwned>(
        &self,
        database: &DatabaseHandle,
        collection: &str,
        options: ExportOptions,
        cancel: &CancellationToken,
    ) -> Result<Cursor<T>> {
        let request = Request::new(Method::Post, api_path(database, "export"))
            .with_query(vec![("collection", collection.to_string())])
            .with_body(serde_json::to_vec(&options)?)
            .with_transaction(database.transaction.clone());

        Cursor::open(
            self.client.transport().clone(),
            database.clone(),
            request,
            cancel.clone(),
        )
        .await
    }

    async fn bulk<T, R>(
        &self,
        operation: BulkOperation,
        database: &DatabaseHandle,
        collection: &str,
        docs: &[T],
        params: Vec<(&'static str, String)>,
        cancel: &CancellationToken,
    ) -> Result<Vec<UpdateResult<R>>>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let input_len = docs.len();
        let request = build_bulk(operation, database, collection, docs, params)?;
        let envelope = self.client.execute(request, cancel).await?;
        match_results(envelope.result, input_len)
    }
}

/// Unwrap the one result of a single-document bulk call. The length check
/// upstream guarantees one element per input.
fn single<R>(mut results: Vec<UpdateResult<R>>) -> Result<UpdateResult<R>> {
    results
        .pop()
        .ok_or_else(|| ClientError::Protocol("empty bulk result for single document".into()))
}
