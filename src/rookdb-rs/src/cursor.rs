use std::marker::PhantomData;
use std::sync::Arc;

use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use rookdb_core::DatabaseHandle;

use crate::client::api_path;
use crate::protocol::Envelope;
use crate::transport::{Method, Request, Transport};
use crate::{ClientError, Result};

/// Where a cursor is in its lifecycle.
#[derive(Debug)]
enum CursorState {
    /// First batch fetched by the opening request, not yet handed out.
    Initial {
        batch: Value,
        has_more: bool,
        id: Option<String>,
    },
    /// Consumer is pulling continuation batches for a live cursor id.
    Streaming { id: String },
    /// Terminal: exhausted, failed, closed, or cancelled.
    Done,
}

/// Lazy batch sequence over a server-side cursor (exports and queries).
///
/// Pull batches with [`next_batch`](Cursor::next_batch), or adapt to a
/// [`futures::Stream`] with [`into_stream`](Cursor::into_stream). One
/// continuation request is in flight at most, and only when the consumer
/// asks for the next batch.
///
/// The server-side cursor is released exactly once: after the final batch,
/// by an explicit [`close`](Cursor::close), or, as a fallback when the
/// cursor is dropped while still live, by a disposal request spawned on the
/// current runtime. Disposal is advisory cleanup; its failure is logged and
/// swallowed.
pub struct Cursor<T> {
    transport: Arc<dyn Transport>,
    database: DatabaseHandle,
    cancel: CancellationToken,
    state: CursorState,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Cursor<T> {
    /// Issue the opening request and stage its first batch.
    ///
    /// A failure here aborts the stream before any batch exists and
    /// propagates directly.
    pub(crate) async fn open(
        transport: Arc<dyn Transport>,
        database: DatabaseHandle,
        request: Request,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let response = transport.send(request, &cancel).await?;
        let envelope = Envelope::decode(&response.body)?;

        Ok(Self {
            transport,
            database,
            cancel,
            state: CursorState::Initial {
                batch: envelope.result,
                has_more: envelope.has_more,
                id: envelope.id,
            },
            _marker: PhantomData,
        })
    }

    /// Pull the next batch.
    ///
    /// Returns `None` once the sequence is complete. An `Err` item ends the
    /// sequence; batches yielded before it stay delivered.
    pub async fn next_batch(&mut self) -> Option<Result<Vec<T>>> {
        let (batch, has_more, id) = match std::mem::replace(&mut self.state, CursorState::Done) {
            CursorState::Done => return None,
            CursorState::Initial {
                batch,
                has_more,
                id,
            } => (batch, has_more, id),
            CursorState::Streaming { id } => {
                if self.cancel.is_cancelled() {
                    self.dispose(&id).await;
                    return Some(Err(ClientError::Cancelled));
                }

                let request = Request::new(
                    Method::Put,
                    api_path(
                        &self.database,
                        &format!("cursor/{}", urlencoding::encode(&id)),
                    ),
                )
                .with_transaction(self.database.transaction.clone());

                let envelope = match self.continuation(request).await {
                    Ok(envelope) => envelope,
                    Err(err) => {
                        // The id is still known; release the server side
                        // before surfacing the failure.
                        self.dispose(&id).await;
                        return Some(Err(err));
                    }
                };

                (envelope.result, envelope.has_more, Some(id))
            }
        };

        match (has_more, id) {
            (true, Some(id)) => self.state = CursorState::Streaming { id },
            (true, None) => {
                return Some(Err(ClientError::Protocol(
                    "server reported more batches without a cursor id".into(),
                )));
            }
            (false, Some(id)) => self.dispose(&id).await,
            (false, None) => {}
        }

        match serde_json::from_value(batch) {
            Ok(items) => Some(Ok(items)),
            Err(err) => {
                self.close().await;
                Some(Err(ClientError::Serialization(err)))
            }
        }
    }

    /// Adapt the cursor into a `futures::Stream` of batches.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<T>>> {
        futures::stream::unfold(self, |mut cursor| async move {
            cursor.next_batch().await.map(|batch| (batch, cursor))
        })
    }

    async fn continuation(&self, request: Request) -> Result<Envelope> {
        let response = self.transport.send(request, &self.cancel).await?;
        Envelope::decode(&response.body)
    }
}

impl<T> Cursor<T> {
    /// The live server-side cursor id, if one exists.
    pub fn id(&self) -> Option<&str> {
        match &self.state {
            CursorState::Initial { id, .. } => id.as_deref(),
            CursorState::Streaming { id } => Some(id),
            CursorState::Done => None,
        }
    }

    /// Stop iterating early and release a still-live server-side cursor.
    pub async fn close(&mut self) {
        match std::mem::replace(&mut self.state, CursorState::Done) {
            CursorState::Initial { id: Some(id), .. } => self.dispose(&id).await,
            CursorState::Streaming { id } => self.dispose(&id).await,
            _ => {}
        }
    }

    /// Best-effort cursor disposal. Failures never affect the stream's
    /// reported outcome.
    async fn dispose(&self, id: &str) {
        let request = Request::new(
            Method::Delete,
            api_path(
                &self.database,
                &format!("cursor/{}", urlencoding::encode(id)),
            ),
        )
        .with_transaction(self.database.transaction.clone());

        // Fresh token: disposal still goes out when the stream itself was
        // cancelled.
        if let Err(err) = self
            .transport
            .send(request, &CancellationToken::new())
            .await
        {
            warn!(cursor = id, error = %err, "cursor disposal failed");
        }
    }
}

impl<T> Drop for Cursor<T> {
    fn drop(&mut self) {
        let id = match std::mem::replace(&mut self.state, CursorState::Done) {
            CursorState::Initial { id: Some(id), .. } => id,
            CursorState::Streaming { id } => id,
            _ => return,
        };

        let transport = self.transport.clone();
        let path = api_path(
            &self.database,
            &format!("cursor/{}", urlencoding::encode(&id)),
        );
        let transaction = self.database.transaction.clone();

        // Without a runtime there is nowhere to run the disposal request.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let request = Request::new(Method::Delete, path).with_transaction(transaction);
                if let Err(err) = transport.send(request, &CancellationToken::new()).await {
                    warn!(cursor = %id, error = %err, "cursor disposal failed");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{response, MockTransport};
    use futures::StreamExt;
    use serde_json::json;

    fn initial_request() -> Request {
        Request::new(Method::Post, "db/testdb/cursor")
    }

    async fn open(mock: &Arc<MockTransport>, cancel: &CancellationToken) -> Result<Cursor<i64>> {
        let transport: Arc<dyn Transport> = mock.clone();
        Cursor::open(
            transport,
            DatabaseHandle::new("testdb"),
            initial_request(),
            cancel.clone(),
        )
        .await
    }

    #[tokio::test]
    async fn test_three_batches_then_one_disposal() {
        let mock = MockTransport::replying(vec![
            json!({"error": false, "code": 201, "result": [1, 2], "hasMore": true, "id": "c1"}),
            json!({"error": false, "code": 200, "result": [3], "hasMore": true, "id": "c1"}),
            json!({"error": false, "code": 200, "result": [4], "hasMore": false}),
            json!({"error": false, "code": 202}),
        ]);

        let mut cursor = open(&mock, &CancellationToken::new()).await.unwrap();
        assert_eq!(cursor.next_batch().await.unwrap().unwrap(), vec![1, 2]);
        assert_eq!(cursor.next_batch().await.unwrap().unwrap(), vec![3]);
        assert_eq!(cursor.next_batch().await.unwrap().unwrap(), vec![4]);
        assert!(cursor.next_batch().await.is_none());

        let sent = mock.sent();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[1].method, Method::Put);
        assert_eq!(sent[1].path, "db/testdb/cursor/c1");
        assert_eq!(sent[2].method, Method::Put);
        assert_eq!(sent[3].method, Method::Delete);
        assert_eq!(sent[3].path, "db/testdb/cursor/c1");
    }

    #[tokio::test]
    async fn test_single_batch_without_cursor_id() {
        let mock = MockTransport::replying(vec![
            json!({"error": false, "code": 201, "result": [7], "hasMore": false}),
        ]);

        let mut cursor = open(&mock, &CancellationToken::new()).await.unwrap();
        assert_eq!(cursor.next_batch().await.unwrap().unwrap(), vec![7]);
        assert!(cursor.next_batch().await.is_none());

        // No cursor was created server-side, so nothing to dispose.
        assert_eq!(mock.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_disposal_failure_is_swallowed() {
        let mock = MockTransport::new(vec![
            Ok(response(
                json!({"error": false, "code": 201, "result": [1], "hasMore": true, "id": "c1"}),
            )),
            Ok(response(
                json!({"error": false, "code": 200, "result": [2], "hasMore": false}),
            )),
            Err(ClientError::Protocol("cursor already gone".into())),
        ]);

        let mut cursor = open(&mock, &CancellationToken::new()).await.unwrap();
        assert_eq!(cursor.next_batch().await.unwrap().unwrap(), vec![1]);
        // The disposal failure must not taint the final batch.
        assert_eq!(cursor.next_batch().await.unwrap().unwrap(), vec![2]);
        assert!(cursor.next_batch().await.is_none());
        assert_eq!(mock.sent().len(), 3);
    }

    #[tokio::test]
    async fn test_initial_failure_propagates() {
        let mock = MockTransport::new(vec![Err(ClientError::Request {
            code: 404,
            error_num: 1203,
            message: "collection not found".into(),
        })]);

        let result = open(&mock, &CancellationToken::new()).await;
        assert!(matches!(result, Err(ClientError::Request { .. })));
    }

    #[tokio::test]
    async fn test_continuation_failure_after_delivered_batches() {
        let mock = MockTransport::new(vec![
            Ok(response(
                json!({"error": false, "code": 201, "result": [1], "hasMore": true, "id": "c1"}),
            )),
            Err(ClientError::Request {
                code: 500,
                error_num: 4,
                message: "server shutting down".into(),
            }),
            Ok(response(json!({"error": false, "code": 202}))),
        ]);

        let mut cursor = open(&mock, &CancellationToken::new()).await.unwrap();
        assert_eq!(cursor.next_batch().await.unwrap().unwrap(), vec![1]);

        let err = cursor.next_batch().await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::Request { .. }));
        assert!(cursor.next_batch().await.is_none());

        // The failed continuation still triggers a disposal for the known id.
        let sent = mock.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].method, Method::Delete);
        assert_eq!(sent[2].path, "db/testdb/cursor/c1");
    }

    #[tokio::test]
    async fn test_cancellation_aborts_and_disposes() {
        let mock = MockTransport::replying(vec![
            json!({"error": false, "code": 201, "result": [1], "hasMore": true, "id": "c1"}),
            json!({"error": false, "code": 202}),
        ]);

        let cancel = CancellationToken::new();
        let mut cursor = open(&mock, &cancel).await.unwrap();
        assert_eq!(cursor.next_batch().await.unwrap().unwrap(), vec![1]);

        cancel.cancel();
        let err = cursor.next_batch().await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert!(cursor.next_batch().await.is_none());

        let sent = mock.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].method, Method::Delete);
    }

    #[tokio::test]
    async fn test_close_disposes_live_cursor() {
        let mock = MockTransport::replying(vec![
            json!({"error": false, "code": 201, "result": [1], "hasMore": true, "id": "c1"}),
            json!({"error": false, "code": 202}),
        ]);

        let mut cursor = open(&mock, &CancellationToken::new()).await.unwrap();
        assert_eq!(cursor.id(), Some("c1"));

        cursor.close().await;
        assert_eq!(cursor.id(), None);
        assert!(cursor.next_batch().await.is_none());

        let sent = mock.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].method, Method::Delete);
        assert_eq!(sent[1].path, "db/testdb/cursor/c1");
    }

    #[tokio::test]
    async fn test_missing_cursor_id_with_more_batches() {
        let mock = MockTransport::replying(vec![
            json!({"error": false, "code": 201, "result": [1], "hasMore": true}),
        ]);

        let mut cursor = open(&mock, &CancellationToken::new()).await.unwrap();
        let err = cursor.next_batch().await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_into_stream_yields_all_batches() {
        let mock = MockTransport::replying(vec![
            json!({"error": false, "code": 201, "result": [1], "hasMore": true, "id": "c1"}),
            json!({"error": false, "code": 200, "result": [2, 3], "hasMore": false}),
            json!({"error": false, "code": 202}),
        ]);

        let cursor = open(&mock, &CancellationToken::new()).await.unwrap();
        let batches: Vec<_> = cursor.into_stream().collect().await;

        assert_eq!(batches.len(), 2);
        assert_eq!(*batches[0].as_ref().unwrap(), vec![1]);
        assert_eq!(*batches[1].as_ref().unwrap(), vec![2, 3]);
    }
}
