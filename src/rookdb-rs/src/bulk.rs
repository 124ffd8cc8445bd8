use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use rookdb_core::{DatabaseHandle, UpdateResult};

use crate::client::api_path;
use crate::transport::{Method, Request};
use crate::{ClientError, Result};

/// Bulk document operation kinds and their HTTP verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BulkOperation {
    Create,
    Update,
    Replace,
    Delete,
}

impl BulkOperation {
    fn method(self) -> Method {
        match self {
            BulkOperation::Create => Method::Post,
            BulkOperation::Update => Method::Patch,
            BulkOperation::Replace => Method::Put,
            BulkOperation::Delete => Method::Delete,
        }
    }
}

/// Build the single HTTP request for a bulk document call.
///
/// The collection segment is always percent-encoded. An empty `docs` slice
/// is valid and produces an empty JSON array body.
pub(crate) fn build_bulk<T: Serialize>(
    operation: BulkOperation,
    database: &DatabaseHandle,
    collection: &str,
    docs: &[T],
    params: Vec<(&'static str, String)>,
) -> Result<Request> {
    let path = api_path(
        database,
        &format!("document/{}", urlencoding::encode(collection)),
    );
    let body = serde_json::to_vec(docs)?;

    Ok(Request::new(operation.method(), path)
        .with_query(params)
        .with_body(body)
        .with_transaction(database.transaction.clone()))
}

/// Map the server's ordered result array back onto the input ordering.
///
/// The array length must equal the input length; anything else is a protocol
/// violation, never a truncated result. Elements are classified one by one,
/// so item-errors stay at the index of the document that caused them.
pub(crate) fn match_results<R: DeserializeOwned>(
    result: Value,
    input_len: usize,
) -> Result<Vec<UpdateResult<R>>> {
    let elements = match result {
        Value::Array(elements) => elements,
        _ => return Err(ClientError::Protocol("bulk result is not an array".into())),
    };

    if elements.len() != input_len {
        return Err(ClientError::Protocol(format!(
            "bulk result length {} does not match input length {}",
            elements.len(),
            input_len
        )));
    }

    elements
        .into_iter()
        .map(|element| UpdateResult::from_element(element).map_err(ClientError::Serialization))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn database() -> DatabaseHandle {
        DatabaseHandle::new("testdb")
    }

    #[test]
    fn test_build_create_request() {
        let docs = vec![json!({"_key": "a"}), json!({"_key": "b"})];
        let request = build_bulk(
            BulkOperation::Create,
            &database(),
            "users",
            &docs,
            vec![("returnNew", "true".to_string())],
        )
        .unwrap();

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "db/testdb/document/users");
        assert_eq!(request.query, vec![("returnNew", "true".to_string())]);
        assert_eq!(request.body.unwrap(), serde_json::to_vec(&docs).unwrap());
    }

    #[test]
    fn test_verbs_per_operation() {
        for (operation, method) in [
            (BulkOperation::Create, Method::Post),
            (BulkOperation::Update, Method::Patch),
            (BulkOperation::Replace, Method::Put),
            (BulkOperation::Delete, Method::Delete),
        ] {
            let request =
                build_bulk::<Value>(operation, &database(), "users", &[], Vec::new()).unwrap();
            assert_eq!(request.method, method);
        }
    }

    #[test]
    fn test_collection_segment_is_encoded() {
        let request =
            build_bulk::<Value>(BulkOperation::Update, &database(), "my coll", &[], Vec::new())
                .unwrap();
        assert_eq!(request.path, "db/testdb/document/my%20coll");
    }

    #[test]
    fn test_empty_docs_serialize_empty_array() {
        let request =
            build_bulk::<Value>(BulkOperation::Create, &database(), "users", &[], Vec::new())
                .unwrap();
        assert_eq!(request.body.unwrap(), b"[]");
    }

    #[test]
    fn test_transaction_is_forwarded() {
        let database = DatabaseHandle::new("testdb").with_transaction("trx-1");
        let request =
            build_bulk::<Value>(BulkOperation::Delete, &database, "users", &[], Vec::new())
                .unwrap();
        assert_eq!(request.transaction.as_deref(), Some("trx-1"));
    }

    #[test]
    fn test_match_results_preserves_positions() {
        let result = json!([
            {"_key": "a", "_rev": "1"},
            {"_key": "b", "_rev": "1"},
            {"error": true, "errorNum": 1210, "errorMessage": "unique constraint violated"},
            {"_key": "d", "_rev": "1"}
        ]);

        let results: Vec<UpdateResult> = match_results(result, 4).unwrap();

        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert_eq!(results[2].error().unwrap().error_num, 1210);
        assert!(results[3].is_ok());
        assert_eq!(results[3].outcome().unwrap().key.as_deref(), Some("d"));
    }

    #[test]
    fn test_match_results_empty() {
        let results: Vec<UpdateResult> = match_results(json!([]), 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_match_results_length_mismatch() {
        let err = match_results::<Value>(json!([{"_key": "a"}]), 2).unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[test]
    fn test_match_results_rejects_non_array() {
        let err = match_results::<Value>(json!({"_key": "a"}), 1).unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }
}
