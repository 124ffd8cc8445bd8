use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one document within a bulk operation.
///
/// Bulk endpoints answer with one element per input document, in input
/// order. An element either carries the written document's metadata or an
/// error scoped to that single document. A bulk response never shortens or
/// reorders the sequence, so callers can zip results with their input.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateResult<T = Value> {
    Ok(UpdateOutcome<T>),
    Err(ItemError),
}

/// Metadata of a successfully written document.
///
/// All fields are optional on the wire: `silent` mode strips them down to
/// an empty object, and the echoed `new`/`old` bodies only appear when the
/// matching return flag was set on the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct UpdateOutcome<T = Value> {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(rename = "_oldRev", default, skip_serializing_if = "Option::is_none")]
    pub old_rev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<T>,
}

/// A failed element inside an otherwise successful bulk response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    pub error_num: i64,
    pub error_message: String,
}

impl<T: DeserializeOwned> UpdateResult<T> {
    /// Classify one result element by its `error` discriminant.
    ///
    /// Classification looks at the element alone, never at its siblings.
    pub fn from_element(element: Value) -> Result<Self, serde_json::Error> {
        let failed = element
            .get("error")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if failed {
            Ok(UpdateResult::Err(serde_json::from_value(element)?))
        } else {
            Ok(UpdateResult::Ok(serde_json::from_value(element)?))
        }
    }
}

impl<T> UpdateResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, UpdateResult::Ok(_))
    }

    pub fn outcome(&self) -> Option<&UpdateOutcome<T>> {
        match self {
            UpdateResult::Ok(outcome) => Some(outcome),
            UpdateResult::Err(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ItemError> {
        match self {
            UpdateResult::Ok(_) => None,
            UpdateResult::Err(error) => Some(error),
        }
    }

    pub fn into_outcome(self) -> Option<UpdateOutcome<T>> {
        match self {
            UpdateResult::Ok(outcome) => Some(outcome),
            UpdateResult::Err(_) => None,
        }
    }
}
