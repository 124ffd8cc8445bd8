use serde::{Deserialize, Serialize};

/// Identifies a logical database, optionally bound to a running transaction.
///
/// A handle is a plain value: build one per database (or per transaction)
/// and pass it to every operation. The driver reads it but never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseHandle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
}

impl DatabaseHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transaction: None,
        }
    }

    /// Bind a server-issued transaction id. Every request made with the
    /// returned handle carries the id.
    pub fn with_transaction(mut self, transaction: impl Into<String>) -> Self {
        self.transaction = Some(transaction.into());
        self
    }
}

impl From<&str> for DatabaseHandle {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DatabaseHandle {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
