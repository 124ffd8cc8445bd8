//! RookDb Client Library
//!
//! Typed async HTTP client for RookDb servers: document CRUD, bulk
//! operations with per-document results, cursor-based result streaming,
//! and analyzer / function management.

mod analyzers;
mod bulk;
mod client;
mod cursor;
mod documents;
mod functions;
mod protocol;
mod query;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use analyzers::AnalyzerClient;
pub use client::{ClientConfig, RookClient};
pub use cursor::Cursor;
pub use documents::DocumentClient;
pub use functions::FunctionClient;
pub use protocol::Envelope;
pub use query::QueryClient;
pub use transport::{HttpTransport, Method, Request, Response, Transport};

pub use rookdb_core::{
    AnalyzerDefinition, CreateOptions, DatabaseHandle, DeleteManyOptions, DeleteOptions,
    ExportOptions, FunctionDefinition, ItemError, OverwriteMode, QueryRequest, ReplaceOptions,
    UpdateOptions, UpdateOutcome, UpdateResult,
};
pub use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("server error {code} (errorNum {error_num}): {message}")]
    Request {
        code: u16,
        error_num: i64,
        message: String,
    },

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ClientError>;
