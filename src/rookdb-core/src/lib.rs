//! RookDb Protocol Types
//!
//! This crate provides the shared data model for the RookDb driver, including:
//! - Database handles with transaction attachment
//! - Per-document results for bulk operations
//! - Operation option sets and their query-parameter forms
//! - Analyzer and function definitions

pub mod analyzer;
pub mod document;
pub mod function;
pub mod handle;
pub mod options;

// Re-export commonly used types
pub use analyzer::AnalyzerDefinition;
pub use document::{ItemError, UpdateOutcome, UpdateResult};
pub use function::FunctionDefinition;
pub use handle::DatabaseHandle;
pub use options::{
    CreateOptions, DeleteManyOptions, DeleteOptions, ExportOptions, OverwriteMode, QueryRequest,
    ReplaceOptions, UpdateOptions,
};
