//! Export Streaming Example
//!
//! Streams a whole collection batch by batch through a server-side cursor,
//! then runs a query cursor over the same data. The cursor is released
//! automatically once the last batch arrives.
//!
//! Run with: cargo run --example export_stream

use rookdb_rs::{
    CancellationToken, DatabaseHandle, ExportOptions, QueryRequest, RookClient,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rookdb_rs=debug")),
        )
        .init();

    let client = RookClient::new("http://localhost:8529")?;
    let database = DatabaseHandle::new("telemetry");
    let cancel = CancellationToken::new();

    // Export pulls batches only as fast as this loop consumes them
    let mut cursor = client
        .documents()
        .export::<Value>(
            &database,
            "readings",
            ExportOptions {
                batch_size: Some(1000),
                ..Default::default()
            },
            &cancel,
        )
        .await?;

    let mut total = 0usize;
    let mut batches = 0usize;
    while let Some(batch) = cursor.next_batch().await {
        let batch = batch?;
        total += batch.len();
        batches += 1;
        println!("📦 batch {batches}: {} documents", batch.len());
    }
    println!("✅ exported {total} documents in {batches} batches");

    // Query cursors stream the same way
    let rows: Vec<Value> = client
        .query()
        .all(
            &database,
            QueryRequest::new("FOR r IN readings FILTER r.value > @min RETURN r")
                .bind("min", 1.0)
                .batch_size(500),
            &cancel,
        )
        .await?;
    println!("🔍 query matched {} documents", rows.len());

    Ok(())
}
