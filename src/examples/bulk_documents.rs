//! Bulk Document Round-Trip Example
//!
//! Creates a handful of documents in one call, patches them, and deletes
//! them again, inspecting the per-document result of every step.
//!
//! Run with: cargo run --example bulk_documents

use rookdb_rs::{
    CancellationToken, CreateOptions, DatabaseHandle, DeleteManyOptions, RookClient,
    UpdateOptions, UpdateResult,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
struct Reading {
    #[serde(rename = "_key")]
    key: String,
    sensor: String,
    value: f64,
}

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
    let documents = client.documents();

    // One bulk call, one result per document
    let readings: Vec<Reading> = (0..5)
        .map(|i| Reading {
            key: format!("reading-{i}"),
            sensor: "s1".to_string(),
            value: f64::from(i) * 0.5,
        })
        .collect();

    let created: Vec<UpdateResult> = documents
        .create_many(
            &database,
            "readings",
            &readings,
            CreateOptions {
                return_new: Some(true),
                ..Default::default()
            },
            &cancel,
        )
        .await?;

    for (reading, result) in readings.iter().zip(&created) {
        match result {
            UpdateResult::Ok(outcome) => {
                println!("✅ created {} (rev {:?})", reading.key, outcome.rev)
            }
            UpdateResult::Err(error) => {
                println!("❌ {} failed: {}", reading.key, error.error_message)
            }
        }
    }

    // Patch two of them; item-errors stay at the index of their document
    let patches = vec![
        json!({"_key": "reading-0", "value": 9.5}),
        json!({"_key": "reading-3", "value": 2.5}),
    ];
    let updated: Vec<UpdateResult> = documents
        .update_many(
            &database,
            "readings",
            &patches,
            UpdateOptions {
                return_old: Some(true),
                ..Default::default()
            },
            &cancel,
        )
        .await?;
    println!(
        "🔧 updated {} of {}",
        updated.iter().filter(|r| r.is_ok()).count(),
        updated.len()
    );

    // Delete by key stubs
    let keys: Vec<_> = readings
        .iter()
        .map(|reading| json!({"_key": reading.key}))
        .collect();
    let deleted: Vec<UpdateResult> = documents
        .delete_many(
            &database,
            "readings",
            &keys,
            DeleteManyOptions::default(),
            &cancel,
        )
        .await?;
    println!("🗑️  deleted {} documents", deleted.len());

    Ok(())
}
