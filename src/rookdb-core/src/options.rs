use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// How a create behaves when the target key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwriteMode {
    Ignore,
    Replace,
    Update,
    Conflict,
}

impl OverwriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverwriteMode::Ignore => "ignore",
            OverwriteMode::Replace => "replace",
            OverwriteMode::Update => "update",
            OverwriteMode::Conflict => "conflict",
        }
    }
}

fn push_flag(params: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<bool>) {
    if let Some(value) = value {
        params.push((name, value.to_string()));
    }
}

/// Options for document creates.
///
/// Every present field becomes exactly one query parameter; absent fields
/// are never sent. Parameters are emitted in declared field order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub wait_for_sync: Option<bool>,
    pub keep_null: Option<bool>,
    pub merge_objects: Option<bool>,
    pub return_old: Option<bool>,
    pub return_new: Option<bool>,
    pub silent: Option<bool>,
    pub overwrite_mode: Option<OverwriteMode>,
}

impl CreateOptions {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_flag(&mut params, "waitForSync", self.wait_for_sync);
        push_flag(&mut params, "keepNull", self.keep_null);
        push_flag(&mut params, "mergeObjects", self.merge_objects);
        push_flag(&mut params, "returnOld", self.return_old);
        push_flag(&mut params, "returnNew", self.return_new);
        push_flag(&mut params, "silent", self.silent);
        if let Some(mode) = self.overwrite_mode {
            params.push(("overwriteMode", mode.as_str().to_string()));
        }
        params
    }
}

/// Options for document updates (partial patches).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub wait_for_sync: Option<bool>,
    pub keep_null: Option<bool>,
    pub merge_objects: Option<bool>,
    pub return_old: Option<bool>,
    pub return_new: Option<bool>,
    pub silent: Option<bool>,
}

impl UpdateOptions {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_flag(&mut params, "waitForSync", self.wait_for_sync);
        push_flag(&mut params, "keepNull", self.keep_null);
        push_flag(&mut params, "mergeObjects", self.merge_objects);
        push_flag(&mut params, "returnOld", self.return_old);
        push_flag(&mut params, "returnNew", self.return_new);
        push_flag(&mut params, "silent", self.silent);
        params
    }
}

/// Options for document replaces. Replaces swap the whole body, so the
/// patch-only flags (keep-null, merge-objects) do not apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    pub wait_for_sync: Option<bool>,
    pub return_old: Option<bool>,
    pub return_new: Option<bool>,
}

impl ReplaceOptions {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_flag(&mut params, "waitForSync", self.wait_for_sync);
        push_flag(&mut params, "returnOld", self.return_old);
        push_flag(&mut params, "returnNew", self.return_new);
        params
    }
}

/// Options for deleting a single document by key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub wait_for_sync: Option<bool>,
    pub return_old: Option<bool>,
    pub silent: Option<bool>,
}

impl DeleteOptions {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_flag(&mut params, "waitForSync", self.wait_for_sync);
        push_flag(&mut params, "returnOld", self.return_old);
        push_flag(&mut params, "silent", self.silent);
        params
    }
}

/// Options for bulk deletes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteManyOptions {
    pub wait_for_sync: Option<bool>,
    pub return_old: Option<bool>,
}

impl DeleteManyOptions {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_flag(&mut params, "waitForSync", self.wait_for_sync);
        push_flag(&mut params, "returnOld", self.return_old);
        params
    }
}

/// Batch configuration carried in the body of the initial export request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_wait: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// Body of the initial request that opens a query cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_vars: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            bind_vars: None,
            batch_size: None,
            ttl: None,
        }
    }

    /// Bind one variable referenced by the query string.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind_vars
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }
}
