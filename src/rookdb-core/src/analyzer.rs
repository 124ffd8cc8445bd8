use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-side analyzer definition.
///
/// Properties are analyzer-type specific and passed through as opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub analyzer_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl AnalyzerDefinition {
    pub fn new(name: impl Into<String>, analyzer_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            analyzer_type: analyzer_type.into(),
            properties: None,
            features: Vec::new(),
        }
    }
}
