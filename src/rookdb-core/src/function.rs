use serde::{Deserialize, Serialize};

/// Server-side function definition.
///
/// Function names are namespaced with `::` separators; management calls can
/// address a whole namespace at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deterministic: Option<bool>,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            is_deterministic: None,
        }
    }

    pub fn deterministic(mut self, is_deterministic: bool) -> Self {
        self.is_deterministic = Some(is_deterministic);
        self
    }
}
