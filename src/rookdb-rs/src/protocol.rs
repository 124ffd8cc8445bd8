use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{ClientError, Result};

/// Uniform response envelope every RookDb reply is decoded through.
///
/// Cursor-bearing replies also carry `has_more` and the cursor `id`; for
/// everything else those fields stay at their defaults.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub code: u16,
    pub result: Value,
    pub has_more: bool,
    pub id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEnvelope {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    code: u16,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error_num: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
}

impl Envelope {
    /// Decode a raw response body.
    ///
    /// A body that does not parse as an envelope is a protocol violation;
    /// a parsed envelope with `error: true` becomes a request error carrying
    /// the server's diagnostic fields.
    pub fn decode(body: &[u8]) -> Result<Envelope> {
        let wire: WireEnvelope = serde_json::from_slice(body)
            .map_err(|err| ClientError::Protocol(format!("malformed response envelope: {err}")))?;

        if wire.error {
            return Err(ClientError::Request {
                code: wire.code,
                error_num: wire.error_num.unwrap_or_default(),
                message: wire.error_message.unwrap_or_default(),
            });
        }

        Ok(Envelope {
            code: wire.code,
            result: wire.result,
            has_more: wire.has_more,
            id: wire.id,
        })
    }

    /// Deserialize the result payload into a typed value.
    pub fn result_as<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.result).map_err(ClientError::Serialization)
    }
}
