use std::io::Read;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flate2::read::{GzDecoder, ZlibDecoder};
use serde::Deserialize;
use serde_json::Value;

use crate::validation::ValidationError;

pub const DATA_MESSAGE: &str = "DATA_MESSAGE";
pub const CONTROL_MESSAGE: &str = "CONTROL_MESSAGE";

/// Payload a log subscription delivers: base64 on the wire, gzip inside,
/// JSON at the bottom.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSubscriptionPayload {
    #[serde(rename = "messageType")]
    pub message_type: String,
    #[serde(default)]
    pub owner: String,
    #[serde(rename = "logGroup", default)]
    pub log_group: String,
    #[serde(rename = "logStream", default)]
    pub log_stream: String,
    #[serde(rename = "subscriptionFilters", default)]
    pub subscription_filters: Vec<String>,
    #[serde(rename = "logEvents", default)]
    pub log_events: Vec<LogEvent>,
}

impl LogSubscriptionPayload {
    pub fn is_data_message(&self) -> bool {
        self.message_type == DATA_MESSAGE
    }

    pub fn is_control_message(&self) -> bool {
        self.message_type == CONTROL_MESSAGE
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogEvent {
    pub id: String,
    pub timestamp: i64,
    pub message: String,
}

/// Reads the `awslogs.data` envelope a log subscription wraps around its
/// payload when it targets a function directly.
pub fn subscription_data(event: &Value) -> Result<&str, ValidationError> {
    event
        .get("awslogs")
        .and_then(|awslogs| awslogs.get("data"))
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("Event does not carry awslogs.data"))
}

pub fn decode_subscription_payload(data: &str) -> Result<LogSubscriptionPayload, ValidationError> {
    let compressed = BASE64
        .decode(data)
        .map_err(|error| ValidationError::new(format!("Payload is not valid base64: {error}")))?;
    let decompressed = gunzip(&compressed)?;
    serde_json::from_slice(&decompressed).map_err(|error| {
        ValidationError::new(format!("Payload is not a log subscription message: {error}"))
    })
}

pub fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, ValidationError> {
    let mut decompressed = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut decompressed)
        .map_err(|error| ValidationError::new(format!("Payload is not valid gzip: {error}")))?;
    Ok(decompressed)
}

/// Decompresses a payload that may be either gzip or raw zlib, the way the
/// analytics preprocessors accept both framings.
pub fn inflate(bytes: &[u8]) -> Result<Vec<u8>, ValidationError> {
    let mut decompressed = Vec::new();
    if GzDecoder::new(bytes).read_to_end(&mut decompressed).is_ok() {
        return Ok(decompressed);
    }

    decompressed.clear();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut decompressed)
        .map_err(|error| {
            ValidationError::new(format!("Payload is neither gzip nor zlib compressed: {error}"))
        })?;
    Ok(decompressed)
}
