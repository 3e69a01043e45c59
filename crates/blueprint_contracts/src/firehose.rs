use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Delivery-stream transform batch. `data` fields are base64 on both sides
/// of the contract.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformEvent {
    #[serde(rename = "invocationId", default)]
    pub invocation_id: String,
    pub records: Vec<TransformRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformRecord {
    #[serde(rename = "recordId")]
    pub record_id: String,
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordResult {
    Ok,
    Dropped,
    ProcessingFailed,
}

impl RecordResult {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordResult::Ok => "Ok",
            RecordResult::Dropped => "Dropped",
            RecordResult::ProcessingFailed => "ProcessingFailed",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransformedRecord {
    #[serde(rename = "recordId")]
    pub record_id: String,
    pub result: RecordResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl TransformedRecord {
    pub fn ok(record_id: impl Into<String>, payload: &[u8]) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::Ok,
            data: Some(BASE64.encode(payload)),
        }
    }

    /// Marks the record failed while leaving its payload intact, so the
    /// delivery stream can park the original bytes in its error output.
    pub fn failed_keeping_original(
        record_id: impl Into<String>,
        original_data: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::ProcessingFailed,
            data: Some(original_data.into()),
        }
    }

    pub fn failed(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::ProcessingFailed,
            data: None,
        }
    }

    pub fn dropped(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::Dropped,
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransformResponse {
    pub records: Vec<TransformedRecord>,
}

pub fn decode_record_data(record: &TransformRecord) -> Result<Vec<u8>, ValidationError> {
    BASE64.decode(&record.data).map_err(|error| {
        ValidationError::new(format!(
            "Record {} does not carry valid base64 data: {error}",
            record.record_id
        ))
    })
}
