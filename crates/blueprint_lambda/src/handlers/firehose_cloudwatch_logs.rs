//! Delivery-stream transform for log-subscription payloads.
//!
//! Each record holds a base64 gzip envelope. Control messages are dropped,
//! data messages are flattened to their newline-terminated event messages,
//! and anything that does not decode fails without a payload.

use blueprint_contracts::firehose::{
    decode_record_data, TransformEvent, TransformRecord, TransformResponse, TransformedRecord,
};
use blueprint_contracts::logs::{gunzip, LogSubscriptionPayload};

pub fn handle(event: TransformEvent) -> TransformResponse {
    let records = event.records.into_iter().map(transform_record).collect();
    TransformResponse { records }
}

fn transform_record(record: TransformRecord) -> TransformedRecord {
    let Ok(bytes) = decode_record_data(&record) else {
        return TransformedRecord::failed(record.record_id);
    };
    let Ok(decompressed) = gunzip(&bytes) else {
        return TransformedRecord::failed(record.record_id);
    };
    let Ok(payload) = serde_json::from_slice::<LogSubscriptionPayload>(&decompressed) else {
        return TransformedRecord::failed(record.record_id);
    };

    if payload.is_control_message() {
        return TransformedRecord::dropped(record.record_id);
    }
    if !payload.is_data_message() {
        return TransformedRecord::failed(record.record_id);
    }

    let mut joined = String::new();
    for log_event in &payload.log_events {
        joined.push_str(&log_event.message);
        joined.push('\n');
    }
    TransformedRecord::ok(record.record_id, joined.as_bytes())
}
