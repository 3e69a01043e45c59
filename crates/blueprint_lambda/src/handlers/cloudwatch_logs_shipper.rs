//! Ships log-subscription events to an HTTP event collector.

use blueprint_contracts::collector::{CollectorBatch, InvocationMetadata};
use blueprint_contracts::logs::{decode_subscription_payload, subscription_data};
use serde_json::{json, Value};

use crate::adapters::event_sink::EventSink;

/// Control messages are acknowledged without shipping anything. Data
/// messages collect every log event under its original timestamp and flush
/// once; the result is the shipped-event count.
pub fn handle(
    event: &Value,
    metadata: &InvocationMetadata,
    sink: &dyn EventSink,
) -> Result<Value, String> {
    let data = subscription_data(event).map_err(|error| error.message().to_string())?;
    let payload = decode_subscription_payload(data).map_err(|error| error.message().to_string())?;

    if payload.is_control_message() {
        return Ok(json!("Control message handled successfully"));
    }

    let mut batch = CollectorBatch::new();
    for log_event in &payload.log_events {
        batch
            .log_with_time(log_event.timestamp, &json!(log_event.message), Some(metadata))
            .map_err(|error| error.message().to_string())?;
    }
    let count = batch.len();
    sink.send(&batch.flush_body())?;
    Ok(json!(count))
}
