use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::validation::ValidationError;

/// Identity of the running function, stamped onto collected events so the
/// collector can attribute them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationMetadata {
    pub request_id: String,
    pub function_name: String,
}

/// Batches log events into newline-free HEC envelopes and renders them as a
/// single request body. Envelopes are JSON objects concatenated back to
/// back, which is the framing the collector endpoint accepts.
#[derive(Debug, Default)]
pub struct CollectorBatch {
    payloads: Vec<String>,
}

impl CollectorBatch {
    pub fn new() -> Self {
        CollectorBatch::default()
    }

    /// Collects a message stamped with the current time.
    pub fn log(
        &mut self,
        message: &Value,
        metadata: Option<&InvocationMetadata>,
    ) -> Result<(), ValidationError> {
        self.log_with_time(Utc::now().timestamp_millis(), message, metadata)
    }

    /// Collects a message with an explicit event time in epoch milliseconds.
    /// Object messages are enriched with the invocation's request id; other
    /// scalar messages are forwarded as-is. Arrays are rejected.
    pub fn log_with_time(
        &mut self,
        time_millis: i64,
        message: &Value,
        metadata: Option<&InvocationMetadata>,
    ) -> Result<(), ValidationError> {
        if message.is_array() {
            return Err(ValidationError::new(
                "Log message must be a string or a JSON object",
            ));
        }

        let mut event = message.clone();
        let mut payload = Map::new();
        if let Some(metadata) = metadata {
            if let Some(fields) = event.as_object_mut() {
                fields.insert("awsRequestId".to_string(), json!(metadata.request_id));
            }
            payload.insert(
                "source".to_string(),
                json!(format!("lambda:{}", metadata.function_name)),
            );
        }
        payload.insert("event".to_string(), event);
        payload.insert("time".to_string(), json!(time_millis as f64 / 1000.0));

        self.log_event(&Value::Object(payload));
        Ok(())
    }

    /// Collects a pre-built envelope without stamping any metadata.
    pub fn log_event(&mut self, payload: &Value) {
        self.payloads.push(payload.to_string());
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Renders the batched envelopes as one request body and clears the
    /// batch, whether or not the caller's send succeeds afterwards.
    pub fn flush_body(&mut self) -> String {
        let body = self.payloads.join("");
        self.payloads.clear();
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> InvocationMetadata {
        InvocationMetadata {
            request_id: "req-42".to_string(),
            function_name: "shipper".to_string(),
        }
    }

    fn parse_payload(body: &str) -> Value {
        serde_json::from_str(body).expect("payload should be valid JSON")
    }

    #[test]
    fn scalar_messages_are_forwarded_untouched() {
        let mut batch = CollectorBatch::new();
        batch
            .log_with_time(1_462_436_289_000, &json!("límite reached"), None)
            .expect("message should collect");

        let payload = parse_payload(&batch.flush_body());
        assert_eq!(payload, json!({"event": "límite reached", "time": 1_462_436_289.0}));
    }

    #[test]
    fn object_messages_are_enriched_with_invocation_metadata() {
        let metadata = sample_metadata();
        let mut batch = CollectorBatch::new();
        batch
            .log_with_time(1_462_436_289_500, &json!({"state": "open"}), Some(&metadata))
            .expect("message should collect");

        let payload = parse_payload(&batch.flush_body());
        assert_eq!(
            payload,
            json!({
                "event": {"state": "open", "awsRequestId": "req-42"},
                "source": "lambda:shipper",
                "time": 1_462_436_289.5,
            })
        );
    }

    #[test]
    fn scalar_messages_still_carry_the_source() {
        let metadata = sample_metadata();
        let mut batch = CollectorBatch::new();
        batch
            .log_with_time(1_000, &json!("plain"), Some(&metadata))
            .expect("message should collect");

        let payload = parse_payload(&batch.flush_body());
        assert_eq!(payload["event"], "plain");
        assert_eq!(payload["source"], "lambda:shipper");
    }

    #[test]
    fn array_messages_are_rejected() {
        let mut batch = CollectorBatch::new();
        let error = batch
            .log_with_time(1_000, &json!([1, 2, 3]), None)
            .expect_err("arrays should be rejected");
        assert_eq!(error.message(), "Log message must be a string or a JSON object");
        assert!(batch.is_empty());
    }

    #[test]
    fn flush_joins_envelopes_and_clears_the_batch() {
        let mut batch = CollectorBatch::new();
        batch
            .log_with_time(1_000, &json!("first"), None)
            .expect("message should collect");
        batch
            .log_with_time(2_000, &json!("second"), None)
            .expect("message should collect");
        assert_eq!(batch.len(), 2);

        let body = batch.flush_body();
        assert_eq!(body, r#"{"event":"first","time":1.0}{"event":"second","time":2.0}"#);
        assert!(batch.is_empty());
        assert_eq!(batch.flush_body(), "");
    }

    #[test]
    fn prebuilt_envelopes_bypass_metadata_stamping() {
        let mut batch = CollectorBatch::new();
        batch.log_event(&json!({"time": 3.0, "host": "elb", "event": "raw line"}));
        assert_eq!(batch.len(), 1);

        let payload = parse_payload(&batch.flush_body());
        assert_eq!(payload["host"], "elb");
    }
}
