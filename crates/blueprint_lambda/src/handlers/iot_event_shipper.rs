//! Forwards inbound device messages to an HTTP event collector.

use blueprint_contracts::collector::{CollectorBatch, InvocationMetadata};
use serde_json::Value;

use crate::adapters::event_sink::EventSink;

/// Ships the whole device message as one collector event, stamped with the
/// invocation metadata, and returns the message unchanged.
pub fn handle(
    event: &Value,
    metadata: &InvocationMetadata,
    sink: &dyn EventSink,
) -> Result<Value, String> {
    let mut batch = CollectorBatch::new();
    batch
        .log(event, Some(metadata))
        .map_err(|error| error.message().to_string())?;
    sink.send(&batch.flush_body())?;
    Ok(event.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    struct RecordingSink {
        bodies: Mutex<Vec<String>>,
        response: Result<(), String>,
    }

    impl RecordingSink {
        fn new() -> RecordingSink {
            RecordingSink {
                bodies: Mutex::new(Vec::new()),
                response: Ok(()),
            }
        }

        fn failing(message: &str) -> RecordingSink {
            RecordingSink {
                bodies: Mutex::new(Vec::new()),
                response: Err(message.to_string()),
            }
        }
    }

    impl EventSink for RecordingSink {
        fn send(&self, body: &str) -> Result<(), String> {
            self.bodies
                .lock()
                .expect("poisoned mutex")
                .push(body.to_string());
            self.response.clone()
        }
    }

    fn sample_metadata() -> InvocationMetadata {
        InvocationMetadata {
            request_id: "req-7".to_string(),
            function_name: "iot-shipper".to_string(),
        }
    }

    #[test]
    fn device_messages_are_shipped_and_echoed_back() {
        let sink = RecordingSink::new();
        let event = json!({"deviceId": "sensor-3", "temperature": 21.5});

        let result = handle(&event, &sample_metadata(), &sink).expect("shipping should succeed");
        assert_eq!(result, event);

        let bodies = sink.bodies.lock().expect("poisoned mutex");
        assert_eq!(bodies.len(), 1);
        let payload: Value = serde_json::from_str(&bodies[0]).expect("body should be JSON");
        assert_eq!(payload["event"]["deviceId"], "sensor-3");
        assert_eq!(payload["event"]["awsRequestId"], "req-7");
        assert_eq!(payload["source"], "lambda:iot-shipper");
        assert!(payload["time"].is_number());
    }

    #[test]
    fn sink_errors_propagate() {
        let sink = RecordingSink::failing("error: statusCode=403\n\ninvalid token");
        let event = json!({"deviceId": "sensor-3"});

        let error = handle(&event, &sample_metadata(), &sink).expect_err("shipping should fail");
        assert!(error.starts_with("error: statusCode=403"));
    }
}
