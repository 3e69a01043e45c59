//! Harness for exercising another function with unit or load tests.
//!
//! A unit test invokes the target synchronously, records the raw response
//! and a pass verdict in the results table, keyed by test id and iteration.
//! A load test fires the target asynchronously once per iteration with the
//! iteration number patched into the payload.

use serde_json::{json, Value};

use crate::adapters::function_invoker::FunctionInvoker;
use crate::adapters::result_store::{ResultStore, TestResult};

pub fn handle(
    event: &Value,
    invoker: &dyn FunctionInvoker,
    results: &dyn ResultStore,
) -> Result<Value, String> {
    let operation = event.get("operation").and_then(Value::as_str).unwrap_or("");
    match operation {
        "unit" => unit(event, invoker, results),
        "load" => load(event, invoker),
        other => Err(format!("Unrecognized operation \"{other}\"")),
    }
}

/// A response carrying an `errorMessage` field counts as a failure.
fn unit(
    event: &Value,
    invoker: &dyn FunctionInvoker,
    results: &dyn ResultStore,
) -> Result<Value, String> {
    let function = required_str(event, "function", "Test event does not name a function")?;
    let table = required_str(event, "resultsTable", "Test event does not name a results table")?;
    let payload = event.get("event").cloned().unwrap_or(Value::Null);

    let response = invoker.invoke_sync(function, payload.to_string().as_bytes())?;
    let result = String::from_utf8_lossy(&response).into_owned();
    let parsed: Value = serde_json::from_str(&result)
        .map_err(|error| format!("Test result is not valid JSON: {error}"))?;

    let test_result = TestResult {
        test_id: event
            .get("testId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        iteration: event.get("iteration").and_then(Value::as_i64).unwrap_or(0),
        result,
        passed: parsed.get("errorMessage").is_none(),
    };
    results.record(table, &test_result)?;

    Ok(json!("Test complete"))
}

fn load(event: &Value, invoker: &dyn FunctionInvoker) -> Result<Value, String> {
    let function = required_str(event, "function", "Test event does not name a function")?;
    let iterations = event.get("iterations").and_then(Value::as_i64).unwrap_or(0);

    let mut payload = event.get("event").cloned().unwrap_or_else(|| json!({}));
    for iteration in 0..iterations {
        if let Some(fields) = payload.as_object_mut() {
            fields.insert("iteration".to_string(), json!(iteration));
        }
        invoker.invoke_async(function, payload.to_string().as_bytes())?;
    }

    Ok(json!("Load test complete"))
}

fn required_str<'a>(event: &'a Value, field: &str, missing: &str) -> Result<&'a str, String> {
    event
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| missing.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FixedTarget {
        sync_response: Result<Vec<u8>, String>,
        sync_calls: Mutex<Vec<(String, Value)>>,
        async_calls: Mutex<Vec<(String, Value)>>,
    }

    impl FixedTarget {
        fn responding(sync_response: Result<Vec<u8>, String>) -> FixedTarget {
            FixedTarget {
                sync_response,
                sync_calls: Mutex::new(Vec::new()),
                async_calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl FunctionInvoker for FixedTarget {
        fn invoke_async(&self, function_name: &str, payload: &[u8]) -> Result<(), String> {
            let parsed = serde_json::from_slice(payload).expect("payload should be JSON");
            self.async_calls
                .lock()
                .expect("poisoned mutex")
                .push((function_name.to_string(), parsed));
            Ok(())
        }

        fn invoke_sync(&self, function_name: &str, payload: &[u8]) -> Result<Vec<u8>, String> {
            let parsed = serde_json::from_slice(payload).expect("payload should be JSON");
            self.sync_calls
                .lock()
                .expect("poisoned mutex")
                .push((function_name.to_string(), parsed));
            self.sync_response.clone()
        }
    }

    struct RecordingResults {
        records: Mutex<Vec<(String, TestResult)>>,
    }

    impl RecordingResults {
        fn new() -> RecordingResults {
            RecordingResults {
                records: Mutex::new(Vec::new()),
            }
        }
    }

    impl ResultStore for RecordingResults {
        fn record(&self, table_name: &str, result: &TestResult) -> Result<(), String> {
            self.records
                .lock()
                .expect("poisoned mutex")
                .push((table_name.to_string(), result.clone()));
            Ok(())
        }
    }

    fn unit_event() -> Value {
        json!({
            "operation": "unit",
            "function": "target-fn",
            "resultsTable": "test-results",
            "testId": "smoke-1",
            "event": {"input": 1},
        })
    }

    #[test]
    fn unit_tests_record_a_passing_result() {
        let target = FixedTarget::responding(Ok(b"{\"output\":2}".to_vec()));
        let results = RecordingResults::new();

        let outcome = handle(&unit_event(), &target, &results).expect("test should run");

        assert_eq!(outcome, json!("Test complete"));
        let sync_calls = target.sync_calls.lock().expect("poisoned mutex");
        assert_eq!(sync_calls.as_slice(), [("target-fn".to_string(), json!({"input": 1}))]);

        let records = results.records.lock().expect("poisoned mutex");
        assert_eq!(
            records.as_slice(),
            [(
                "test-results".to_string(),
                TestResult {
                    test_id: "smoke-1".to_string(),
                    iteration: 0,
                    result: "{\"output\":2}".to_string(),
                    passed: true,
                }
            )]
        );
    }

    #[test]
    fn unit_tests_mark_error_responses_as_failed() {
        let target = FixedTarget::responding(Ok(b"{\"errorMessage\":\"boom\"}".to_vec()));
        let results = RecordingResults::new();

        handle(&unit_event(), &target, &results).expect("test should run");

        let records = results.records.lock().expect("poisoned mutex");
        assert!(!records[0].1.passed);
        assert_eq!(records[0].1.result, "{\"errorMessage\":\"boom\"}");
    }

    #[test]
    fn unit_tests_reject_non_json_responses() {
        let target = FixedTarget::responding(Ok(b"not json".to_vec()));
        let results = RecordingResults::new();

        let error = handle(&unit_event(), &target, &results).expect_err("test should fail");
        assert!(error.starts_with("Test result is not valid JSON: "));
        assert!(results.records.lock().expect("poisoned mutex").is_empty());
    }

    #[test]
    fn load_tests_patch_the_iteration_into_each_payload() {
        let target = FixedTarget::responding(Ok(Vec::new()));
        let results = RecordingResults::new();

        let event = json!({
            "operation": "load",
            "function": "target-fn",
            "iterations": 3,
            "event": {"input": 1},
        });
        let outcome = handle(&event, &target, &results).expect("test should run");

        assert_eq!(outcome, json!("Load test complete"));
        let async_calls = target.async_calls.lock().expect("poisoned mutex");
        assert_eq!(async_calls.len(), 3);
        for (iteration, (function, payload)) in async_calls.iter().enumerate() {
            assert_eq!(function, "target-fn");
            assert_eq!(payload["input"], 1);
            assert_eq!(payload["iteration"], iteration as i64);
        }
    }

    #[test]
    fn unknown_operations_are_rejected() {
        let target = FixedTarget::responding(Ok(Vec::new()));
        let results = RecordingResults::new();

        let error = handle(&json!({"operation": "warm"}), &target, &results)
            .expect_err("operation should be rejected");
        assert_eq!(error, "Unrecognized operation \"warm\"");
    }

    #[test]
    fn unit_tests_require_the_target_and_table() {
        let target = FixedTarget::responding(Ok(Vec::new()));
        let results = RecordingResults::new();

        let error = handle(&json!({"operation": "unit"}), &target, &results)
            .expect_err("event should fail");
        assert_eq!(error, "Test event does not name a function");

        let error = handle(
            &json!({"operation": "unit", "function": "target-fn"}),
            &target,
            &results,
        )
        .expect_err("event should fail");
        assert_eq!(error, "Test event does not name a results table");
    }
}
