use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::validation::ValidationError;

pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

pub fn request_method(event: &Value) -> Result<&str, ValidationError> {
    event
        .get("httpMethod")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("Request is missing httpMethod"))
}

pub fn request_headers(event: &Value) -> Option<&Map<String, Value>> {
    event.get("headers").and_then(Value::as_object)
}

pub fn query_parameters(event: &Value) -> Value {
    match event.get("queryStringParameters") {
        Some(Value::Object(params)) => Value::Object(params.clone()),
        _ => Value::Null,
    }
}

/// Unwraps the payload of a proxy integration event.
///
/// Proxy integrations deliver the request payload as a JSON string under
/// `body`; direct invocations carry no `body` wrapper and pass through
/// unchanged. A `null` body reads as an empty object.
pub fn normalize_proxy_event(event: Value) -> Result<Value, ValidationError> {
    let Some(object) = event.as_object() else {
        return Err(ValidationError::new("Request payload must be a JSON object"));
    };

    let Some(body) = object.get("body") else {
        return Ok(event);
    };

    match body {
        Value::Null => Ok(json!({})),
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) => serde_json::from_str(text)
            .map_err(|error| ValidationError::new(format!("Malformed JSON body: {error}"))),
        _ => Err(ValidationError::new("Request body must be a JSON object")),
    }
}

pub fn success_response(status_code: u16, payload: impl Serialize) -> GatewayResponse {
    GatewayResponse {
        status_code,
        headers: json!({"Content-Type": CONTENT_TYPE_JSON}),
        body: serde_json::to_string(&payload).expect("response payload should serialize"),
    }
}

pub fn error_response(status_code: u16, payload: Value) -> GatewayResponse {
    GatewayResponse {
        status_code,
        headers: json!({"Content-Type": CONTENT_TYPE_JSON}),
        body: payload.to_string(),
    }
}

/// Error response whose body is the bare message text, the framing the
/// data-plane endpoints use.
pub fn error_message_response(status_code: u16, message: &str) -> GatewayResponse {
    GatewayResponse {
        status_code,
        headers: json!({"Content-Type": CONTENT_TYPE_JSON}),
        body: message.to_string(),
    }
}

pub fn validation_error_response(message: &str) -> GatewayResponse {
    error_response(
        400,
        json!({
            "error": "validation_error",
            "message": message,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_proxy_event_passes_direct_invocations_through() {
        let event = json!({"operation": "ping"});
        let normalized = normalize_proxy_event(event.clone()).expect("event should normalize");
        assert_eq!(normalized, event);
    }

    #[test]
    fn normalize_proxy_event_reads_null_body_as_empty_object() {
        let normalized =
            normalize_proxy_event(json!({"body": null})).expect("event should normalize");
        assert_eq!(normalized, json!({}));
    }

    #[test]
    fn normalize_proxy_event_parses_string_bodies() {
        let normalized = normalize_proxy_event(json!({"body": "{\"name\":\"pixel\"}"}))
            .expect("event should normalize");
        assert_eq!(normalized, json!({"name": "pixel"}));
    }

    #[test]
    fn normalize_proxy_event_rejects_malformed_string_bodies() {
        let error = normalize_proxy_event(json!({"body": "{not json"}))
            .expect_err("event should be rejected");
        assert!(error.message().starts_with("Malformed JSON body"));
    }

    #[test]
    fn normalize_proxy_event_rejects_non_object_bodies() {
        let error =
            normalize_proxy_event(json!({"body": 42})).expect_err("event should be rejected");
        assert_eq!(error.message(), "Request body must be a JSON object");
    }

    #[test]
    fn responses_carry_json_content_type() {
        let response = success_response(200, json!({"ok": true}));
        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Content-Type"], CONTENT_TYPE_JSON);
        assert_eq!(response.body, "{\"ok\":true}");

        let response = validation_error_response("boom");
        assert_eq!(response.status_code, 400);
        let body: Value = serde_json::from_str(&response.body).expect("body should parse");
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "boom");
    }
}
