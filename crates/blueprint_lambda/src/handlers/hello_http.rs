//! Minimal gateway-backed endpoint that echoes the normalized request
//! payload back in a greeting.

use blueprint_contracts::apigw::{
    normalize_proxy_event, success_response, validation_error_response, GatewayResponse,
};
use serde_json::{json, Value};

pub fn handle(event: Value) -> GatewayResponse {
    match normalize_proxy_event(event) {
        Ok(payload) => success_response(
            200,
            json!({
                "greeting": "Hello from Lambda",
                "payload": payload,
            }),
        ),
        Err(error) => validation_error_response(error.message()),
    }
}
