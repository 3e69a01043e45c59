use blueprint_lambda::handlers::smart_home_adapter;
use blueprint_lambda::logging::{log_error, log_info};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

/// UUID-v4-shaped id for response headers.
fn generated_message_id() -> String {
    let mut bytes: [u8; 16] = rand::random();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    log_info(
        "smart_home_adapter",
        "directive_received",
        json!({
            "namespace": event.payload.pointer("/header/namespace"),
            "name": event.payload.pointer("/header/name"),
        }),
    );

    smart_home_adapter::handle(&event.payload, &generated_message_id()).map_err(|error| {
        log_error("smart_home_adapter", "directive_failed", json!({"error": error}));
        Error::from(error)
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
