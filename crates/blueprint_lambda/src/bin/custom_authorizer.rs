use blueprint_lambda::handlers::custom_authorizer;
use blueprint_lambda::logging::log_error;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    custom_authorizer::handle(&event.payload).map_err(|error| {
        // "Unauthorized" must pass through verbatim for the gateway's 401
        // mapping, so the error is logged rather than rewrapped.
        log_error("custom_authorizer", "authorization_failed", json!({"error": error}));
        Error::from(error)
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
