use blueprint_contracts::collector::InvocationMetadata;
use blueprint_lambda::handlers::iot_event_shipper;
use blueprint_lambda::logging::log_error;
use blueprint_lambda::runtime::http_collector::HttpEventCollector;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let url = std::env::var("SPLUNK_HEC_URL")
        .map_err(|_| Error::from("SPLUNK_HEC_URL must be configured"))?;
    let token = std::env::var("SPLUNK_HEC_TOKEN")
        .map_err(|_| Error::from("SPLUNK_HEC_TOKEN must be configured"))?;
    let collector = HttpEventCollector::new(url, token);

    let metadata = InvocationMetadata {
        request_id: event.context.request_id.clone(),
        function_name: event.context.env_config.function_name.clone(),
    };

    iot_event_shipper::handle(&event.payload, &metadata, &collector).map_err(|error| {
        log_error("iot_event_shipper", "ship_failed", json!({"error": error}));
        Error::from(error)
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
