use blueprint_lambda::handlers::ses_notification;
use blueprint_lambda::logging::log_info;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let summary = ses_notification::handle(&event.payload).map_err(Error::from)?;
    log_info("ses_notification", "notification_summarized", summary.clone());
    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
