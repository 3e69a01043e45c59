use blueprint_contracts::firehose::{TransformEvent, TransformResponse};
use blueprint_lambda::handlers::firehose_cloudwatch_logs;
use lambda_runtime::{service_fn, Error, LambdaEvent};

async fn handle_request(event: LambdaEvent<TransformEvent>) -> Result<TransformResponse, Error> {
    Ok(firehose_cloudwatch_logs::handle(event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
