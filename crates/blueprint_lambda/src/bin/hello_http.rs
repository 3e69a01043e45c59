use blueprint_contracts::apigw::GatewayResponse;
use blueprint_lambda::handlers::hello_http;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<GatewayResponse, Error> {
    Ok(hello_http::handle(event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
