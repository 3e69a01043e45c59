use blueprint_lambda::handlers::edge_query_auth;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    edge_query_auth::handle(&event.payload).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
