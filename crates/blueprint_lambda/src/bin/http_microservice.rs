use blueprint_contracts::apigw::GatewayResponse;
use blueprint_lambda::handlers::http_microservice;
use blueprint_lambda::runtime::dynamo::DynamoTableStore;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<GatewayResponse, Error> {
    let table_name =
        std::env::var("TABLE_NAME").map_err(|_| Error::from("TABLE_NAME must be configured"))?;

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoTableStore::new(aws_sdk_dynamodb::Client::new(&config));

    Ok(http_microservice::handle(event.payload, &table_name, &store))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
