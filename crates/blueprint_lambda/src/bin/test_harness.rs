use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use blueprint_lambda::adapters::result_store::{ResultStore, TestResult};
use blueprint_lambda::handlers::test_harness;
use blueprint_lambda::logging::log_error;
use blueprint_lambda::runtime::lambda_invoker::LambdaFunctionInvoker;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct DynamoResultStore {
    dynamo_client: aws_sdk_dynamodb::Client,
}

impl ResultStore for DynamoResultStore {
    fn record(&self, table_name: &str, result: &TestResult) -> Result<(), String> {
        let client = self.dynamo_client.clone();
        let table_name = table_name.to_string();

        let mut item = HashMap::new();
        item.insert("testId".to_string(), AttributeValue::S(result.test_id.clone()));
        item.insert(
            "iteration".to_string(),
            AttributeValue::N(result.iteration.to_string()),
        );
        item.insert("result".to_string(), AttributeValue::S(result.result.clone()));
        item.insert("passed".to_string(), AttributeValue::Bool(result.passed));

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table_name)
                    .set_item(Some(item))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to record test result: {error}"))
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let invoker = LambdaFunctionInvoker::new(aws_sdk_lambda::Client::new(&config));
    let results = DynamoResultStore {
        dynamo_client: aws_sdk_dynamodb::Client::new(&config),
    };

    test_harness::handle(&event.payload, &invoker, &results).map_err(|error| {
        log_error("test_harness", "test_failed", json!({"error": error}));
        Error::from(error)
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
