use blueprint_lambda::adapters::experiment::ExperimentSource;
use blueprint_lambda::handlers::edge_ab_test;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct ThreadRngExperiments;

impl ExperimentSource for ThreadRngExperiments {
    fn draw(&self) -> f64 {
        rand::random::<f64>()
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    edge_ab_test::handle(&event.payload, &ThreadRngExperiments).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
