use blueprint_lambda::adapters::object_info::ObjectInfoStore;
use blueprint_lambda::handlers::s3_object_logger;
use blueprint_lambda::logging::{log_error, log_info};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct S3ObjectInfoStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectInfoStore for S3ObjectInfoStore {
    fn content_type(&self, bucket: &str, key: &str) -> Result<String, String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map_err(|error| format!("failed to get object: {error}"))?;
                Ok(output.content_type().unwrap_or_default().to_string())
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = S3ObjectInfoStore {
        s3_client: aws_sdk_s3::Client::new(&config),
    };

    match s3_object_logger::handle(&event.payload, &store) {
        Ok(content_type) => {
            log_info("s3_object_logger", "content_type_resolved", json!({"contentType": content_type}));
            Ok(content_type)
        }
        Err(error) => {
            log_error("s3_object_logger", "lookup_failed", json!({"error": error}));
            Err(Error::from(error))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
