use blueprint_contracts::records::QueueMessage;
use blueprint_lambda::adapters::queue_client::QueueClient;
use blueprint_lambda::handlers::sqs_poller;
use blueprint_lambda::logging::log_error;
use blueprint_lambda::runtime::lambda_invoker::LambdaFunctionInvoker;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct SqsQueueClient {
    sqs_client: aws_sdk_sqs::Client,
}

impl QueueClient for SqsQueueClient {
    fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        visibility_timeout: i32,
    ) -> Result<Vec<QueueMessage>, String> {
        let client = self.sqs_client.clone();
        let queue_url = queue_url.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .receive_message()
                    .queue_url(queue_url)
                    .max_number_of_messages(max_messages)
                    .visibility_timeout(visibility_timeout)
                    .send()
                    .await
                    .map_err(|error| format!("failed to receive messages: {error}"))?;
                Ok(output
                    .messages()
                    .iter()
                    .map(|message| QueueMessage {
                        message_id: message.message_id().unwrap_or_default().to_string(),
                        receipt_handle: message.receipt_handle().unwrap_or_default().to_string(),
                        body: message.body().unwrap_or_default().to_string(),
                    })
                    .collect())
            })
        })
    }

    fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> Result<(), String> {
        let client = self.sqs_client.clone();
        let queue_url = queue_url.to_string();
        let receipt_handle = receipt_handle.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_message()
                    .queue_url(queue_url)
                    .receipt_handle(receipt_handle)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to delete message: {error}"))
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let queue_url =
        std::env::var("QUEUE_URL").map_err(|_| Error::from("QUEUE_URL must be configured"))?;
    let function_name = event.context.env_config.function_name.clone();

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let queue = SqsQueueClient {
        sqs_client: aws_sdk_sqs::Client::new(&config),
    };
    let invoker = LambdaFunctionInvoker::new(aws_sdk_lambda::Client::new(&config));

    sqs_poller::handle(&event.payload, &queue_url, &function_name, &queue, &invoker).map_err(
        |error| {
            log_error("sqs_poller", "poll_failed", json!({"error": error}));
            Error::from(error)
        },
    )
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
