//! Scheduled queue poller that fans received messages back out to itself.
//!
//! A schedule invocation drains up to a batch of messages and re-invokes the
//! same function asynchronously once per message with a `process-message`
//! operation. The process invocation handles one message and deletes it from
//! the queue.

use blueprint_contracts::records::QueueMessage;
use serde_json::{json, Value};

use crate::adapters::function_invoker::FunctionInvoker;
use crate::adapters::queue_client::QueueClient;

const PROCESS_MESSAGE: &str = "process-message";

const MAX_MESSAGES: i32 = 10;
const VISIBILITY_TIMEOUT_SECONDS: i32 = 10;

pub fn handle(
    event: &Value,
    queue_url: &str,
    function_name: &str,
    queue: &dyn QueueClient,
    invoker: &dyn FunctionInvoker,
) -> Result<Value, String> {
    if event.get("operation").and_then(Value::as_str) == Some(PROCESS_MESSAGE) {
        return process_message(event, queue_url, queue);
    }
    poll(queue_url, function_name, queue, invoker)
}

fn process_message(
    event: &Value,
    queue_url: &str,
    queue: &dyn QueueClient,
) -> Result<Value, String> {
    let message: QueueMessage = event
        .get("message")
        .cloned()
        .and_then(|raw| serde_json::from_value(raw).ok())
        .ok_or_else(|| "Poll event does not carry a message".to_string())?;

    queue.delete_message(queue_url, &message.receipt_handle)?;
    Ok(json!(message))
}

fn poll(
    queue_url: &str,
    function_name: &str,
    queue: &dyn QueueClient,
    invoker: &dyn FunctionInvoker,
) -> Result<Value, String> {
    let messages = queue.receive_messages(queue_url, MAX_MESSAGES, VISIBILITY_TIMEOUT_SECONDS)?;

    for message in &messages {
        let payload = json!({
            "operation": PROCESS_MESSAGE,
            "message": message,
        });
        invoker.invoke_async(function_name, payload.to_string().as_bytes())?;
    }

    Ok(json!(format!("Messages received: {}", messages.len())))
}
