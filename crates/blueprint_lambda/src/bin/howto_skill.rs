use aws_sdk_dynamodb::types::AttributeValue;
use blueprint_lambda::handlers::howto_skill::build_skill;
use blueprint_lambda::logging::log_error;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Map, Value};
use skill_kit::attributes::AttributeStore;

/// Persists session attributes as one JSON document per user.
struct DynamoAttributeStore {
    table: String,
    dynamo_client: aws_sdk_dynamodb::Client,
}

impl AttributeStore for DynamoAttributeStore {
    fn load(&self, user_id: &str) -> Result<Map<String, Value>, String> {
        let client = self.dynamo_client.clone();
        let table = self.table.clone();
        let user_id = user_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_item()
                    .table_name(table)
                    .key("userId", AttributeValue::S(user_id))
                    .send()
                    .await
                    .map_err(|error| format!("failed to load attributes: {error}"))?;
                let Some(item) = output.item() else {
                    return Ok(Map::new());
                };
                let Some(AttributeValue::S(raw)) = item.get("attributes") else {
                    return Ok(Map::new());
                };
                serde_json::from_str(raw)
                    .map_err(|error| format!("stored attributes are not valid JSON: {error}"))
            })
        })
    }

    fn save(&self, user_id: &str, attributes: &Map<String, Value>) -> Result<(), String> {
        let client = self.dynamo_client.clone();
        let table = self.table.clone();
        let user_id = user_id.to_string();
        let serialized = Value::Object(attributes.clone()).to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table)
                    .item("userId", AttributeValue::S(user_id))
                    .item("attributes", AttributeValue::S(serialized))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to save attributes: {error}"))
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let mut skill = build_skill();
    if let Ok(application_id) = std::env::var("SKILL_APP_ID") {
        skill = skill.with_application_id(application_id);
    }
    if let Ok(table) = std::env::var("SKILL_TABLE") {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        skill = skill.with_attribute_store(Box::new(DynamoAttributeStore {
            table,
            dynamo_client: aws_sdk_dynamodb::Client::new(&config),
        }));
    }

    skill.handle(&event.payload).map_err(|error| {
        log_error("howto_skill", "request_failed", json!({"error": error.message()}));
        Error::from(error)
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
