//! Table-backed CRUD endpoint behind an API gateway.
//!
//! The HTTP method selects the table operation. GET scans with the query
//! string parameters as the operation payload; DELETE, POST, and PUT take
//! theirs from the JSON body. The configured table name is stamped onto
//! every payload, so callers never pick the table.

use blueprint_contracts::apigw::{
    error_message_response, normalize_proxy_event, query_parameters, request_method,
    success_response, GatewayResponse,
};
use blueprint_contracts::validation::ValidationError;
use serde_json::{Map, Value};

use crate::adapters::table_store::TableStore;

pub fn handle(event: Value, table_name: &str, store: &dyn TableStore) -> GatewayResponse {
    match run_operation(event, table_name, store) {
        Ok(result) => success_response(200, result),
        Err(message) => error_message_response(400, &message),
    }
}

fn run_operation(event: Value, table_name: &str, store: &dyn TableStore) -> Result<Value, String> {
    let method = request_method(&event)
        .map_err(|error| error.message().to_string())?
        .to_string();

    let payload = match method.as_str() {
        "GET" => query_parameters(&event),
        _ => normalize_proxy_event(event).map_err(|error| error.message().to_string())?,
    };
    let payload = with_table_name(payload, table_name).map_err(|error| error.message().to_string())?;

    match method.as_str() {
        "DELETE" => store.delete_item(&payload),
        "GET" => store.scan(&payload),
        "POST" => store.put_item(&payload),
        "PUT" => store.update_item(&payload),
        other => Err(format!("Unsupported method \"{other}\"")),
    }
}

fn with_table_name(payload: Value, table_name: &str) -> Result<Value, ValidationError> {
    let mut fields = match payload {
        Value::Null => Map::new(),
        Value::Object(fields) => fields,
        _ => return Err(ValidationError::new("Request payload must be a JSON object")),
    };
    fields.insert("TableName".to_string(), Value::from(table_name));
    Ok(Value::Object(fields))
}
