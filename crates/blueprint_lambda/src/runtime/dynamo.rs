//! DynamoDB-backed table operations shared by the data-plane endpoints.
//!
//! Request payloads use the wire-level parameter names (`TableName`, `Key`,
//! `Item`, expression fields) so callers can pass operation payloads straight
//! from an API event body.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{json, Map, Value};

use crate::adapters::table_store::TableStore;

pub struct DynamoTableStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoTableStore {
    pub fn new(client: aws_sdk_dynamodb::Client) -> DynamoTableStore {
        DynamoTableStore { client }
    }
}

impl TableStore for DynamoTableStore {
    fn delete_item(&self, payload: &Value) -> Result<Value, String> {
        let table = table_name(payload)?;
        let key = object_parameter(payload, "Key")
            .ok_or_else(|| "Delete request is missing its Key".to_string())?;
        let key = to_attribute_map(key);
        let client = self.client.clone();
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_item()
                    .table_name(table)
                    .set_key(Some(key))
                    .send()
                    .await
                    .map(|_| json!({}))
                    .map_err(|error| format!("failed to delete item: {error}"))
            })
        })
    }

    fn put_item(&self, payload: &Value) -> Result<Value, String> {
        let table = table_name(payload)?;
        let item = object_parameter(payload, "Item")
            .ok_or_else(|| "Put request is missing its Item".to_string())?;
        let item = to_attribute_map(item);
        let client = self.client.clone();
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table)
                    .set_item(Some(item))
                    .send()
                    .await
                    .map(|_| json!({}))
                    .map_err(|error| format!("failed to put item: {error}"))
            })
        })
    }

    fn update_item(&self, payload: &Value) -> Result<Value, String> {
        let table = table_name(payload)?;
        let key = object_parameter(payload, "Key")
            .ok_or_else(|| "Update request is missing its Key".to_string())?;
        let key = to_attribute_map(key);
        let update_expression = string_parameter(payload, "UpdateExpression");
        let condition_expression = string_parameter(payload, "ConditionExpression");
        let expression_values =
            object_parameter(payload, "ExpressionAttributeValues").map(expression_attribute_values);
        let expression_names =
            object_parameter(payload, "ExpressionAttributeNames").map(string_map);
        let client = self.client.clone();
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .update_item()
                    .table_name(table)
                    .set_key(Some(key))
                    .set_update_expression(update_expression)
                    .set_condition_expression(condition_expression)
                    .set_expression_attribute_values(expression_values)
                    .set_expression_attribute_names(expression_names)
                    .send()
                    .await
                    .map(|_| json!({}))
                    .map_err(|error| format!("failed to update item: {error}"))
            })
        })
    }

    fn scan(&self, payload: &Value) -> Result<Value, String> {
        let table = table_name(payload)?;
        let filter_expression = string_parameter(payload, "FilterExpression");
        let projection_expression = string_parameter(payload, "ProjectionExpression");
        let expression_values =
            object_parameter(payload, "ExpressionAttributeValues").map(expression_attribute_values);
        let expression_names =
            object_parameter(payload, "ExpressionAttributeNames").map(string_map);
        let limit = payload
            .get("Limit")
            .and_then(Value::as_i64)
            .map(|limit| limit as i32);
        let client = self.client.clone();
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .scan()
                    .table_name(table)
                    .set_filter_expression(filter_expression)
                    .set_projection_expression(projection_expression)
                    .set_expression_attribute_values(expression_values)
                    .set_expression_attribute_names(expression_names)
                    .set_limit(limit)
                    .send()
                    .await
                    .map_err(|error| format!("failed to scan table: {error}"))?;
                let items: Vec<Value> = output
                    .items()
                    .iter()
                    .map(from_attribute_map)
                    .collect();
                Ok(json!({
                    "Items": items,
                    "Count": output.count(),
                    "ScannedCount": output.scanned_count(),
                }))
            })
        })
    }
}

fn table_name(payload: &Value) -> Result<String, String> {
    string_parameter(payload, "TableName")
        .ok_or_else(|| "Request payload is missing its TableName".to_string())
}

fn string_parameter(payload: &Value, name: &str) -> Option<String> {
    payload
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn object_parameter<'a>(payload: &'a Value, name: &str) -> Option<&'a Map<String, Value>> {
    payload.get(name).and_then(Value::as_object)
}

fn expression_attribute_values(fields: &Map<String, Value>) -> HashMap<String, AttributeValue> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), to_attribute_value(value)))
        .collect()
}

fn string_map(fields: &Map<String, Value>) -> HashMap<String, String> {
    fields
        .iter()
        .filter_map(|(name, value)| value.as_str().map(|text| (name.clone(), text.to_string())))
        .collect()
}

pub fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute_value).collect()),
        Value::Object(fields) => AttributeValue::M(to_attribute_map(fields)),
    }
}

pub fn to_attribute_map(fields: &Map<String, Value>) -> HashMap<String, AttributeValue> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), to_attribute_value(value)))
        .collect()
}

pub fn from_attribute_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(flag) => json!(flag),
        AttributeValue::N(number) => parse_number(number),
        AttributeValue::S(text) => json!(text),
        AttributeValue::L(items) => Value::Array(items.iter().map(from_attribute_value).collect()),
        AttributeValue::M(fields) => from_attribute_map(fields),
        AttributeValue::Ss(items) => json!(items),
        AttributeValue::Ns(items) => {
            Value::Array(items.iter().map(|item| parse_number(item.as_str())).collect())
        }
        _ => Value::Null,
    }
}

pub fn from_attribute_map(fields: &HashMap<String, AttributeValue>) -> Value {
    let mut object = Map::new();
    for (name, value) in fields {
        object.insert(name.clone(), from_attribute_value(value));
    }
    Value::Object(object)
}

fn parse_number(text: &str) -> Value {
    if let Ok(integer) = text.parse::<i64>() {
        return json!(integer);
    }
    match text.parse::<f64>() {
        Ok(float) => json!(float),
        Err(_) => json!(text),
    }
}
