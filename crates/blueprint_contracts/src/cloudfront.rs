use serde_json::{json, Value};

use crate::validation::ValidationError;

/// Pulls the viewer request out of a content-delivery edge event. Edge
/// handlers mutate this object and hand it back, or replace it with a
/// generated response.
pub fn viewer_request(event: &Value) -> Result<Value, ValidationError> {
    event
        .pointer("/Records/0/cf/request")
        .cloned()
        .ok_or_else(|| ValidationError::new("Event does not carry a cf.request record"))
}

/// Edge headers are maps from lowercased header name to a list of
/// `{key, value}` pairs; clients may send the same header several times.
pub fn first_header_value<'a>(request: &'a Value, name: &str) -> Option<&'a str> {
    request
        .get("headers")?
        .get(name)?
        .get(0)?
        .get("value")?
        .as_str()
}

pub fn set_header(request: &mut Value, name: &str, value: &str) {
    let Some(object) = request.as_object_mut() else {
        return;
    };
    let headers = object
        .entry("headers")
        .or_insert_with(|| json!({}));
    if let Some(headers) = headers.as_object_mut() {
        headers.insert(
            name.to_lowercase(),
            json!([{ "key": name, "value": value }]),
        );
    }
}

pub fn any_cookie_contains(request: &Value, needle: &str) -> bool {
    let Some(cookies) = request
        .get("headers")
        .and_then(|headers| headers.get("cookie"))
        .and_then(Value::as_array)
    else {
        return false;
    };
    cookies
        .iter()
        .filter_map(|entry| entry.get("value").and_then(Value::as_str))
        .any(|value| value.contains(needle))
}

pub fn request_uri(request: &Value) -> &str {
    request.get("uri").and_then(Value::as_str).unwrap_or("")
}

pub fn set_request_uri(request: &mut Value, uri: &str) {
    if let Some(object) = request.as_object_mut() {
        object.insert("uri".to_string(), Value::from(uri));
    }
}

pub fn request_querystring(request: &Value) -> &str {
    request
        .get("querystring")
        .and_then(Value::as_str)
        .unwrap_or("")
}

pub fn set_request_querystring(request: &mut Value, querystring: &str) {
    if let Some(object) = request.as_object_mut() {
        object.insert("querystring".to_string(), Value::from(querystring));
    }
}

pub fn parse_querystring(querystring: &str) -> Vec<(String, String)> {
    querystring
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(name), decode_component(value))
        })
        .collect()
}

pub fn join_querystring(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Generated response replacing the viewer request; status is a string in
/// the edge contract.
pub fn redirect_response(location: &str) -> Value {
    json!({
        "status": "302",
        "statusDescription": "Found",
        "headers": {
            "location": [{ "key": "Location", "value": location }],
        },
    })
}
