//! Skill adapter for the v2 connected-home API.
//!
//! Discovery reports a fixed device catalog; control directives validate the
//! access token, the appliance, and the directive payload before answering
//! with the matching confirmation. Protocol-level problems are reported as
//! error responses, unknown namespaces as handler errors.

use serde_json::{json, Value};

const DISCOVERY_NAMESPACE: &str = "Alexa.ConnectedHome.Discovery";
const CONTROL_NAMESPACE: &str = "Alexa.ConnectedHome.Control";

/// `message_id` stamps the response headers; callers generate a fresh one
/// per invocation.
pub fn handle(request: &Value, message_id: &str) -> Result<Value, String> {
    let namespace = request
        .pointer("/header/namespace")
        .and_then(Value::as_str)
        .unwrap_or("");
    match namespace {
        DISCOVERY_NAMESPACE => handle_discovery(request, message_id),
        CONTROL_NAMESPACE => Ok(handle_control(request, message_id)),
        other => Err(format!("No supported namespace: {other}")),
    }
}

/// The appliances this adapter exposes. The third device always reports
/// as unreachable.
pub fn device_catalog() -> Value {
    json!([
        {
            "applianceId": "light-001",
            "manufacturerName": "Hearth Labs",
            "modelName": "BASIC BULB A1",
            "version": "1.0",
            "friendlyName": "Porch light",
            "friendlyDescription": "Non-dimmable smart bulb from Hearth Labs",
            "isReachable": true,
            "actions": ["turnOn", "turnOff"],
            "additionalApplianceDetails": {},
        },
        {
            "applianceId": "light-002",
            "manufacturerName": "Hearth Labs",
            "modelName": "DIMMER BULB D2",
            "version": "1.0",
            "friendlyName": "Living room light",
            "friendlyDescription": "Dimmable smart bulb from Hearth Labs",
            "isReachable": true,
            "actions": ["turnOn", "turnOff", "setPercentage", "incrementPercentage", "decrementPercentage"],
            "additionalApplianceDetails": {},
        },
        {
            "applianceId": "plug-003",
            "manufacturerName": "Hearth Labs",
            "modelName": "OUTDOOR PLUG P3",
            "version": "1.0",
            "friendlyName": "Garden plug",
            "friendlyDescription": "Outdoor smart plug from Hearth Labs",
            "isReachable": false,
            "actions": ["turnOn", "turnOff"],
            "additionalApplianceDetails": {},
        },
    ])
}

fn handle_discovery(request: &Value, message_id: &str) -> Result<Value, String> {
    let token = access_token(request);
    if token.is_empty() {
        let request_message_id = request
            .pointer("/header/messageId")
            .and_then(Value::as_str)
            .unwrap_or("");
        return Err(format!(
            "Discovery Request [{request_message_id}] failed. Invalid access token: {token}"
        ));
    }

    Ok(json!({
        "header": {
            "messageId": message_id,
            "name": "DiscoverAppliancesResponse",
            "namespace": DISCOVERY_NAMESPACE,
            "payloadVersion": "2",
        },
        "payload": {"discoveredAppliances": device_catalog()},
    }))
}

fn handle_control(request: &Value, message_id: &str) -> Value {
    if access_token(request).is_empty() {
        return generate_response("InvalidAccessTokenError", json!({}), message_id);
    }

    let appliance_id = request
        .pointer("/payload/appliance/applianceId")
        .and_then(Value::as_str)
        .unwrap_or("");
    if appliance_id.is_empty() {
        let payload = json!({"faultingParameter": format!("applianceId: {appliance_id}")});
        return generate_response("UnexpectedInformationReceivedError", payload, message_id);
    }

    if !is_device_online(appliance_id) {
        return generate_response("TargetOfflineError", json!({}), message_id);
    }

    let directive = request
        .pointer("/header/name")
        .and_then(Value::as_str)
        .unwrap_or("");
    match directive {
        "TurnOnRequest" => generate_response("TurnOnConfirmation", json!({}), message_id),
        "TurnOffRequest" => generate_response("TurnOffConfirmation", json!({}), message_id),
        "SetPercentageRequest" => percentage_response(
            request,
            "/payload/percentageState/value",
            "percentageState",
            "SetPercentageConfirmation",
            message_id,
        ),
        "IncrementPercentageRequest" => percentage_response(
            request,
            "/payload/deltaPercentage/value",
            "deltaPercentage",
            "IncrementPercentageConfirmation",
            message_id,
        ),
        "DecrementPercentageRequest" => percentage_response(
            request,
            "/payload/deltaPercentage/value",
            "deltaPercentage",
            "DecrementPercentageConfirmation",
            message_id,
        ),
        _ => generate_response("UnsupportedOperationError", json!({}), message_id),
    }
}

/// A zero percentage is treated the same as a missing one.
fn percentage_response(
    request: &Value,
    pointer: &str,
    parameter: &str,
    confirmation: &str,
    message_id: &str,
) -> Value {
    let raw = request.pointer(pointer).cloned().unwrap_or(Value::Null);
    match raw.as_f64() {
        Some(value) if value != 0.0 => generate_response(confirmation, json!({}), message_id),
        _ => generate_response(
            "UnexpectedInformationReceivedError",
            json!({"faultingParameter": format!("{parameter}: {raw}")}),
            message_id,
        ),
    }
}

fn generate_response(name: &str, payload: Value, message_id: &str) -> Value {
    json!({
        "header": {
            "messageId": message_id,
            "name": name,
            "namespace": CONTROL_NAMESPACE,
            "payloadVersion": "2",
        },
        "payload": payload,
    })
}

fn access_token(request: &Value) -> &str {
    request
        .pointer("/payload/accessToken")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
}

fn is_device_online(appliance_id: &str) -> bool {
    let catalog = device_catalog();
    let Some(devices) = catalog.as_array() else {
        return false;
    };
    devices.iter().any(|device| {
        device["applianceId"] == appliance_id
            && device["isReachable"].as_bool().unwrap_or(false)
    })
}
