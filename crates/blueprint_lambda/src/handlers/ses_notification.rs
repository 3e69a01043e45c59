//! Summarizes mail delivery notifications fanned out through a topic.
//!
//! The notification arrives JSON-encoded inside the topic record. Bounces,
//! complaints, and deliveries each reduce to the fields an operator needs
//! when chasing a mail problem.

use blueprint_contracts::records::sns_message;
use serde_json::{json, Value};

pub fn handle(event: &Value) -> Result<Value, String> {
    let message = sns_message(event).map_err(|error| error.message().to_string())?;

    let notification_type = message
        .get("notificationType")
        .and_then(Value::as_str)
        .unwrap_or("");
    match notification_type {
        "Bounce" => Ok(bounce_summary(&message)),
        "Complaint" => Ok(complaint_summary(&message)),
        "Delivery" => Ok(delivery_summary(&message)),
        other => Err(format!("Unknown notification type: {other}")),
    }
}

fn bounce_summary(message: &Value) -> Value {
    json!({
        "notificationType": "Bounce",
        "messageId": mail_message_id(message),
        "recipients": recipient_addresses(message.pointer("/bounce/bouncedRecipients")),
        "bounceType": message.pointer("/bounce/bounceType").cloned().unwrap_or(Value::Null),
    })
}

fn complaint_summary(message: &Value) -> Value {
    json!({
        "notificationType": "Complaint",
        "messageId": mail_message_id(message),
        "recipients": recipient_addresses(message.pointer("/complaint/complainedRecipients")),
        "complaintFeedbackType": message
            .pointer("/complaint/complaintFeedbackType")
            .cloned()
            .unwrap_or(Value::Null),
    })
}

/// Delivery notifications already carry plain address strings.
fn delivery_summary(message: &Value) -> Value {
    json!({
        "notificationType": "Delivery",
        "messageId": mail_message_id(message),
        "recipients": message.pointer("/delivery/recipients").cloned().unwrap_or_else(|| json!([])),
        "smtpResponse": message.pointer("/delivery/smtpResponse").cloned().unwrap_or(Value::Null),
    })
}

fn mail_message_id(message: &Value) -> Value {
    message
        .pointer("/mail/messageId")
        .cloned()
        .unwrap_or(Value::Null)
}

fn recipient_addresses(recipients: Option<&Value>) -> Vec<Value> {
    recipients
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| entry.get("emailAddress").cloned().unwrap_or(Value::Null))
                .collect()
        })
        .unwrap_or_default()
}
