//! Inbound mail filter that bounces messages failing any receipt verdict.

use blueprint_contracts::records::{receipt_verdicts_failed, ses_record};
use serde_json::{json, Value};

use crate::adapters::bounce_sender::{BounceRequest, BounceSender};

/// Bounces the message back to every recipient when a spam, virus, SPF, or
/// DKIM verdict failed, then tells the receipt rule set to stop. Clean mail
/// passes through with a null disposition.
pub fn handle(event: &Value, domain: &str, sender: &dyn BounceSender) -> Result<Value, String> {
    let record = ses_record(event).map_err(|error| error.message().to_string())?;

    let receipt = record.get("receipt").unwrap_or(&Value::Null);
    if !receipt_verdicts_failed(receipt) {
        return Ok(Value::Null);
    }

    let message_id = record
        .pointer("/mail/messageId")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let recipients = receipt
        .get("recipients")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let request = BounceRequest {
        bounce_sender: format!("mailer-daemon@{domain}"),
        original_message_id: message_id,
        reporting_mta: format!("dns; {domain}"),
        recipients,
    };
    sender.send_bounce(&request)?;

    Ok(json!({"disposition": "stop_rule_set"}))
}
