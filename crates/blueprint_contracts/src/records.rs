use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::ValidationError;

/// Parses the JSON-in-string message a notification topic wraps around the
/// payload it delivers.
pub fn sns_message(event: &Value) -> Result<Value, ValidationError> {
    let raw = event
        .pointer("/Records/0/Sns/Message")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("Event does not carry an Sns.Message record"))?;
    serde_json::from_str(raw).map_err(|error| {
        ValidationError::new(format!("Notification message is not valid JSON: {error}"))
    })
}

/// Inbound mail events carry the mail headers and receipt verdicts under
/// `Records[0].ses`.
pub fn ses_record(event: &Value) -> Result<&Value, ValidationError> {
    event
        .pointer("/Records/0/ses")
        .ok_or_else(|| ValidationError::new("Event does not carry an ses record"))
}

const RECEIPT_VERDICTS: [&str; 4] = ["spfVerdict", "dkimVerdict", "spamVerdict", "virusVerdict"];

/// True when any of the SPF, DKIM, spam, or virus verdicts on a receipt
/// reports `FAIL`.
pub fn receipt_verdicts_failed(receipt: &Value) -> bool {
    RECEIPT_VERDICTS.iter().any(|verdict| {
        receipt
            .get(verdict)
            .and_then(|entry| entry.get("status"))
            .and_then(Value::as_str)
            == Some("FAIL")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReference {
    pub bucket: String,
    pub key: String,
}

pub fn object_references(event: &Value) -> Result<Vec<ObjectReference>, ValidationError> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| ValidationError::new("Event does not carry storage records"))?;

    let mut references = Vec::with_capacity(records.len());
    for record in records {
        let bucket = record
            .pointer("/s3/bucket/name")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::new("Storage record is missing its bucket name"))?;
        let raw_key = record
            .pointer("/s3/object/key")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::new("Storage record is missing its object key"))?;
        references.push(ObjectReference {
            bucket: bucket.to_string(),
            key: decode_object_key(raw_key),
        });
    }
    Ok(references)
}

/// Object keys arrive URL-encoded, with `+` standing in for spaces.
pub fn decode_object_key(raw_key: &str) -> String {
    let spaced = raw_key.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// One received queue message, in the field casing the queue API uses. The
/// poller forwards these verbatim inside its self-invocation payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueMessage {
    #[serde(rename = "MessageId")]
    pub message_id: String,
    #[serde(rename = "ReceiptHandle")]
    pub receipt_handle: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

pub fn scheduled_time(event: &Value) -> Result<&str, ValidationError> {
    event
        .get("time")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("Scheduled event is missing its time"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sns_message_parses_the_wrapped_json() {
        let event = json!({
            "Records": [{
                "Sns": {"Message": "{\"notificationType\":\"Bounce\"}"}
            }]
        });
        let message = sns_message(&event).expect("message should parse");
        assert_eq!(message["notificationType"], "Bounce");

        let error = sns_message(&json!({"Records": [{"Sns": {"Message": "{oops"}}]}))
            .expect_err("message should fail");
        assert!(error.message().starts_with("Notification message is not valid JSON"));

        let error = sns_message(&json!({})).expect_err("record should be missing");
        assert_eq!(error.message(), "Event does not carry an Sns.Message record");
    }

    #[test]
    fn receipt_verdicts_failed_checks_all_four_verdicts() {
        let clean = json!({
            "spfVerdict": {"status": "PASS"},
            "dkimVerdict": {"status": "PASS"},
            "spamVerdict": {"status": "PASS"},
            "virusVerdict": {"status": "PASS"},
        });
        assert!(!receipt_verdicts_failed(&clean));

        let spam = json!({
            "spfVerdict": {"status": "PASS"},
            "dkimVerdict": {"status": "PASS"},
            "spamVerdict": {"status": "FAIL"},
            "virusVerdict": {"status": "PASS"},
        });
        assert!(receipt_verdicts_failed(&spam));

        assert!(!receipt_verdicts_failed(&json!({})));
    }

    #[test]
    fn object_references_decode_url_encoded_keys() {
        let event = json!({
            "Records": [{
                "s3": {
                    "bucket": {"name": "inbox"},
                    "object": {"key": "reports/r%C3%A9sum%C3%A9+final.pdf"},
                }
            }]
        });

        let references = object_references(&event).expect("records should parse");
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].bucket, "inbox");
        assert_eq!(references[0].key, "reports/résumé final.pdf");
    }

    #[test]
    fn object_references_require_bucket_and_key() {
        let error = object_references(&json!({"Records": [{"s3": {"bucket": {}}}]}))
            .expect_err("record should fail");
        assert_eq!(error.message(), "Storage record is missing its bucket name");
    }

    #[test]
    fn queue_message_uses_queue_api_field_casing() {
        let message: QueueMessage = serde_json::from_value(json!({
            "MessageId": "m-1",
            "ReceiptHandle": "rh-1",
            "Body": "{\"work\":1}",
        }))
        .expect("message should parse");
        assert_eq!(message.message_id, "m-1");
        assert_eq!(message.receipt_handle, "rh-1");
    }

    #[test]
    fn scheduled_time_requires_the_time_field() {
        let event = json!({"time": "2016-02-14T22:41:27Z"});
        assert_eq!(
            scheduled_time(&event).expect("time should read"),
            "2016-02-14T22:41:27Z"
        );

        let error = scheduled_time(&json!({})).expect_err("time should be missing");
        assert_eq!(error.message(), "Scheduled event is missing its time");
    }
}
