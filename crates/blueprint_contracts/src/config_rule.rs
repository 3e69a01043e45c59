use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::validation::ValidationError;

pub const COMPLIANT: &str = "COMPLIANT";
pub const NON_COMPLIANT: &str = "NON_COMPLIANT";
pub const NOT_APPLICABLE: &str = "NOT_APPLICABLE";

/// Message type delivered when a changed configuration item is too large to
/// inline and has to be fetched from the configuration history instead.
pub const OVERSIZED_CHANGE_NOTIFICATION: &str = "OversizedConfigurationItemChangeNotification";

const EC2_INSTANCE_TYPE: &str = "AWS::EC2::Instance";

/// Invocation payload delivered to a change-triggered rule. The invoking
/// event and rule parameters arrive as JSON serialized into strings.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEvent {
    #[serde(rename = "invokingEvent")]
    invoking_event: String,
    #[serde(rename = "ruleParameters", default)]
    rule_parameters: Option<String>,
    #[serde(rename = "resultToken")]
    pub result_token: String,
    #[serde(rename = "eventLeftScope", default)]
    pub event_left_scope: bool,
}

impl RuleEvent {
    pub fn parse(event: &Value) -> Result<Self, ValidationError> {
        serde_json::from_value(event.clone())
            .map_err(|error| ValidationError::new(format!("Rule event is malformed: {error}")))
    }

    pub fn invoking_event(&self) -> Result<Value, ValidationError> {
        serde_json::from_str(&self.invoking_event).map_err(|error| {
            ValidationError::new(format!("Invoking event is not valid JSON: {error}"))
        })
    }

    /// Rule parameters, or an empty object when the rule has none configured.
    pub fn rule_parameters(&self) -> Result<Value, ValidationError> {
        match &self.rule_parameters {
            None => Ok(json!({})),
            Some(raw) => serde_json::from_str(raw).map_err(|error| {
                ValidationError::new(format!("Rule parameters are not valid JSON: {error}"))
            }),
        }
    }
}

pub fn is_oversized_notification(invoking_event: &Value) -> bool {
    invoking_event.get("messageType").and_then(Value::as_str)
        == Some(OVERSIZED_CHANGE_NOTIFICATION)
}

/// Resource named by an oversized change notification, used to look the full
/// configuration item up in the configuration history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationItemSummary {
    pub resource_type: String,
    pub resource_id: String,
}

pub fn oversized_item_summary(
    invoking_event: &Value,
) -> Result<ConfigurationItemSummary, ValidationError> {
    let summary = invoking_event
        .get("configurationItemSummary")
        .ok_or_else(|| ValidationError::new("Event does not carry a configurationItemSummary"))?;
    let resource_type = summary
        .get("resourceType")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("Configuration item summary is missing its resource type"))?;
    let resource_id = summary
        .get("resourceId")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("Configuration item summary is missing its resource id"))?;
    Ok(ConfigurationItemSummary {
        resource_type: resource_type.to_string(),
        resource_id: resource_id.to_string(),
    })
}

pub fn inline_configuration_item(invoking_event: &Value) -> Result<Value, ValidationError> {
    invoking_event
        .get("configurationItem")
        .cloned()
        .ok_or_else(|| ValidationError::new("Event does not carry a configurationItem"))
}

/// Reshapes a configuration-history entry into the configuration-item form
/// an inline change notification would have delivered.
pub fn convert_api_configuration(api_configuration: &Value) -> Result<Value, ValidationError> {
    let mut item = api_configuration
        .as_object()
        .cloned()
        .ok_or_else(|| ValidationError::new("Configuration history entry must be a JSON object"))?;

    copy_field(&mut item, "accountId", "awsAccountId");
    copy_field(&mut item, "arn", "ARN");
    copy_field(&mut item, "configurationItemMD5Hash", "configurationStateMd5Hash");
    copy_field(&mut item, "version", "configurationItemVersion");

    if let Some(raw) = item.get("configuration").and_then(Value::as_str) {
        let parsed: Value = serde_json::from_str(raw).map_err(|error| {
            ValidationError::new(format!(
                "Configuration history entry carries invalid configuration JSON: {error}"
            ))
        })?;
        item.insert("configuration".to_string(), parsed);
    }

    if let Some(relationships) = item.get_mut("relationships").and_then(Value::as_array_mut) {
        for relationship in relationships {
            if let Some(entry) = relationship.as_object_mut() {
                if let Some(name) = entry.get("relationshipName").cloned() {
                    entry.insert("name".to_string(), name);
                }
            }
        }
    }

    Ok(Value::Object(item))
}

fn copy_field(item: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = item.get(from).cloned() {
        item.insert(to.to_string(), value);
    }
}

/// A rule only evaluates items that are live and still in scope. Deleted
/// resources and out-of-scope events get a NOT_APPLICABLE result instead.
pub fn is_applicable(configuration_item: &Value, event: &RuleEvent) -> bool {
    let status = configuration_item
        .get("configurationItemStatus")
        .and_then(Value::as_str);
    matches!(status, Some("OK") | Some("ResourceDiscovered")) && !event.event_left_scope
}

/// Compares an instance's type against the `desiredInstanceType` rule
/// parameter. Resources other than instances are not applicable.
pub fn evaluate_instance_type(
    configuration_item: &Value,
    rule_parameters: &Value,
) -> Result<&'static str, ValidationError> {
    let configuration = configuration_item.get("configuration").ok_or_else(|| {
        ValidationError::new("Configuration item does not carry its configuration")
    })?;

    if configuration_item.get("resourceType").and_then(Value::as_str) != Some(EC2_INSTANCE_TYPE) {
        return Ok(NOT_APPLICABLE);
    }
    if rule_parameters.get("desiredInstanceType") == configuration.get("instanceType") {
        return Ok(COMPLIANT);
    }
    Ok(NON_COMPLIANT)
}

/// One compliance verdict, in the field casing the evaluations API expects.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Evaluation {
    #[serde(rename = "ComplianceResourceType")]
    pub compliance_resource_type: String,
    #[serde(rename = "ComplianceResourceId")]
    pub compliance_resource_id: String,
    #[serde(rename = "ComplianceType")]
    pub compliance_type: String,
    #[serde(rename = "OrderingTimestamp")]
    pub ordering_timestamp: Value,
    #[serde(rename = "Annotation", skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl Evaluation {
    pub fn for_item(configuration_item: &Value, compliance_type: &str) -> Evaluation {
        Evaluation {
            compliance_resource_type: configuration_item
                .get("resourceType")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            compliance_resource_id: configuration_item
                .get("resourceId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            compliance_type: compliance_type.to_string(),
            ordering_timestamp: configuration_item
                .get("configurationItemCaptureTime")
                .cloned()
                .unwrap_or(Value::Null),
            annotation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule_event(invoking_event: Value) -> RuleEvent {
        RuleEvent::parse(&json!({
            "invokingEvent": invoking_event.to_string(),
            "ruleParameters": "{\"desiredInstanceType\":\"t2.micro\"}",
            "resultToken": "token-1",
            "eventLeftScope": false,
        }))
        .expect("rule event should parse")
    }

    #[test]
    fn rule_event_parses_serialized_payloads() {
        let event = sample_rule_event(json!({"messageType": "ConfigurationItemChangeNotification"}));
        assert_eq!(event.result_token, "token-1");
        assert!(!event.event_left_scope);
        assert_eq!(
            event.invoking_event().expect("invoking event should parse")["messageType"],
            "ConfigurationItemChangeNotification"
        );
        assert_eq!(
            event.rule_parameters().expect("parameters should parse")["desiredInstanceType"],
            "t2.micro"
        );
    }

    #[test]
    fn rule_parameters_default_to_an_empty_object() {
        let event = RuleEvent::parse(&json!({
            "invokingEvent": "{}",
            "resultToken": "token-2",
        }))
        .expect("rule event should parse");
        assert_eq!(event.rule_parameters().expect("parameters should parse"), json!({}));
    }

    #[test]
    fn oversized_notifications_name_the_resource_to_fetch() {
        let invoking = json!({
            "messageType": OVERSIZED_CHANGE_NOTIFICATION,
            "configurationItemSummary": {
                "resourceType": "AWS::EC2::Instance",
                "resourceId": "i-0123456789abcdef0",
            }
        });
        assert!(is_oversized_notification(&invoking));

        let summary = oversized_item_summary(&invoking).expect("summary should parse");
        assert_eq!(summary.resource_type, "AWS::EC2::Instance");
        assert_eq!(summary.resource_id, "i-0123456789abcdef0");
    }

    #[test]
    fn convert_api_configuration_reshapes_history_entries() {
        let api_configuration = json!({
            "accountId": "123456789012",
            "arn": "arn:aws:ec2:us-east-1:123456789012:instance/i-1",
            "configurationItemMD5Hash": "abc123",
            "version": "1.3",
            "configuration": "{\"instanceType\":\"t2.micro\"}",
            "relationships": [
                {"relationshipName": "Is attached to Volume", "resourceId": "vol-1"}
            ],
        });

        let item = convert_api_configuration(&api_configuration)
            .expect("history entry should convert");
        assert_eq!(item["awsAccountId"], "123456789012");
        assert_eq!(item["ARN"], "arn:aws:ec2:us-east-1:123456789012:instance/i-1");
        assert_eq!(item["configurationStateMd5Hash"], "abc123");
        assert_eq!(item["configurationItemVersion"], "1.3");
        assert_eq!(item["configuration"]["instanceType"], "t2.micro");
        assert_eq!(item["relationships"][0]["name"], "Is attached to Volume");
    }

    #[test]
    fn applicability_requires_a_live_in_scope_item() {
        let live = json!({"configurationItemStatus": "OK"});
        let discovered = json!({"configurationItemStatus": "ResourceDiscovered"});
        let deleted = json!({"configurationItemStatus": "ResourceDeleted"});

        let in_scope = sample_rule_event(json!({}));
        assert!(is_applicable(&live, &in_scope));
        assert!(is_applicable(&discovered, &in_scope));
        assert!(!is_applicable(&deleted, &in_scope));

        let left_scope = RuleEvent::parse(&json!({
            "invokingEvent": "{}",
            "resultToken": "token-3",
            "eventLeftScope": true,
        }))
        .expect("rule event should parse");
        assert!(!is_applicable(&live, &left_scope));
    }

    #[test]
    fn instance_type_evaluation_covers_all_three_verdicts() {
        let parameters = json!({"desiredInstanceType": "t2.micro"});

        let matching = json!({
            "resourceType": "AWS::EC2::Instance",
            "configuration": {"instanceType": "t2.micro"},
        });
        assert_eq!(
            evaluate_instance_type(&matching, &parameters).expect("evaluation should run"),
            COMPLIANT
        );

        let mismatched = json!({
            "resourceType": "AWS::EC2::Instance",
            "configuration": {"instanceType": "m5.large"},
        });
        assert_eq!(
            evaluate_instance_type(&mismatched, &parameters).expect("evaluation should run"),
            NON_COMPLIANT
        );

        let other_resource = json!({
            "resourceType": "AWS::S3::Bucket",
            "configuration": {},
        });
        assert_eq!(
            evaluate_instance_type(&other_resource, &parameters).expect("evaluation should run"),
            NOT_APPLICABLE
        );

        let missing_configuration = json!({"resourceType": "AWS::EC2::Instance"});
        let error = evaluate_instance_type(&missing_configuration, &parameters)
            .expect_err("evaluation should fail");
        assert_eq!(error.message(), "Configuration item does not carry its configuration");
    }

    #[test]
    fn evaluations_serialize_in_api_field_casing() {
        let item = json!({
            "resourceType": "AWS::EC2::Instance",
            "resourceId": "i-1",
            "configurationItemCaptureTime": "2024-05-01T10:00:00.000Z",
        });
        let evaluation = Evaluation::for_item(&item, COMPLIANT);
        assert_eq!(
            serde_json::to_value(&evaluation).expect("evaluation should serialize"),
            json!({
                "ComplianceResourceType": "AWS::EC2::Instance",
                "ComplianceResourceId": "i-1",
                "ComplianceType": "COMPLIANT",
                "OrderingTimestamp": "2024-05-01T10:00:00.000Z",
            })
        );
    }
}
