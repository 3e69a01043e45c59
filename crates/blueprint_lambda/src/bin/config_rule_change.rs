use aws_sdk_config::primitives::{DateTime, DateTimeFormat};
use aws_sdk_config::types::{ComplianceType, ConfigurationItem, Evaluation as ApiEvaluation, ResourceType};
use blueprint_contracts::config_rule::Evaluation;
use blueprint_lambda::adapters::config_service::{ConfigHistory, EvaluationSink};
use blueprint_lambda::handlers::config_rule_change;
use blueprint_lambda::logging::{log_error, log_info};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct ConfigServiceClient {
    config_client: aws_sdk_config::Client,
}

impl ConfigHistory for ConfigServiceClient {
    fn latest_configuration(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Value, String> {
        let client = self.config_client.clone();
        let resource_type = ResourceType::from(resource_type);
        let resource_id = resource_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_resource_config_history()
                    .resource_type(resource_type)
                    .resource_id(resource_id.clone())
                    .limit(1)
                    .send()
                    .await
                    .map_err(|error| format!("failed to fetch configuration history: {error}"))?;
                let item = output
                    .configuration_items()
                    .first()
                    .ok_or_else(|| format!("Configuration history for {resource_id} is empty"))?;
                Ok(configuration_item_json(item))
            })
        })
    }
}

/// Flattens a typed history entry back into the JSON shape an inline change
/// notification delivers. Timestamps become epoch seconds.
fn configuration_item_json(item: &ConfigurationItem) -> Value {
    let relationships: Vec<Value> = item
        .relationships()
        .iter()
        .map(|relationship| {
            json!({
                "relationshipName": relationship.relationship_name(),
                "resourceType": relationship.resource_type().map(|value| value.as_str()),
                "resourceId": relationship.resource_id(),
                "resourceName": relationship.resource_name(),
            })
        })
        .collect();

    json!({
        "version": item.version(),
        "accountId": item.account_id(),
        "configurationItemCaptureTime": item.configuration_item_capture_time().map(|time| time.as_secs_f64()),
        "configurationItemStatus": item.configuration_item_status().map(|status| status.as_str()),
        "configurationStateId": item.configuration_state_id(),
        "configurationItemMD5Hash": item.configuration_item_md5_hash(),
        "arn": item.arn(),
        "resourceType": item.resource_type().map(|value| value.as_str()),
        "resourceId": item.resource_id(),
        "resourceName": item.resource_name(),
        "awsRegion": item.aws_region(),
        "availabilityZone": item.availability_zone(),
        "resourceCreationTime": item.resource_creation_time().map(|time| time.as_secs_f64()),
        "configuration": item.configuration(),
        "relationships": relationships,
    })
}

impl EvaluationSink for ConfigServiceClient {
    fn put_evaluations(
        &self,
        evaluations: &[Evaluation],
        result_token: &str,
    ) -> Result<Vec<Value>, String> {
        let mut api_evaluations = Vec::with_capacity(evaluations.len());
        for evaluation in evaluations {
            let mut builder = ApiEvaluation::builder()
                .compliance_resource_type(evaluation.compliance_resource_type.clone())
                .compliance_resource_id(evaluation.compliance_resource_id.clone())
                .compliance_type(ComplianceType::from(evaluation.compliance_type.as_str()))
                .ordering_timestamp(ordering_timestamp(&evaluation.ordering_timestamp)?);
            if let Some(annotation) = &evaluation.annotation {
                builder = builder.annotation(annotation.clone());
            }
            api_evaluations.push(
                builder
                    .build()
                    .map_err(|error| format!("invalid evaluation: {error}"))?,
            );
        }

        let client = self.config_client.clone();
        let token = result_token.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .put_evaluations()
                    .set_evaluations(Some(api_evaluations))
                    .result_token(token)
                    .send()
                    .await
                    .map_err(|error| format!("failed to put evaluations: {error}"))?;
                Ok(output
                    .failed_evaluations()
                    .iter()
                    .map(failed_evaluation_json)
                    .collect())
            })
        })
    }
}

fn ordering_timestamp(value: &Value) -> Result<DateTime, String> {
    match value {
        Value::String(text) => DateTime::from_str(text, DateTimeFormat::DateTime)
            .map_err(|error| format!("invalid ordering timestamp: {error}")),
        Value::Number(number) => number
            .as_f64()
            .map(DateTime::from_secs_f64)
            .ok_or_else(|| "invalid ordering timestamp".to_string()),
        _ => Err("Evaluation is missing its ordering timestamp".to_string()),
    }
}

fn failed_evaluation_json(evaluation: &ApiEvaluation) -> Value {
    json!({
        "ComplianceResourceType": evaluation.compliance_resource_type(),
        "ComplianceResourceId": evaluation.compliance_resource_id(),
        "ComplianceType": evaluation.compliance_type().as_str(),
        "Annotation": evaluation.annotation(),
    })
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let service = ConfigServiceClient {
        config_client: aws_sdk_config::Client::new(&config),
    };

    match config_rule_change::handle(&event.payload, &service, &service) {
        Ok(compliance) => {
            log_info("config_rule_change", "evaluation_reported", json!({"compliance": compliance}));
            Ok(compliance)
        }
        Err(error) => {
            log_error("config_rule_change", "evaluation_failed", json!({"error": error}));
            Err(Error::from(error))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
