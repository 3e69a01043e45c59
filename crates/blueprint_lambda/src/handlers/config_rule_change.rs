//! Change-triggered compliance rule for instance types.
//!
//! Inline change notifications carry the configuration item directly.
//! Oversized notifications only name the resource, so the latest item is
//! fetched from the configuration history and reshaped first. The verdict is
//! reported through the evaluations API before the handler returns it.

use blueprint_contracts::config_rule::{
    convert_api_configuration, evaluate_instance_type, inline_configuration_item, is_applicable,
    is_oversized_notification, oversized_item_summary, Evaluation, RuleEvent, NOT_APPLICABLE,
};
use serde_json::{json, Value};

use crate::adapters::config_service::{ConfigHistory, EvaluationSink};

pub fn handle(
    event: &Value,
    history: &dyn ConfigHistory,
    sink: &dyn EvaluationSink,
) -> Result<Value, String> {
    let rule_event = RuleEvent::parse(event).map_err(|error| error.message().to_string())?;
    let invoking_event = rule_event
        .invoking_event()
        .map_err(|error| error.message().to_string())?;
    let rule_parameters = rule_event
        .rule_parameters()
        .map_err(|error| error.message().to_string())?;

    let configuration_item = if is_oversized_notification(&invoking_event) {
        let summary =
            oversized_item_summary(&invoking_event).map_err(|error| error.message().to_string())?;
        let api_configuration =
            history.latest_configuration(&summary.resource_type, &summary.resource_id)?;
        convert_api_configuration(&api_configuration)
            .map_err(|error| error.message().to_string())?
    } else {
        inline_configuration_item(&invoking_event)
            .map_err(|error| error.message().to_string())?
    };

    let compliance = if is_applicable(&configuration_item, &rule_event) {
        evaluate_instance_type(&configuration_item, &rule_parameters)
            .map_err(|error| error.message().to_string())?
    } else {
        NOT_APPLICABLE
    };

    let evaluation = Evaluation::for_item(&configuration_item, compliance);
    let refused = sink.put_evaluations(&[evaluation], &rule_event.result_token)?;
    if !refused.is_empty() {
        return Err(format!("Failed evaluations: {}", json!(refused)));
    }

    Ok(json!(compliance))
}
