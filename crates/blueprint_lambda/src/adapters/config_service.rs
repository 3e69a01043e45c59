use blueprint_contracts::config_rule::Evaluation;
use serde_json::Value;

/// Configuration-history lookup for oversized change notifications.
pub trait ConfigHistory {
    /// Most recent recorded configuration for the resource.
    fn latest_configuration(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Value, String>;
}

pub trait EvaluationSink {
    /// Reports evaluations under the invocation's result token and returns
    /// whatever evaluations the service refused.
    fn put_evaluations(
        &self,
        evaluations: &[Evaluation],
        result_token: &str,
    ) -> Result<Vec<Value>, String>;
}
