//! TOKEN authorizer for an API gateway.
//!
//! The bearer token picks the outcome: `allow` and `deny` produce IAM
//! policies over the whole API named by the method ARN, `unauthorized`
//! produces the gateway's 401 sentinel error, and anything else its 500
//! sentinel.

use blueprint_contracts::authorizer::{parse_method_arn, PolicyBuilder};
use blueprint_contracts::validation::ValidationError;
use serde_json::{json, Value};

const PRINCIPAL_ID: &str = "user|a1b2c3d4";

pub fn handle(event: &Value) -> Result<Value, String> {
    let token = event
        .get("authorizationToken")
        .and_then(Value::as_str)
        .ok_or_else(|| "Event does not carry an authorizationToken".to_string())?;
    let method_arn = event
        .get("methodArn")
        .and_then(Value::as_str)
        .ok_or_else(|| "Event does not carry a methodArn".to_string())?;

    match token.to_ascii_lowercase().as_str() {
        "allow" => allow_policy(method_arn).map_err(|error| error.message().to_string()),
        "deny" => deny_policy(method_arn).map_err(|error| error.message().to_string()),
        // The gateway maps this exact string to a 401.
        "unauthorized" => Err("Unauthorized".to_string()),
        _ => Err("Error: Invalid token".to_string()),
    }
}

fn allow_policy(method_arn: &str) -> Result<Value, ValidationError> {
    let arn = parse_method_arn(method_arn)?;
    let mut builder = PolicyBuilder::new(PRINCIPAL_ID, &arn);
    builder.allow_all_methods()?;
    builder.with_context("stringKey", json!("stringval"))?;
    builder.with_context("numberKey", json!(123))?;
    builder.with_context("booleanKey", json!(true))?;
    builder.build()
}

fn deny_policy(method_arn: &str) -> Result<Value, ValidationError> {
    let arn = parse_method_arn(method_arn)?;
    let mut builder = PolicyBuilder::new(PRINCIPAL_ID, &arn);
    builder.deny_all_methods()?;
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHOD_ARN: &str = "arn:aws:execute-api:us-east-1:123456789012:abcdef123/dev/GET/users";

    fn authorizer_event(token: &str) -> Value {
        json!({
            "type": "TOKEN",
            "authorizationToken": token,
            "methodArn": METHOD_ARN,
        })
    }

    #[test]
    fn allow_tokens_grant_the_whole_api_with_context() {
        let policy = handle(&authorizer_event("Allow")).expect("policy should build");

        assert_eq!(policy["principalId"], PRINCIPAL_ID);
        assert_eq!(policy["policyDocument"]["Statement"][0]["Effect"], "Allow");
        assert_eq!(
            policy["policyDocument"]["Statement"][0]["Resource"][0],
            "arn:aws:execute-api:us-east-1:123456789012:abcdef123/dev/*/*"
        );
        assert_eq!(policy["context"]["stringKey"], "stringval");
        assert_eq!(policy["context"]["numberKey"], 123);
        assert_eq!(policy["context"]["booleanKey"], true);
    }

    #[test]
    fn deny_tokens_deny_the_whole_api_without_context() {
        let policy = handle(&authorizer_event("deny")).expect("policy should build");

        assert_eq!(policy["policyDocument"]["Statement"][0]["Effect"], "Deny");
        assert!(policy.get("context").is_none());
    }

    #[test]
    fn unauthorized_tokens_produce_the_401_sentinel() {
        let error = handle(&authorizer_event("unauthorized")).expect_err("token should fail");
        assert_eq!(error, "Unauthorized");
    }

    #[test]
    fn unknown_tokens_produce_the_500_sentinel() {
        let error = handle(&authorizer_event("squeeze")).expect_err("token should fail");
        assert_eq!(error, "Error: Invalid token");
    }

    #[test]
    fn malformed_method_arns_surface_their_parse_error() {
        let event = json!({"authorizationToken": "allow", "methodArn": "arn:aws:lambda"});
        let error = handle(&event).expect_err("arn should fail");
        assert!(error.contains("malformed"));
    }

    #[test]
    fn events_without_a_token_are_rejected() {
        let error = handle(&json!({"methodArn": METHOD_ARN})).expect_err("event should fail");
        assert_eq!(error, "Event does not carry an authorizationToken");
    }
}
