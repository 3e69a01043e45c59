use regex::Regex;
use serde_json::{json, Map, Value};

use crate::validation::ValidationError;

pub const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";
const RESOURCE_PATH_PATTERN: &str = r"^[/.a-zA-Z0-9*-]+$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Head,
    Delete,
    Options,
    All,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Head => "HEAD",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::All => "*",
        }
    }
}

/// The coordinates a gateway authorizer event carries in its method ARN:
/// `arn:aws:execute-api:{region}:{account}:{apiId}/{stage}/{verb}/{resource}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodArn {
    pub region: String,
    pub aws_account_id: String,
    pub rest_api_id: String,
    pub stage: String,
}

pub fn parse_method_arn(method_arn: &str) -> Result<MethodArn, ValidationError> {
    let segments: Vec<&str> = method_arn.split(':').collect();
    if segments.len() < 6 {
        return Err(ValidationError::new(format!(
            "Method ARN '{method_arn}' is malformed"
        )));
    }

    let api_segments: Vec<&str> = segments[5].splitn(3, '/').collect();
    if api_segments.len() < 2 {
        return Err(ValidationError::new(format!(
            "Method ARN '{method_arn}' does not carry an API id and stage"
        )));
    }

    Ok(MethodArn {
        region: segments[3].to_string(),
        aws_account_id: segments[4].to_string(),
        rest_api_id: api_segments[0].to_string(),
        stage: api_segments[1].to_string(),
    })
}

#[derive(Debug, Clone)]
struct PolicyMethod {
    resource_arn: String,
    conditions: Option<Value>,
}

/// Assembles the IAM policy document an authorizer hands back to the
/// gateway, from explicit allow and deny method lists.
pub struct PolicyBuilder {
    principal_id: String,
    method_arn: MethodArn,
    path_pattern: Regex,
    allow_methods: Vec<PolicyMethod>,
    deny_methods: Vec<PolicyMethod>,
    context: Map<String, Value>,
}

impl PolicyBuilder {
    pub fn new(principal_id: impl Into<String>, method_arn: &MethodArn) -> Self {
        Self {
            principal_id: principal_id.into(),
            method_arn: method_arn.clone(),
            path_pattern: Regex::new(RESOURCE_PATH_PATTERN)
                .expect("resource path pattern should compile"),
            allow_methods: Vec::new(),
            deny_methods: Vec::new(),
            context: Map::new(),
        }
    }

    pub fn allow_all_methods(&mut self) -> Result<(), ValidationError> {
        self.add_method(Effect::Allow, HttpVerb::All, "*", None)
    }

    pub fn deny_all_methods(&mut self) -> Result<(), ValidationError> {
        self.add_method(Effect::Deny, HttpVerb::All, "*", None)
    }

    pub fn allow_method(&mut self, verb: HttpVerb, resource: &str) -> Result<(), ValidationError> {
        self.add_method(Effect::Allow, verb, resource, None)
    }

    pub fn deny_method(&mut self, verb: HttpVerb, resource: &str) -> Result<(), ValidationError> {
        self.add_method(Effect::Deny, verb, resource, None)
    }

    /// Conditional grants get their own statement in the built document.
    pub fn allow_method_with_conditions(
        &mut self,
        verb: HttpVerb,
        resource: &str,
        conditions: Value,
    ) -> Result<(), ValidationError> {
        self.add_method(Effect::Allow, verb, resource, Some(conditions))
    }

    pub fn deny_method_with_conditions(
        &mut self,
        verb: HttpVerb,
        resource: &str,
        conditions: Value,
    ) -> Result<(), ValidationError> {
        self.add_method(Effect::Deny, verb, resource, Some(conditions))
    }

    /// Context values surface to the backend integration as
    /// `$context.authorizer.<key>`; the gateway accepts only scalars there.
    pub fn with_context(&mut self, key: impl Into<String>, value: Value) -> Result<(), ValidationError> {
        if !(value.is_string() || value.is_number() || value.is_boolean()) {
            return Err(ValidationError::new(
                "Policy context values must be strings, numbers, or booleans",
            ));
        }
        self.context.insert(key.into(), value);
        Ok(())
    }

    pub fn build(&self) -> Result<Value, ValidationError> {
        if self.allow_methods.is_empty() && self.deny_methods.is_empty() {
            return Err(ValidationError::new("No statements defined for the policy"));
        }

        let mut statements = Vec::new();
        statements.extend(statements_for_effect("Allow", &self.allow_methods));
        statements.extend(statements_for_effect("Deny", &self.deny_methods));

        let mut response = Map::new();
        response.insert(
            "principalId".to_string(),
            Value::String(self.principal_id.clone()),
        );
        response.insert(
            "policyDocument".to_string(),
            json!({
                "Version": POLICY_VERSION,
                "Statement": statements,
            }),
        );
        if !self.context.is_empty() {
            response.insert("context".to_string(), Value::Object(self.context.clone()));
        }
        Ok(Value::Object(response))
    }

    fn add_method(
        &mut self,
        effect: Effect,
        verb: HttpVerb,
        resource: &str,
        conditions: Option<Value>,
    ) -> Result<(), ValidationError> {
        if !self.path_pattern.is_match(resource) {
            return Err(ValidationError::new(format!(
                "Invalid resource path: '{resource}'. Paths must match {RESOURCE_PATH_PATTERN}"
            )));
        }

        let cleaned = resource.strip_prefix('/').unwrap_or(resource);
        let arn = &self.method_arn;
        let resource_arn = format!(
            "arn:aws:execute-api:{}:{}:{}/{}/{}/{}",
            arn.region,
            arn.aws_account_id,
            arn.rest_api_id,
            arn.stage,
            verb.as_str(),
            cleaned
        );

        let method = PolicyMethod {
            resource_arn,
            conditions,
        };
        match effect {
            Effect::Allow => self.allow_methods.push(method),
            Effect::Deny => self.deny_methods.push(method),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Effect {
    Allow,
    Deny,
}

fn statements_for_effect(effect: &str, methods: &[PolicyMethod]) -> Vec<Value> {
    let mut statements = Vec::new();

    let plain: Vec<&PolicyMethod> = methods.iter().filter(|m| m.conditions.is_none()).collect();
    if !plain.is_empty() {
        let resources: Vec<&str> = plain.iter().map(|m| m.resource_arn.as_str()).collect();
        statements.push(json!({
            "Action": INVOKE_ACTION,
            "Effect": effect,
            "Resource": resources,
        }));
    }

    for method in methods.iter().filter(|m| m.conditions.is_some()) {
        statements.push(json!({
            "Action": INVOKE_ACTION,
            "Effect": effect,
            "Resource": [method.resource_arn.clone()],
            "Condition": method.conditions.clone(),
        }));
    }

    statements
}
