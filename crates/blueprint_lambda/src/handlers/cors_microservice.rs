//! The table-backed CRUD endpoint, served to browsers from several
//! whitelisted origins.
//!
//! OPTIONS requests are answered with the preflight response; every other
//! response carries the computed allow-origin header on top of whatever the
//! table operation produced.

use blueprint_contracts::apigw::{request_method, GatewayResponse};
use blueprint_contracts::cors::{origin_from_event, origin_header, preflight_response};
use serde_json::Value;

use crate::adapters::table_store::TableStore;
use crate::handlers::http_microservice;

pub const ALLOWED_METHODS: [&str; 5] = ["OPTIONS", "DELETE", "GET", "POST", "PUT"];

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Parses a comma-separated origin whitelist, as configured in the
    /// environment. Wildcards stay intact for pattern matching.
    pub fn from_patterns(patterns: &str) -> CorsConfig {
        CorsConfig {
            allowed_origins: patterns
                .split(',')
                .map(str::trim)
                .filter(|pattern| !pattern.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

pub fn handle(
    event: Value,
    config: &CorsConfig,
    table_name: &str,
    store: &dyn TableStore,
) -> GatewayResponse {
    let origin = origin_from_event(&event).map(str::to_string);
    let allowed: Vec<&str> = config.allowed_origins.iter().map(String::as_str).collect();

    let is_preflight = request_method(&event)
        .map(|method| method == "OPTIONS")
        .unwrap_or(false);
    if is_preflight {
        return preflight_response(origin.as_deref(), &allowed, &ALLOWED_METHODS, None, None);
    }

    let mut response = http_microservice::handle(event, table_name, store);
    if let Some(headers) = response.headers.as_object_mut() {
        for (name, value) in origin_header(origin.as_deref(), &allowed) {
            headers.insert(name, value);
        }
    }
    response
}
