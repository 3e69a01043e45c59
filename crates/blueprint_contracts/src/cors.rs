use regex::Regex;
use serde_json::{Map, Value};

use crate::apigw::{request_headers, GatewayResponse};

/// Headers allowed by default for preflight responses, matching the set the
/// gateway console whitelists for signed requests.
pub const DEFAULT_ALLOWED_HEADERS: [&str; 5] = [
    "Content-Type",
    "X-Amz-Date",
    "Authorization",
    "X-Api-Key",
    "X-Amz-Security-Token",
];

pub fn origin_from_event(event: &Value) -> Option<&str> {
    let headers = request_headers(event)?;
    headers
        .get("Origin")
        .or_else(|| headers.get("origin"))
        .and_then(Value::as_str)
}

/// Compiles an origin pattern into a regular expression that matches exactly
/// the input, except each `*` matches any run of URL-unreserved characters.
///
/// `https://*.example.com` matches `https://abc.xyz.example.com` but not
/// `https://example.com`, and the wildcard cannot cross `/`, so path tricks
/// like `https://my.site/x.example.com` do not match.
pub fn compile_url_wildcards(pattern: &str) -> Regex {
    // Unreserved characters per RFC 3986 section 2.3.
    let wildcard = r"[A-Za-z0-9\-._~]*";
    let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
    Regex::new(&format!("^{}$", escaped.join(wildcard)))
        .expect("escaped origin pattern should compile")
}

/// Returns `Access-Control-Allow-Origin` when the request origin matches an
/// allowed pattern, and an empty header map otherwise. A missing or
/// unrecognized origin yields no header at all, never a reflected `null`.
pub fn origin_header(origin: Option<&str>, allowed_origins: &[&str]) -> Map<String, Value> {
    let mut headers = Map::new();
    let Some(origin) = origin else {
        return headers;
    };

    let is_allowed = allowed_origins
        .iter()
        .any(|pattern| compile_url_wildcards(pattern).is_match(origin));
    if is_allowed {
        headers.insert(
            "Access-Control-Allow-Origin".to_string(),
            Value::String(origin.to_string()),
        );
    }
    headers
}

pub fn preflight_response(
    origin: Option<&str>,
    allowed_origins: &[&str],
    allowed_methods: &[&str],
    allowed_headers: Option<&[&str]>,
    max_age: Option<u64>,
) -> GatewayResponse {
    let mut headers = origin_header(origin, allowed_origins);
    let allowed_headers = allowed_headers.unwrap_or(&DEFAULT_ALLOWED_HEADERS);
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        Value::String(allowed_headers.join(",")),
    );
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        Value::String(allowed_methods.join(",")),
    );
    if let Some(max_age) = max_age {
        headers.insert("Access-Control-Max-Age".to_string(), Value::from(max_age));
    }

    GatewayResponse {
        status_code: 204,
        headers: Value::Object(headers),
        body: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn origin_header_for_missing_origin_is_empty() {
        let headers = origin_header(None, &[]);
        assert!(headers.is_empty());
    }

    #[test]
    fn origin_header_for_single_allowed_origin() {
        let origin = "https://amazon.com";
        let headers = origin_header(Some(origin), &[origin]);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["Access-Control-Allow-Origin"], origin);
    }

    #[test]
    fn origin_header_for_one_of_several_origins() {
        let origin = "https://amazon.com";
        let allowed = ["https://example.com", origin, "http://amazon.com"];
        let headers = origin_header(Some(origin), &allowed);
        assert_eq!(headers["Access-Control-Allow-Origin"], origin);
    }

    #[test]
    fn origin_header_with_no_allowed_origins_is_empty() {
        let headers = origin_header(Some("https://not-amazon.com"), &[]);
        assert!(headers.is_empty());
    }

    #[test]
    fn origin_header_for_disallowed_origin_is_empty() {
        let allowed = ["https://example.com", "https://amazon.com", "http://amazon.com"];
        let headers = origin_header(Some("https://not-amazon.com"), &allowed);
        assert!(headers.is_empty());
    }

    #[test]
    fn preflight_response_joins_methods_and_headers() {
        let origin = "https://amazon.com";
        let allowed_headers = ["Authorization"];
        let response = preflight_response(
            Some(origin),
            &[origin],
            &["CREATE", "OPTIONS"],
            Some(&allowed_headers),
            Some(8400),
        );

        assert_eq!(response.status_code, 204);
        assert_eq!(
            response.headers,
            json!({
                "Access-Control-Allow-Origin": origin,
                "Access-Control-Allow-Methods": "CREATE,OPTIONS",
                "Access-Control-Allow-Headers": "Authorization",
                "Access-Control-Max-Age": 8400,
            })
        );
    }

    #[test]
    fn preflight_response_defaults_the_allowed_headers() {
        let origin = "https://amazon.com";
        let response = preflight_response(Some(origin), &[origin], &["OPTIONS", "DELETE"], None, None);

        assert_eq!(
            response.headers["Access-Control-Allow-Headers"],
            "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token"
        );
        assert_eq!(response.headers["Access-Control-Allow-Methods"], "OPTIONS,DELETE");
        assert!(response.headers.get("Access-Control-Max-Age").is_none());
    }

    #[test]
    fn compile_pattern_without_wildcards() {
        let pattern = compile_url_wildcards("https://amazon.com");
        assert!(pattern.is_match("https://amazon.com"));
        assert!(!pattern.is_match("https://example.com"));
    }

    #[test]
    fn compile_pattern_with_bare_wildcard() {
        let pattern = compile_url_wildcards("https://*");
        assert!(pattern.is_match("https://example.com"));
    }

    #[test]
    fn compile_pattern_with_subdomain_wildcard() {
        let pattern = compile_url_wildcards("https://*.amazon.com");
        assert!(pattern.is_match("https://restaurants.amazon.com"));
        assert!(pattern.is_match("https://x.y.z.amazon.com"));
        assert!(!pattern.is_match("https://amazon.com"));
        assert!(!pattern.is_match("https://restaurants.example.com"));
    }

    #[test]
    fn subdomain_wildcard_rejects_path_tricks() {
        let pattern = compile_url_wildcards("https://*.amazon.com");
        assert!(pattern.is_match("https://restaurants.amazon.com"));
        assert!(!pattern.is_match("https://my.website/restaurants.amazon.com"));
    }

    #[test]
    fn origin_from_event_reads_either_header_casing() {
        let event = json!({"headers": {"Origin": "https://amazon.com"}});
        assert_eq!(origin_from_event(&event), Some("https://amazon.com"));

        let event = json!({"headers": {"origin": "https://amazon.com"}});
        assert_eq!(origin_from_event(&event), Some("https://amazon.com"));

        let event = json!({"headers": {}});
        assert_eq!(origin_from_event(&event), None);
    }
}
