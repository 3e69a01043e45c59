//! Edge redirect keyed on the viewer-country header.
//!
//! The header is only present once the distribution forwards it, so a
//! missing header falls back to the default site.

use blueprint_contracts::cloudfront::{first_header_value, redirect_response, viewer_request};
use serde_json::Value;

pub fn handle(event: &Value) -> Result<Value, String> {
    let request = viewer_request(event).map_err(|error| error.message().to_string())?;

    let url = match first_header_value(&request, "cloudfront-viewer-country") {
        Some("TW") => "https://tw.example.com/",
        Some("US") => "https://us.example.com/",
        _ => "https://example.com/",
    };
    Ok(redirect_response(url))
}
