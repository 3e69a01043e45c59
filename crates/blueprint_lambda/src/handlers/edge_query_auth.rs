//! Edge rewrite that moves an `auth` query parameter into a request header.
//!
//! Origins that expect the credential in a header can then read it there;
//! the parameter is removed from the query string so it never reaches the
//! origin twice. Requests without the parameter pass through untouched.

use blueprint_contracts::cloudfront::{
    join_querystring, parse_querystring, request_querystring, set_header,
    set_request_querystring, viewer_request,
};
use serde_json::Value;

const AUTH_PARAMETER: &str = "auth";
const AUTH_HEADER: &str = "Auth-Header";

pub fn handle(event: &Value) -> Result<Value, String> {
    let mut request = viewer_request(event).map_err(|error| error.message().to_string())?;

    let params = parse_querystring(request_querystring(&request));
    let Some(auth) = params
        .iter()
        .find(|(name, _)| name == AUTH_PARAMETER)
        .map(|(_, value)| value.clone())
    else {
        return Ok(request);
    };

    set_header(&mut request, AUTH_HEADER, &auth);

    let remaining: Vec<(String, String)> = params
        .into_iter()
        .filter(|(name, _)| name != AUTH_PARAMETER)
        .collect();
    set_request_querystring(&mut request, &join_querystring(&remaining));

    Ok(request)
}
