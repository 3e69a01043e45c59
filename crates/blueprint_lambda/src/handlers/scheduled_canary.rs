//! Scheduled canary that fetches a page and checks it for expected content.

use blueprint_contracts::records::scheduled_time;
use serde_json::{json, Value};

use crate::adapters::page_fetcher::PageFetcher;

/// Fetches `site` and verifies the body contains `expected`. Returns the
/// schedule time that triggered the check so the invocation log records it.
pub fn handle(
    event: &Value,
    site: &str,
    expected: &str,
    fetcher: &dyn PageFetcher,
) -> Result<Value, String> {
    let time = scheduled_time(event).map_err(|error| error.message().to_string())?;

    let page = fetcher.fetch(site)?;
    if !page.contains(expected) {
        return Err("Validation failed".to_string());
    }
    Ok(json!(time))
}
