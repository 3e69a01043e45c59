use serde_json::json;

/// Structured log line on stderr, one JSON object per event.
pub fn log_info(component: &str, event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": component,
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

pub fn log_error(component: &str, event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": component,
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
