//! Reports the content type of objects named by storage notifications.

use blueprint_contracts::records::object_references;
use serde_json::Value;

use crate::adapters::object_info::ObjectInfoStore;

/// Fetches the content type of every referenced object and returns the last
/// one. Object keys are URL-decoded before the lookup.
pub fn handle(event: &Value, store: &dyn ObjectInfoStore) -> Result<Value, String> {
    let references = object_references(event).map_err(|error| error.message().to_string())?;

    let mut content_type = Value::Null;
    for reference in &references {
        match store.content_type(&reference.bucket, &reference.key) {
            Ok(found) => content_type = Value::from(found),
            Err(_) => {
                return Err(format!(
                    "Error getting object {} from bucket {}. Make sure they exist and your bucket is in the same region as this function.",
                    reference.key, reference.bucket
                ));
            }
        }
    }
    Ok(content_type)
}
