use serde_json::{Map, Value};

/// Persistence seam for session attributes, keyed by the skill user's id.
///
/// When a skill is configured with a store, attributes load at the start of
/// a fresh session and save at response time once the session ends (or on
/// every response when the skill asks for that).
pub trait AttributeStore {
    fn load(&self, user_id: &str) -> Result<Map<String, Value>, String>;
    fn save(&self, user_id: &str, attributes: &Map<String, Value>) -> Result<(), String>;
}
