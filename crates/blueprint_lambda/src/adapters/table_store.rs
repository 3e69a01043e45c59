use serde_json::Value;

/// Document-style table operations. Each payload carries its own
/// `TableName` and operation parameters, mirroring the request bodies the
/// CRUD endpoints accept.
pub trait TableStore {
    fn delete_item(&self, payload: &Value) -> Result<Value, String>;
    fn put_item(&self, payload: &Value) -> Result<Value, String>;
    fn update_item(&self, payload: &Value) -> Result<Value, String>;
    fn scan(&self, payload: &Value) -> Result<Value, String>;
}
