pub trait ObjectInfoStore {
    fn content_type(&self, bucket: &str, key: &str) -> Result<String, String>;
}
