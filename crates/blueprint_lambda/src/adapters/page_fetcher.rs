pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String, String>;
}
