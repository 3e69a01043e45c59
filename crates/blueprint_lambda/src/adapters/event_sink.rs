/// Delivery seam for a batch of collector envelopes rendered as one request
/// body.
pub trait EventSink {
    fn send(&self, body: &str) -> Result<(), String>;
}
