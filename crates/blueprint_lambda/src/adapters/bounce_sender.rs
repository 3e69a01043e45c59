/// A bounce to send back for one received message. Every listed recipient
/// is bounced as content-rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BounceRequest {
    pub bounce_sender: String,
    pub original_message_id: String,
    pub reporting_mta: String,
    pub recipients: Vec<String>,
}

pub trait BounceSender {
    /// Sends the bounce and returns the bounce message id.
    fn send_bounce(&self, request: &BounceRequest) -> Result<String, String>;
}
