use blueprint_contracts::records::QueueMessage;

pub trait QueueClient {
    fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        visibility_timeout: i32,
    ) -> Result<Vec<QueueMessage>, String>;

    fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> Result<(), String>;
}
