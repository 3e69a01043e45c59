//! HTTP event collector client used by the log-forwarding endpoints.

use crate::adapters::event_sink::EventSink;

pub struct HttpEventCollector {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl HttpEventCollector {
    pub fn new(url: String, token: String) -> HttpEventCollector {
        HttpEventCollector {
            client: reqwest::Client::new(),
            url,
            token,
        }
    }
}

impl EventSink for HttpEventCollector {
    fn send(&self, body: &str) -> Result<(), String> {
        let request = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Splunk {}", self.token))
            .body(body.to_string());
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = request
                    .send()
                    .await
                    .map_err(|error| format!("failed to reach the event collector: {error}"))?;
                let status = response.status();
                if !status.is_success() {
                    let detail = response.text().await.unwrap_or_default();
                    return Err(format!("error: statusCode={}\n\n{}", status.as_u16(), detail));
                }
                Ok(())
            })
        })
    }
}
