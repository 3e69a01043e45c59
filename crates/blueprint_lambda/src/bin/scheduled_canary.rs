use blueprint_lambda::adapters::page_fetcher::PageFetcher;
use blueprint_lambda::handlers::scheduled_canary;
use blueprint_lambda::logging::{log_error, log_info};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct HttpPageFetcher {
    client: reqwest::Client,
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str) -> Result<String, String> {
        let request = self.client.get(url);
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = request
                    .send()
                    .await
                    .map_err(|error| format!("failed to fetch page: {error}"))?;
                response
                    .text()
                    .await
                    .map_err(|error| format!("failed to read page body: {error}"))
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let site =
        std::env::var("CANARY_SITE").map_err(|_| Error::from("CANARY_SITE must be configured"))?;
    let expected = std::env::var("CANARY_EXPECTED")
        .map_err(|_| Error::from("CANARY_EXPECTED must be configured"))?;

    let fetcher = HttpPageFetcher {
        client: reqwest::Client::new(),
    };

    match scheduled_canary::handle(&event.payload, &site, &expected, &fetcher) {
        Ok(time) => {
            log_info("scheduled_canary", "check_passed", json!({"site": site, "time": time}));
            Ok(time)
        }
        Err(error) => {
            log_error("scheduled_canary", "check_failed", json!({"site": site, "error": error}));
            Err(Error::from(error))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
