use aws_sdk_ses::primitives::DateTime;
use aws_sdk_ses::types::{BounceType, BouncedRecipientInfo, MessageDsn};
use blueprint_lambda::adapters::bounce_sender::{BounceRequest, BounceSender};
use blueprint_lambda::handlers::ses_spam_filter;
use blueprint_lambda::logging::{log_error, log_info};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct SesBounceSender {
    ses_client: aws_sdk_ses::Client,
}

impl BounceSender for SesBounceSender {
    fn send_bounce(&self, request: &BounceRequest) -> Result<String, String> {
        let message_dsn = MessageDsn::builder()
            .reporting_mta(request.reporting_mta.clone())
            .arrival_date(DateTime::from_secs(chrono::Utc::now().timestamp()))
            .build()
            .map_err(|error| format!("invalid bounce request: {error}"))?;

        let mut recipients = Vec::with_capacity(request.recipients.len());
        for recipient in &request.recipients {
            recipients.push(
                BouncedRecipientInfo::builder()
                    .recipient(recipient.clone())
                    .bounce_type(BounceType::ContentRejected)
                    .build()
                    .map_err(|error| format!("invalid bounce request: {error}"))?,
            );
        }

        let client = self.ses_client.clone();
        let bounce_sender = request.bounce_sender.clone();
        let original_message_id = request.original_message_id.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .send_bounce()
                    .original_message_id(original_message_id)
                    .bounce_sender(bounce_sender)
                    .message_dsn(message_dsn)
                    .set_bounced_recipient_info_list(Some(recipients))
                    .send()
                    .await
                    .map_err(|error| format!("failed to send bounce: {error}"))?;
                Ok(output.message_id().unwrap_or_default().to_string())
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let domain = std::env::var("EMAIL_DOMAIN").unwrap_or_else(|_| "example.com".to_string());

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let sender = SesBounceSender {
        ses_client: aws_sdk_ses::Client::new(&config),
    };

    match ses_spam_filter::handle(&event.payload, &domain, &sender) {
        Ok(disposition) => {
            log_info("ses_spam_filter", "message_processed", json!({"disposition": disposition}));
            Ok(disposition)
        }
        Err(error) => {
            log_error("ses_spam_filter", "bounce_failed", json!({"error": error}));
            Err(Error::from(error))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
