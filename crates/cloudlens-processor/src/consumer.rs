//! SQS event consumer.
//!
//! Long-polls the notification queue and hands each message's record batch
//! to the pipeline. The loop stays deliberately dumb: all routing and
//! failure policy lives in the pipeline. A message is deleted once every
//! record in it reached a non-failed terminal state; otherwise it is left
//! for redelivery after the visibility timeout.

use anyhow::Context;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::types::Message;
use aws_sdk_sqs::Client as SqsClient;
use std::time::Duration;

use cloudlens_core::Config;
use cloudlens_pipeline::{ModerationPipeline, ObjectCreatedEvent, PipelineOutcome};

const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_secs(5);
const MAX_MESSAGES_PER_POLL: i32 = 10;

pub async fn run(config: &Config, pipeline: ModerationPipeline) -> Result<(), anyhow::Error> {
    let queue_url = config
        .queue_url
        .clone()
        .context("QUEUE_URL must be set to consume object-created events")?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.aws_region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    let aws_config = loader.load().await;
    let client = SqsClient::new(&aws_config);

    tracing::info!(queue_url = %queue_url, "Event consumer started");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received, stopping consumer");
                break;
            }
            result = client
                .receive_message()
                .queue_url(&queue_url)
                .max_number_of_messages(MAX_MESSAGES_PER_POLL)
                .wait_time_seconds(config.queue_wait_time_secs)
                .send() =>
            {
                let response = match result {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to receive messages, backing off");
                        tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                        continue;
                    }
                };

                for message in response.messages() {
                    handle_message(&client, &queue_url, &pipeline, message).await;
                }
            }
        }
    }

    Ok(())
}

async fn handle_message(
    client: &SqsClient,
    queue_url: &str,
    pipeline: &ModerationPipeline,
    message: &Message,
) {
    let Some(body) = message.body() else {
        delete_message(client, queue_url, message).await;
        return;
    };

    let event = match ObjectCreatedEvent::from_json(body) {
        Ok(event) => event,
        Err(e) => {
            // Not a notification we understand; drop it rather than poison
            // the queue
            tracing::warn!(error = %e, "Discarding unparseable message");
            delete_message(client, queue_url, message).await;
            return;
        }
    };

    let outcomes = pipeline.process_batch(&event).await;
    let failed = outcomes
        .iter()
        .flatten()
        .filter(|outcome| matches!(outcome, PipelineOutcome::Failed { .. }))
        .count();

    if failed > 0 {
        tracing::warn!(
            failed = failed,
            total = outcomes.len(),
            "Leaving message for redelivery"
        );
        return;
    }

    delete_message(client, queue_url, message).await;
}

async fn delete_message(client: &SqsClient, queue_url: &str, message: &Message) {
    let Some(handle) = message.receipt_handle() else {
        return;
    };
    if let Err(e) = client
        .delete_message()
        .queue_url(queue_url)
        .receipt_handle(handle)
        .send()
        .await
    {
        tracing::error!(error = %e, "Failed to delete message from queue");
    }
}
