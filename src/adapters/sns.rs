use crate::domain::ports::AlertSink;
use crate::utils::error::{MonitorError, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::config::retry::RetryConfig;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client as SnsClient;

/// Publishes alerts to an SNS topic. Without a topic every alert is skipped
/// with a warning.
#[derive(Debug, Clone)]
pub struct SnsAlertSink {
    client: SnsClient,
    topic_arn: Option<String>,
}

impl SnsAlertSink {
    pub fn new(client: SnsClient, topic_arn: Option<String>) -> Self {
        Self { client, topic_arn }
    }

    /// Builds a client from the shared SDK config with SDK retries turned off.
    pub fn from_sdk_config(config: &SdkConfig, topic_arn: Option<String>) -> Self {
        let sns_config = aws_sdk_sns::config::Builder::from(config)
            .retry_config(RetryConfig::disabled())
            .build();
        Self::new(SnsClient::from_conf(sns_config), topic_arn)
    }
}

#[async_trait]
impl AlertSink for SnsAlertSink {
    fn is_configured(&self) -> bool {
        self.topic_arn.is_some()
    }

    async fn send_alert(&self, message: &str, subject: &str) -> Result<()> {
        let Some(topic_arn) = self.topic_arn.as_deref() else {
            tracing::warn!("⚠️  sns_topic_arn is not configured, skipping alert delivery");
            return Ok(());
        };

        self.client
            .publish()
            .topic_arn(topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| MonitorError::AlertError {
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::info!("✅ Alert sent via SNS to topic: {}", topic_arn);
        Ok(())
    }
}
