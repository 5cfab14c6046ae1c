use async_trait::async_trait;
use aws_sdk_translate::error::DisplayErrorContext;
use aws_sdk_translate::Client as TranslateClient;

use super::TranslationBackend;
use crate::config::Config;
use crate::ServiceError;

/// Amazon Translate, with credentials resolved by the SDK's default chain
pub struct AwsTranslate {
    client: TranslateClient,
}

impl AwsTranslate {
    pub async fn new(config: &Config) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(config.aws_region())
            .load()
            .await;

        Self {
            client: TranslateClient::new(&aws_config),
        }
    }
}

#[async_trait]
impl TranslationBackend for AwsTranslate {
    async fn translate(&self, text: &str, target_code: &str) -> Result<String, ServiceError> {
        let output = self
            .client
            .translate_text()
            .text(text)
            .source_language_code("auto")
            .target_language_code(target_code)
            .send()
            .await
            .map_err(|e| ServiceError::Request(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(
            "Amazon Translate detected source language: {}",
            output.source_language_code()
        );

        Ok(output.translated_text().to_string())
    }

    fn name(&self) -> &'static str {
        "Amazon Translate"
    }
}
