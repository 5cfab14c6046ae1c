use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub mod aws;
pub mod google;

use crate::config::{Config, TranslationProvider};
use crate::credentials::CredentialProvider;
use crate::pipeline::{Stage, StageOutcome};
use crate::ServiceError;

/// A machine translation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate `text` into the language identified by the two-letter `target_code`
    async fn translate(&self, text: &str, target_code: &str) -> Result<String, ServiceError>;

    /// Get the name of this backend
    fn name(&self) -> &'static str;
}

/// Translation stage wrapping a backend
pub struct Translator {
    backend: Box<dyn TranslationBackend>,
}

impl Translator {
    pub fn new(backend: Box<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    pub async fn from_config(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let backend: Box<dyn TranslationBackend> = match config.translation.provider {
            TranslationProvider::Google => Box::new(google::GoogleTranslate::new(config, credentials)?),
            TranslationProvider::Aws => Box::new(aws::AwsTranslate::new(config).await),
        };

        Ok(Self::new(backend))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Translate `text`, handing it back unchanged if the backend fails
    pub async fn translate(&self, text: &str, target_code: &str) -> StageOutcome {
        tracing::info!(
            "Translating {} characters to '{}' with {}",
            text.len(),
            target_code,
            self.backend.name()
        );

        match self.backend.translate(text, target_code).await {
            Ok(translated) => StageOutcome::Ok(translated),
            Err(err) => StageOutcome::degraded(Stage::Translation, text, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_translate_passes_code_through() {
        let mut backend = MockTranslationBackend::new();
        backend.expect_name().return_const("mock");
        backend
            .expect_translate()
            .withf(|text, code| text == "Hello." && code == "tr")
            .times(1)
            .returning(|_, _| Ok("Merhaba.".to_string()));

        let translator = Translator::new(Box::new(backend));
        let outcome = translator.translate("Hello.", "tr").await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.text(), Some("Merhaba."));
    }

    #[tokio::test]
    async fn test_backend_failure_returns_input() {
        let mut backend = MockTranslationBackend::new();
        backend.expect_name().return_const("mock");
        backend
            .expect_translate()
            .returning(|_, _| Err(ServiceError::Request("no credentials".to_string())));

        let translator = Translator::new(Box::new(backend));
        let outcome = translator.translate("Hello.", "de").await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.text(), Some("Hello."));
        assert_eq!(
            outcome.message().as_deref(),
            Some("Error during translation: request failed: no credentials")
        );
    }

    #[tokio::test]
    async fn test_from_config_selects_google_by_default() {
        let credentials: Arc<dyn CredentialProvider> = Arc::new(crate::credentials::CredentialChain::new());
        let translator = Translator::from_config(&Config::default(), credentials).await.unwrap();
        assert_eq!(translator.backend_name(), "Google Cloud Translation");
    }

    #[tokio::test]
    async fn test_from_config_selects_aws() {
        let mut config = Config::default();
        config.translation.provider = TranslationProvider::Aws;
        config.translation.aws_region = "eu-central-1".to_string();

        let credentials: Arc<dyn CredentialProvider> = Arc::new(crate::credentials::CredentialChain::new());
        let translator = Translator::from_config(&config, credentials).await.unwrap();
        assert_eq!(translator.backend_name(), "Amazon Translate");
    }
}
