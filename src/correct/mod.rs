use anyhow::Result;
use std::sync::Arc;

pub mod openai;

use crate::config::{Config, CorrectionConfig};
use crate::credentials::CredentialProvider;
use crate::pipeline::{Stage, StageOutcome};
use crate::ServiceError;
use openai::{ChatCompletion, ChatMessage, ChatRequest, OpenAiClient};

/// Build the correction prompt around `text`
pub fn build_prompt(text: &str) -> String {
    format!(
        "Please correct the following text for grammar, punctuation, clarity, and style:\n\n{}\n\nCorrected text:",
        text
    )
}

/// Grammar and punctuation correction through a chat model
pub struct Corrector {
    client: Box<dyn ChatCompletion>,
    credentials: Arc<dyn CredentialProvider>,
    settings: CorrectionConfig,
}

impl Corrector {
    pub fn new(
        client: Box<dyn ChatCompletion>,
        credentials: Arc<dyn CredentialProvider>,
        settings: CorrectionConfig,
    ) -> Self {
        Self {
            client,
            credentials,
            settings,
        }
    }

    pub fn from_config(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let client = OpenAiClient::new(&config.correction.endpoint, config.http_timeout())?;
        Ok(Self::new(Box::new(client), credentials, config.correction.clone()))
    }

    fn request_for(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::user(build_prompt(text))],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Correct `text`, handing it back unchanged if the service is unavailable
    pub async fn correct(&self, text: &str) -> StageOutcome {
        let key_name = &self.settings.api_key_name;
        let Some(api_key) = self.credentials.resolve(key_name) else {
            return StageOutcome::degraded(
                Stage::Correction,
                text,
                ServiceError::MissingCredential(key_name.clone()),
            );
        };

        tracing::info!("Correcting {} characters with {}", text.len(), self.settings.model);

        let request = self.request_for(text);
        match self.client.complete(&api_key, &request).await {
            Ok(content) => {
                let corrected = content.trim();
                if corrected.is_empty() {
                    StageOutcome::degraded(
                        Stage::Correction,
                        text,
                        ServiceError::MalformedResponse("empty completion".to_string()),
                    )
                } else {
                    StageOutcome::Ok(corrected.to_string())
                }
            }
            Err(err) => StageOutcome::degraded(Stage::Correction, text, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialChain;
    use openai::MockChatCompletion;

    struct Key;

    impl CredentialProvider for Key {
        fn resolve(&self, name: &str) -> Option<String> {
            (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        }

        fn describe(&self) -> String {
            "test".to_string()
        }
    }

    #[test]
    fn test_prompt_embeds_text_verbatim() {
        let prompt = build_prompt("so um this is it");
        assert_eq!(
            prompt,
            "Please correct the following text for grammar, punctuation, clarity, and style:\n\nso um this is it\n\nCorrected text:"
        );
    }

    #[tokio::test]
    async fn test_correct_sends_deterministic_request() {
        let mut client = MockChatCompletion::new();
        client
            .expect_complete()
            .withf(|key, request| {
                key == "sk-test"
                    && request.model == "gpt-3.5-turbo"
                    && request.temperature == 0.0
                    && request.max_tokens == 1024
                    && request.messages.len() == 1
                    && request.messages[0].role == "user"
                    && request.messages[0].content.contains("so um this is it")
            })
            .times(1)
            .returning(|_, _| Ok("\n So, this is it. \n".to_string()));

        let corrector = Corrector::new(Box::new(client), Arc::new(Key), CorrectionConfig::default());
        let outcome = corrector.correct("so um this is it").await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.text(), Some("So, this is it."));
    }

    #[tokio::test]
    async fn test_missing_credential_returns_input() {
        let mut client = MockChatCompletion::new();
        client.expect_complete().never();

        let corrector = Corrector::new(
            Box::new(client),
            Arc::new(CredentialChain::new()),
            CorrectionConfig::default(),
        );
        let outcome = corrector.correct("raw text").await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.text(), Some("raw text"));
        assert!(outcome.message().unwrap().starts_with("OpenAI API key not found"));
    }

    #[tokio::test]
    async fn test_service_error_returns_input() {
        let mut client = MockChatCompletion::new();
        client
            .expect_complete()
            .returning(|_, _| Err(ServiceError::Api { status: 401, body: "Incorrect API key provided".to_string() }));

        let corrector = Corrector::new(Box::new(client), Arc::new(Key), CorrectionConfig::default());
        let outcome = corrector.correct("raw text").await;

        assert_eq!(outcome.text(), Some("raw text"));
        assert_eq!(
            outcome.message().as_deref(),
            Some("Error during text correction: service returned 401: Incorrect API key provided")
        );
    }

    #[tokio::test]
    async fn test_blank_completion_is_degraded() {
        let mut client = MockChatCompletion::new();
        client.expect_complete().returning(|_, _| Ok("   ".to_string()));

        let corrector = Corrector::new(Box::new(client), Arc::new(Key), CorrectionConfig::default());
        let outcome = corrector.correct("raw text").await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.text(), Some("raw text"));
    }
}
