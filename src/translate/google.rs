use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use super::TranslationBackend;
use crate::config::Config;
use crate::credentials::CredentialProvider;
use crate::ServiceError;

/// Google Cloud Translation (v2 REST API)
pub struct GoogleTranslate {
    client: Client,
    endpoint: String,
    api_key_name: String,
    credentials: Arc<dyn CredentialProvider>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslationList,
}

#[derive(Debug, Deserialize)]
struct TranslationList {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
    detected_source_language: Option<String>,
}

impl GoogleTranslate {
    pub fn new(config: &Config, credentials: Arc<dyn CredentialProvider>) -> anyhow::Result<Self> {
        // Reject a malformed endpoint at startup rather than on the first request
        Url::parse(&config.translation.google_endpoint)?;

        let client = Client::builder().timeout(config.http_timeout()).build()?;

        Ok(Self {
            client,
            endpoint: config.translation.google_endpoint.clone(),
            api_key_name: config.translation.google_api_key_name.clone(),
            credentials,
        })
    }

    fn request_url(&self, api_key: &str) -> Result<Url, ServiceError> {
        Url::parse_with_params(&self.endpoint, &[("key", api_key)])
            .map_err(|e| ServiceError::Request(format!("invalid endpoint {}: {}", self.endpoint, e)))
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslate {
    async fn translate(&self, text: &str, target_code: &str) -> Result<String, ServiceError> {
        let api_key = self
            .credentials
            .resolve(&self.api_key_name)
            .ok_or_else(|| ServiceError::MissingCredential(self.api_key_name.clone()))?;

        let response = self
            .client
            .post(self.request_url(&api_key)?)
            .json(&TranslateRequest {
                q: text,
                target: target_code,
                format: "text",
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        parse_translation(&body)
    }

    fn name(&self) -> &'static str {
        "Google Cloud Translation"
    }
}

/// Read `translatedText` from the first translation in a response body
pub fn parse_translation(body: &str) -> Result<String, ServiceError> {
    let parsed: TranslateResponse = serde_json::from_str(body)
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

    let translation = parsed
        .data
        .translations
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::MalformedResponse("no translations returned".to_string()))?;

    if let Some(source) = &translation.detected_source_language {
        tracing::debug!("Detected source language: {}", source);
    }

    Ok(translation.translated_text)
}
