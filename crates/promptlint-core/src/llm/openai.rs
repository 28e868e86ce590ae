use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::info;

use super::extract::extract_issues;
use super::request::build_request;
use super::{PromptValidator, ValidatorConfig};
use crate::error::LintError;
use crate::issue::Issue;
use crate::rules::RuleSet;

/// Sends one chat-completion request to an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiValidator {
    http: Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiValidator {
    pub fn new(config: &ValidatorConfig) -> Result<Self, LintError> {
        if config.api_key.trim().is_empty() {
            return Err(LintError::configuration(
                "API key is missing, set PROMPTLINT_API_KEY",
            ));
        }
        if config.endpoint.trim().is_empty() {
            return Err(LintError::configuration(
                "API endpoint is missing, set PROMPTLINT_API_ENDPOINT",
            ));
        }
        info!("Setting up HTTP client with timeout {:?}", config.timeout);
        let http = Client::builder()
            .user_agent(concat!("promptlint/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|source| LintError::Send {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        Ok(Self {
            http,
            url: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl PromptValidator for OpenAiValidator {
    async fn validate(&self, prompt: &str, rules: &RuleSet) -> Result<Vec<Issue>, LintError> {
        info!("Starting LLM-based prompt validation");
        let payload = build_request(&self.model, prompt, rules);

        info!("Sending request to {}", self.url);
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| LintError::Send {
                endpoint: self.url.clone(),
                source,
            })?;

        let status = response.status();
        info!("Received response with status code: {}", status.as_u16());
        let bytes = response.bytes().await.map_err(|source| LintError::Send {
            endpoint: self.url.clone(),
            source,
        })?;
        // Lossy: invalid UTF-8 becomes U+FFFD in error text; decoding uses the raw bytes.
        let body = String::from_utf8_lossy(&bytes);
        if !status.is_success() {
            return Err(LintError::Status {
                status: status.as_u16(),
                body: body.into_owned(),
            });
        }

        let envelope: Value = serde_json::from_slice(&bytes)
            .map_err(|source| LintError::response_format("error decoding response", body, source))?;
        let issues = extract_issues(&envelope)?;
        info!("Validation completed successfully");
        Ok(issues)
    }
}
