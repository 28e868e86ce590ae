use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::LintError;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "o3-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Values read from a config file. Environment variables take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

/// Resolved settings for one run of the remote validator.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ValidatorConfig {
    pub const API_KEY_ENV: &'static str = "PROMPTLINT_API_KEY";
    pub const ENDPOINT_ENV: &'static str = "PROMPTLINT_API_ENDPOINT";
    pub const MODEL_ENV: &'static str = "PROMPTLINT_MODEL_NAME";

    /// Load settings from environment variables, falling back to `overrides`.
    ///
    /// * `PROMPTLINT_API_KEY`: API key/token (required).
    /// * `PROMPTLINT_API_ENDPOINT`: chat completions URL (default: OpenAI).
    /// * `PROMPTLINT_MODEL_NAME`: model identifier (default: `o3-mini`).
    pub fn from_env(overrides: &ConfigOverrides) -> Result<Self, LintError> {
        Self::from_map(&std::env::vars().collect(), overrides)
    }

    pub fn from_map(
        vars: &HashMap<String, String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, LintError> {
        let pick = |env: &str, file: &Option<String>| {
            vars.get(env)
                .and_then(|v| non_blank(v))
                .or_else(|| file.as_deref().and_then(non_blank))
        };

        let api_key = pick(Self::API_KEY_ENV, &overrides.api_key).ok_or_else(|| {
            LintError::configuration(format!(
                "API key not specified, set {} environment variable",
                Self::API_KEY_ENV
            ))
        })?;
        let endpoint = pick(Self::ENDPOINT_ENV, &overrides.endpoint).unwrap_or_else(|| {
            tracing::info!("Using default API endpoint: {}", DEFAULT_ENDPOINT);
            DEFAULT_ENDPOINT.to_string()
        });
        let model = pick(Self::MODEL_ENV, &overrides.model).unwrap_or_else(|| {
            tracing::info!("Using default model: {}", DEFAULT_MODEL);
            DEFAULT_MODEL.to_string()
        });

        Ok(Self {
            api_key,
            endpoint,
            model,
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_endpoint_model_and_timeout() {
        let config = ValidatorConfig::from_map(
            &vars(&[(ValidatorConfig::API_KEY_ENV, "secret")]),
            &ConfigOverrides::default(),
        )
        .expect("should load settings");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn errors_when_api_key_missing() {
        let err = ValidatorConfig::from_map(&vars(&[]), &ConfigOverrides::default())
            .expect_err("missing API key should error");
        assert!(matches!(err, LintError::Configuration(_)));
        assert!(err.to_string().contains(ValidatorConfig::API_KEY_ENV));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let err = ValidatorConfig::from_map(
            &vars(&[(ValidatorConfig::API_KEY_ENV, "   ")]),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LintError::Configuration(_)));

        let config = ValidatorConfig::from_map(
            &vars(&[
                (ValidatorConfig::API_KEY_ENV, "k"),
                (ValidatorConfig::MODEL_ENV, ""),
            ]),
            &ConfigOverrides::default(),
        )
        .unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn environment_beats_file_beats_default() {
        let overrides = ConfigOverrides {
            api_key: Some("file-key".into()),
            endpoint: Some("http://file.example/v1/chat/completions".into()),
            model: Some("file-model".into()),
        };
        let config = ValidatorConfig::from_map(
            &vars(&[(ValidatorConfig::MODEL_ENV, "env-model")]),
            &overrides,
        )
        .unwrap();
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.endpoint, "http://file.example/v1/chat/completions");
        assert_eq!(config.model, "env-model");
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = ValidatorConfig::from_map(
            &vars(&[(ValidatorConfig::API_KEY_ENV, "sk-very-secret")]),
            &ConfigOverrides::default(),
        )
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("o3-mini"));
    }
}
