pub mod extract;
pub mod openai;
pub mod request;
mod settings;

use async_trait::async_trait;

use crate::error::LintError;
use crate::issue::Issue;
use crate::rules::RuleSet;

pub use openai::OpenAiValidator;
pub use settings::{
    ConfigOverrides, ValidatorConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};

/// Judges a prompt against a rule set, returning issues in the order reported.
#[async_trait]
pub trait PromptValidator: Send + Sync {
    async fn validate(&self, prompt: &str, rules: &RuleSet) -> Result<Vec<Issue>, LintError>;
}
