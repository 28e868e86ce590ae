use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod file_repository;

/// Rule file shipped with the binary.
pub const BUILTIN_RULES_YAML: &str = include_str!("../../rules/prompt_rules.yaml");

/// A named style check the remote model evaluates the prompt against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Identifier echoed back by the model in each issue's `name`.
    pub name: String,
    /// The rule text itself.
    pub rule: String,
    /// Why the rule matters.
    pub reason: String,
    /// How to bring a prompt into compliance.
    pub fix: String,
    #[serde(default)]
    pub bad_example: String,
    #[serde(default)]
    pub good_example: String,
}

/// Ordered rule collection. Order drives the numbering sent to the model;
/// names are not required to be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<Rule>);

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self(rules)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.0
    }

    /// Parse a `prompt_rules:` YAML document.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        let doc: RuleDocument = serde_yaml::from_str(raw)?;
        Ok(Self(doc.prompt_rules))
    }
}

#[derive(Deserialize)]
struct RuleDocument {
    #[serde(default)]
    prompt_rules: Vec<Rule>,
}

/// Abstraction over rule loading so the built-in pack and user files share one path.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Retrieve the full rule set, in file order.
    async fn load_rules(&self) -> AnyResult<RuleSet>;
}
