pub mod error;
pub mod issue;
pub mod llm;
pub mod report;
pub mod rules;

pub use error::LintError;
pub use issue::Issue;
pub use llm::{
    extract::extract_issues, request::build_request, ConfigOverrides, OpenAiValidator,
    PromptValidator, ValidatorConfig,
};
pub use report::{render_report, should_colorize, ColorOverrides, OutputFormat, TerminalSignals};
pub use rules::{
    file_repository::{FileRuleRepository, RuleSource},
    Rule, RuleRepository, RuleSet,
};
