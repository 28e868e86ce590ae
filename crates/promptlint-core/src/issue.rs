use serde::Serialize;
use serde_json::{Map, Value};

/// One rule violation reported for the prompt under test.
///
/// Every field is a plain string. An empty string means the service did not
/// provide that piece, never that something went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "name")]
    pub rule_name: String,
    pub description: String,
    pub reason: String,
    pub fix: String,
    pub original_snippet: String,
    pub fixed_snippet: String,
}

/// Wire names of the six issue fields, in declaration order.
pub const ISSUE_FIELDS: [&str; 6] = [
    "name",
    "description",
    "reason",
    "fix",
    "originalSnippet",
    "fixedSnippet",
];

impl Issue {
    /// Both snippets are present, so a before/after block can be shown.
    pub fn has_snippets(&self) -> bool {
        !self.original_snippet.is_empty() && !self.fixed_snippet.is_empty()
    }

    /// Build from a JSON object; missing or non-string members become empty.
    pub(crate) fn from_json_object(object: &Map<String, Value>) -> Self {
        let field = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            rule_name: field("name"),
            description: field("description"),
            reason: field("reason"),
            fix: field("fix"),
            original_snippet: field("originalSnippet"),
            fixed_snippet: field("fixedSnippet"),
        }
    }
}
