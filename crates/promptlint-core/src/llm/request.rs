//! Chat-completion payload that asks the model to report issues through a
//! forced `find_prompt_issues` tool call.

use serde::Serialize;
use serde_json::{json, Value};

use crate::issue::ISSUE_FIELDS;
use crate::rules::RuleSet;

pub const TOOL_NAME: &str = "find_prompt_issues";

pub const SYSTEM_PROMPT: &str = "You are a prompt evaluation expert. Your task is to analyze a prompt and determine if it follows the provided rules.

Analyze the prompt against each rule and identify violations. The rules are provided in a separate message.

Use the find_prompt_issues tool to return the issues found in the prompt. If there are no issues, return an empty array.";

const PROMPT_PREAMBLE: &str = "Analyze the following prompt against the specified rules:\n\n";

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: ToolChoice,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Forces the model to answer through the named function.
#[derive(Debug, Clone, Serialize)]
pub struct ToolChoice {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: ToolChoiceFunction,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolChoiceFunction {
    pub name: &'static str,
}

/// Assemble the request: system instructions, numbered rules, then the prompt.
pub fn build_request(model: &str, prompt: &str, rules: &RuleSet) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: describe_rules(rules),
            },
            ChatMessage {
                role: "user",
                content: format!("{PROMPT_PREAMBLE}{prompt}"),
            },
        ],
        tools: vec![issue_tool()],
        tool_choice: ToolChoice {
            kind: "function",
            function: ToolChoiceFunction { name: TOOL_NAME },
        },
    }
}

/// Numbered plain-text listing of the rules, starting at 1.
pub fn describe_rules(rules: &RuleSet) -> String {
    let mut out = String::from("List of prompt checking rules:\n\n");
    for (idx, rule) in rules.iter().enumerate() {
        out.push_str(&format!("{}. Rule: {}\n", idx + 1, rule.name));
        out.push_str(&format!("   Description: {}\n", rule.rule));
        out.push_str(&format!("   Reason: {}\n", rule.reason));
        if !rule.bad_example.is_empty() {
            out.push_str(&format!("   Original snippet: {}\n", rule.bad_example));
        }
        if !rule.good_example.is_empty() {
            out.push_str(&format!("   Fixed snippet: {}\n", rule.good_example));
        }
        out.push('\n');
    }
    out
}

fn issue_tool() -> ToolDefinition {
    let field_docs = [
        "Name of the violated rule",
        "Description of the problem",
        "Why this is a problem (from the rules)",
        "Recommendation for fixing",
        "Problematic part of the prompt (if applicable)",
        "Improved version of the snippet (if applicable)",
    ];
    let properties: serde_json::Map<String, Value> = ISSUE_FIELDS
        .iter()
        .zip(field_docs)
        .map(|(name, doc)| {
            (
                name.to_string(),
                json!({ "type": "string", "description": doc }),
            )
        })
        .collect();

    ToolDefinition {
        kind: "function",
        function: FunctionDefinition {
            name: TOOL_NAME,
            description: "Reports issues found in a prompt based on predefined rules",
            parameters: json!({
                "type": "object",
                "properties": {
                    "issues": {
                        "type": "array",
                        "description": "List of issues found in the prompt",
                        "items": {
                            "type": "object",
                            "properties": properties,
                            "required": ISSUE_FIELDS,
                        }
                    }
                },
                "required": ["issues"],
            }),
        },
    }
}
