//! Turns a decoded chat-completion reply into issues.
//!
//! Two reply shapes are accepted, tried in this order:
//!
//! 1. `choices[0].message.tool_calls[*].function.arguments`, a JSON string
//!    holding `{"issues": [...]}`.
//! 2. `choices[0].message.content`, free text that embeds a JSON array of
//!    flat objects. The first `[` to the last `]` is parsed when such a pair
//!    exists, otherwise the whole string.
//!
//! Any missing or wrong-typed intermediate member means "shape not present"
//! and falls through to the next option. Once tool calls are present, a
//! malformed `arguments` string is fatal and never falls back to `content`.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::LintError;
use crate::issue::Issue;

/// The part of the reply that extraction decided to read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyShape<'a> {
    /// Non-empty tool-call list; each entry is one invocation.
    ToolCalls(Vec<ToolInvocation<'a>>),
    /// No tool calls, non-empty free text.
    Content(&'a str),
    /// Nothing usable: no message, or no tool calls and empty/missing content.
    Empty,
}

/// A single tool invocation. `arguments` is `None` when missing or not a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInvocation<'a> {
    pub arguments: Option<&'a str>,
}

/// Which slice of free-text content is parsed as the issue array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyPayload<'a> {
    /// Inclusive span from the first `[` to the last `]`.
    Bracketed(&'a str),
    /// No usable bracket pair; the whole content.
    Whole(&'a str),
}

/// `choices[0].message`, reduced to the two members extraction reads.
#[derive(Debug, Clone, Copy)]
struct ReplyMessage<'a> {
    tool_calls: Option<&'a [Value]>,
    content: Option<&'a str>,
}

impl<'a> ReplyMessage<'a> {
    fn from_envelope(envelope: &'a Value) -> Option<Self> {
        let message = envelope
            .get("choices")?
            .as_array()?
            .first()?
            .get("message")?;
        if !message.is_object() {
            return None;
        }
        Some(Self {
            tool_calls: message
                .get("tool_calls")
                .and_then(Value::as_array)
                .map(Vec::as_slice),
            content: message.get("content").and_then(Value::as_str),
        })
    }
}

impl<'a> ToolInvocation<'a> {
    fn from_value(call: &'a Value) -> Self {
        Self {
            arguments: call
                .get("function")
                .and_then(|function| function.get("arguments"))
                .and_then(Value::as_str),
        }
    }
}

impl<'a> LegacyPayload<'a> {
    pub fn locate(content: &'a str) -> Self {
        match (content.find('['), content.rfind(']')) {
            (Some(start), Some(end)) if start < end => Self::Bracketed(&content[start..=end]),
            _ => Self::Whole(content),
        }
    }

    fn text(self) -> &'a str {
        match self {
            Self::Bracketed(text) | Self::Whole(text) => text,
        }
    }

    fn error_context(self) -> &'static str {
        match self {
            Self::Bracketed(_) => "error parsing legacy response",
            Self::Whole(_) => "failed to parse legacy response as JSON",
        }
    }
}

/// Decide which reply shape is present, without parsing any embedded JSON.
pub fn classify(envelope: &Value) -> ReplyShape<'_> {
    let Some(message) = ReplyMessage::from_envelope(envelope) else {
        return ReplyShape::Empty;
    };
    match message.tool_calls {
        Some(calls) if !calls.is_empty() => {
            ReplyShape::ToolCalls(calls.iter().map(ToolInvocation::from_value).collect())
        }
        _ => match message.content {
            Some(content) if !content.is_empty() => ReplyShape::Content(content),
            _ => ReplyShape::Empty,
        },
    }
}

/// Extract issues from a decoded reply, in encounter order.
pub fn extract_issues(envelope: &Value) -> Result<Vec<Issue>, LintError> {
    match classify(envelope) {
        ReplyShape::ToolCalls(calls) => {
            info!("Extracting tool call results");
            from_tool_calls(&calls)
        }
        ReplyShape::Content(content) => {
            info!("No tool calls found in response, trying legacy format");
            from_content(content)
        }
        ReplyShape::Empty => {
            debug!("reply carried neither tool calls nor content");
            Ok(Vec::new())
        }
    }
}

fn from_tool_calls(calls: &[ToolInvocation<'_>]) -> Result<Vec<Issue>, LintError> {
    let mut issues = Vec::new();
    for arguments in calls.iter().filter_map(|call| call.arguments) {
        let parsed: Value = serde_json::from_str(arguments).map_err(|source| {
            LintError::response_format("error parsing tool response", arguments, source)
        })?;
        let Some(entries) = parsed.get("issues").and_then(Value::as_array) else {
            continue;
        };
        info!("Processing {} issues found by LLM", entries.len());
        issues.extend(
            entries
                .iter()
                .filter_map(Value::as_object)
                .map(Issue::from_json_object),
        );
    }
    Ok(issues)
}

fn from_content(content: &str) -> Result<Vec<Issue>, LintError> {
    let payload = LegacyPayload::locate(content);
    let entries: Vec<HashMap<String, Option<String>>> = serde_json::from_str(payload.text())
        .map_err(|source| LintError::response_format(payload.error_context(), content, source))?;
    Ok(entries.into_iter().map(issue_from_flat).collect())
}

fn issue_from_flat(mut entry: HashMap<String, Option<String>>) -> Issue {
    let mut take = |key: &str| entry.remove(key).flatten().unwrap_or_default();
    Issue {
        rule_name: take("name"),
        description: take("description"),
        reason: take("reason"),
        fix: take("fix"),
        original_snippet: take("originalSnippet"),
        fixed_snippet: take("fixedSnippet"),
    }
}
