use std::fmt::Write;
use std::io::IsTerminal;

use colored::Color;
use serde::Serialize;

use crate::issue::Issue;

const SEPARATOR_WIDTH: usize = 60;
const SNIPPET_INDENT: &str = "    ";

/// Format styles supported by the report renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Explicit color flags from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorOverrides {
    pub force_color: bool,
    pub no_color: bool,
}

/// Ambient terminal facts that decide color when no flag is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalSignals {
    pub stdout_is_terminal: bool,
    /// `NO_COLOR` is set, whatever its value.
    pub no_color_env: bool,
    pub term: Option<String>,
}

impl TerminalSignals {
    pub fn detect() -> Self {
        Self {
            stdout_is_terminal: std::io::stdout().is_terminal(),
            no_color_env: std::env::var_os("NO_COLOR").is_some(),
            term: std::env::var("TERM").ok(),
        }
    }
}

/// Resolve whether output should be colorized. `force_color` wins over `no_color`.
pub fn should_colorize(overrides: ColorOverrides, signals: &TerminalSignals) -> bool {
    if overrides.force_color {
        return true;
    }
    if overrides.no_color {
        return false;
    }
    !signals.no_color_env && signals.stdout_is_terminal && signals.term.as_deref() != Some("dumb")
}

/// Produce a report string for `issues` in the desired format.
pub fn render_report(
    issues: &[Issue],
    format: OutputFormat,
    colorize: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(issues, colorize),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonReport::from(issues))?),
    }
}

fn render_human(issues: &[Issue], colorize: bool) -> anyhow::Result<String> {
    let mut out = String::new();
    let style = Style { colorize };

    if issues.is_empty() {
        writeln!(out, "{}", style.success("No issues found!"))?;
        return Ok(out);
    }

    writeln!(
        out,
        "Found {}:\n",
        style.bold(&format!("{} issues", issues.len()))
    )?;

    for (idx, issue) in issues.iter().enumerate() {
        writeln!(
            out,
            "{}",
            style.heading(&format!("[Issue {}] {}", idx + 1, issue.description))
        )?;
        writeln!(out, "{} {}", style.bold("Reason:"), issue.reason)?;
        writeln!(out, "{} {}", style.bold("Fix:"), issue.fix)?;

        if issue.has_snippets() {
            writeln!(out)?;
            writeln!(out, "{}", style.bold("Original snippet:"))?;
            writeln!(out, "{}", style.problem(&indent(&issue.original_snippet)))?;
            writeln!(out, "{}", style.bold("Fixed snippet:"))?;
            writeln!(out, "{}", style.resolution(&indent(&issue.fixed_snippet)))?;
        }

        if idx + 1 < issues.len() {
            write!(out, "\n{}\n\n", "─".repeat(SEPARATOR_WIDTH))?;
        }
    }

    Ok(out)
}

fn indent(snippet: &str) -> String {
    snippet
        .split('\n')
        .map(|line| format!("{SNIPPET_INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Applies styling only when colorize is on; plain text otherwise.
///
/// Escapes are built from `colored`'s color codes directly so the output does
/// not depend on the process-wide `colored::control` override.
struct Style {
    colorize: bool,
}

impl Style {
    fn success(&self, text: &str) -> String {
        self.paint(text, true, Some(Color::Green))
    }

    fn heading(&self, text: &str) -> String {
        self.paint(text, true, Some(Color::Blue))
    }

    fn bold(&self, text: &str) -> String {
        self.paint(text, true, None)
    }

    fn problem(&self, text: &str) -> String {
        self.paint(text, false, Some(Color::Red))
    }

    fn resolution(&self, text: &str) -> String {
        self.paint(text, false, Some(Color::Green))
    }

    fn paint(&self, text: &str, bold: bool, color: Option<Color>) -> String {
        if !self.colorize {
            return text.to_string();
        }
        let mut codes = Vec::new();
        if bold {
            codes.push("1".to_string());
        }
        if let Some(color) = color {
            codes.push(color.to_fg_str().to_string());
        }
        format!("\u{1b}[{}m{text}\u{1b}[0m", codes.join(";"))
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    issue_count: usize,
    issues: &'a [Issue],
}

impl<'a> From<&'a [Issue]> for JsonReport<'a> {
    fn from(issues: &'a [Issue]) -> Self {
        Self {
            issue_count: issues.len(),
            issues,
        }
    }
}
