//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::results::{Check, Outcome, TestResults};
use colored::*;
use probe_protocol::{CallToolResult, Tool};
use serde_json::Value;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Width of section banners
const BANNER_WIDTH: usize = 60;

/// Characters of a tool description shown in tables
const DESCRIPTION_WIDTH: usize = 50;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether progress output is suppressed in favour of a final JSON document
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Print a progress line to stdout. Silent in JSON mode.
    pub fn emit(&self, line: impl AsRef<str>) {
        if !self.is_json() {
            println!("{}", line.as_ref());
        }
    }

    /// Format a section banner.
    pub fn header(&self, title: &str) -> String {
        let rule = "=".repeat(BANNER_WIDTH);
        if self.color_enabled {
            format!(
                "\n{}\n{}\n{}",
                rule.blue().bold(),
                title.blue().bold(),
                rule.blue().bold()
            )
        } else {
            format!("\n{}\n{}\n{}", rule, title, rule)
        }
    }

    /// Format a recorded check.
    pub fn check(&self, check: &Check) -> String {
        let (symbol, color) = match check.outcome {
            Outcome::Pass => ("✓", "green"),
            Outcome::Warn => ("⚠", "yellow"),
            Outcome::Fail => ("✗", "red"),
            Outcome::Skip => ("-", "yellow"),
        };
        let tag = self.colorize(&format!("{} [{}]", symbol, check.outcome.label()), color);
        if check.detail.is_empty() {
            format!("{} {}", tag, check.name)
        } else {
            format!("{} {}: {}", tag, check.name, check.detail)
        }
    }

    /// Format the end-of-suite summary.
    pub fn summary(&self, results: &TestResults) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
            OutputFormat::Table => Ok(self.summary_table(results)),
        }
    }

    fn summary_table(&self, results: &TestResults) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Check", "Result", "Detail"]);
        for check in &results.checks {
            let color = match check.outcome {
                Outcome::Pass => "green",
                Outcome::Warn | Outcome::Skip => "yellow",
                Outcome::Fail => "red",
            };
            builder.push_record([
                check.name.clone(),
                self.colorize(check.outcome.label(), color),
                truncate(&check.detail, 60),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let verdict = if results.success() && results.skipped > 0 {
            self.success(&format!(
                "All {} checks passed, {} skipped",
                results.passed, results.skipped
            ))
        } else if results.success() {
            self.success(&format!("All {} checks passed", results.passed))
        } else {
            self.error(&format!("Failed checks: {}", results.failures().join(", ")))
        };

        format!("{}\n{}\n{}", table, results.summary_line(), verdict)
    }

    /// Format a tool listing.
    pub fn tools(&self, tools: &[Tool]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(tools)?),
            OutputFormat::Table => {
                if tools.is_empty() {
                    return Ok(self.colorize("No tools advertised.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Tool", "Description"]);
                for tool in tools {
                    builder.push_record([
                        tool.name.clone(),
                        truncate(&tool.description, DESCRIPTION_WIDTH),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a tool call result.
    pub fn tool_result(&self, result: &CallToolResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Table => {
                let text: Vec<&str> = result
                    .content
                    .iter()
                    .filter_map(|c| c.text.as_deref())
                    .collect();
                let body = if text.is_empty() {
                    self.colorize("(no text content)", "yellow")
                } else {
                    text.join("\n")
                };
                if result.is_error {
                    Ok(format!("{}\n{}", self.error("Tool reported an error"), body))
                } else {
                    Ok(body)
                }
            }
        }
    }

    /// Pretty-print a JSON value.
    pub fn json(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// First `limit` characters of `text`, with an ellipsis when cut
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_protocol::Content;

    fn tool(name: &str, description: &str) -> Tool {
        Tool {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: None,
        }
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }

    #[test]
    fn test_check_line() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut results = TestResults::new("demo");
        let check = results.record("Health check", Outcome::Pass, "server responding");
        assert_eq!(
            formatter.check(check),
            "✓ [PASS] Health check: server responding"
        );
        let check = results.record("Basic auth", Outcome::Skip, "");
        assert_eq!(formatter.check(check), "- [SKIP] Basic auth");
    }

    #[test]
    fn test_summary_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut results = TestResults::new("demo");
        results.record("Tools List", Outcome::Pass, "2 tools");
        results.record("Read Cypher", Outcome::Fail, "HTTP 500");
        let output = formatter.summary(&results).unwrap();
        assert!(output.contains("Tools List"));
        assert!(output.contains("FAIL"));
        assert!(output.contains("Passed: 1, Failed: 1, Skipped: 0, Total: 2"));
        assert!(output.contains("Failed checks: Read Cypher"));
    }

    #[test]
    fn test_summary_verdict_counts_skips_apart() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut results = TestResults::new("demo");
        results.record("Health check", Outcome::Pass, "");
        results.record("Basic auth", Outcome::Skip, "no credentials");
        results.record("Bearer auth", Outcome::Skip, "no token");
        let output = formatter.summary(&results).unwrap();
        assert!(output.contains("All 1 checks passed, 2 skipped"));

        let mut results = TestResults::new("demo");
        results.record("Health check", Outcome::Pass, "");
        let output = formatter.summary(&results).unwrap();
        assert!(output.ends_with("All 1 checks passed"));
    }

    #[test]
    fn test_summary_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let mut results = TestResults::new("demo");
        results.record("Tools List", Outcome::Pass, "");
        let output = formatter.summary(&results).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["suite"], "demo");
        assert_eq!(value["failed"], 0);
    }

    #[test]
    fn test_tools_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .tools(&[tool("read-cypher", "Run a read-only Cypher query")])
            .unwrap();
        assert!(output.contains("read-cypher"));
        assert!(output.contains("Description"));

        let output = formatter.tools(&[]).unwrap();
        assert!(output.contains("No tools advertised"));
    }

    #[test]
    fn test_tool_result_text() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let result = CallToolResult {
            content: vec![Content {
                kind: "text".to_string(),
                text: Some("[{\"value\": 1}]".to_string()),
            }],
            is_error: false,
        };
        assert_eq!(formatter.tool_result(&result).unwrap(), "[{\"value\": 1}]");

        let json = Formatter::new(OutputFormat::Json, false)
            .tool_result(&result)
            .unwrap();
        assert!(json.contains("\"type\": \"text\""));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
    }
}
