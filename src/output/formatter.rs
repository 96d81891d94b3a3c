//! Final result formatting
//!
//! Provides the summary line and JSON output formats.

use crate::models::{RunResult, TestId};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "summary" | "text" => Some(OutputFormat::Summary),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format the aggregated run result
    pub fn format_result(&self, result: &RunResult) -> String {
        match self.format {
            OutputFormat::Summary => result.to_string(),
            OutputFormat::Json => serde_json::to_string(result).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(result).unwrap_or_default(),
        }
    }

    /// Format list-mode output, one identifier per line
    pub fn format_list(&self, ids: &[TestId]) -> String {
        match self.format {
            OutputFormat::Summary => ids
                .iter()
                .map(|id| format!("{id}\n"))
                .collect::<String>(),
            OutputFormat::Json => {
                let names: Vec<String> = ids.iter().map(ToString::to_string).collect();
                serde_json::to_string(&names).unwrap_or_default()
            }
            OutputFormat::JsonPretty => {
                let names: Vec<String> = ids.iter().map(ToString::to_string).collect();
                serde_json::to_string_pretty(&names).unwrap_or_default()
            }
        }
    }
}
