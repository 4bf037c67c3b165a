//! JSON report of a config-driven parse.

use crate::parser::{CommandLine, ParseOutcome};
use crate::values::Values;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything a parse produced, ready to serialize.
#[derive(Debug, Serialize)]
pub struct Report {
    pub app: String,
    pub success: bool,
    pub error_count: usize,
    pub errors: Vec<String>,
    pub options: BTreeMap<String, serde_json::Value>,
    pub positionals: BTreeMap<String, Option<String>>,
    pub overflow: Vec<String>,
}

impl Report {
    pub fn new(values: &Values, cl: &CommandLine<'_>, outcome: &ParseOutcome) -> Self {
        Self {
            app: cl.app_name().to_string(),
            success: outcome.is_success(),
            error_count: outcome.error_count,
            errors: outcome.errors.iter().map(ToString::to_string).collect(),
            options: values
                .options()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
            positionals: values
                .positionals()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            overflow: cl.overflow().to_vec(),
        }
    }
}

/// Render the report as JSON. Map keys come out sorted.
pub fn render_report(report: &Report, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}
