use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Rank given to severities outside the known scale; sorts after INFO.
pub const UNKNOWN_SEVERITY_RANK: u8 = 99;

/// Static-analysis severity, worst first. Unrecognized strings are kept
/// verbatim so they can still be grouped (and sorted last).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Blocker,
    Critical,
    Major,
    Minor,
    Info,
    Unknown(String),
}

impl Severity {
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Blocker => 0,
            Severity::Critical => 1,
            Severity::Major => 2,
            Severity::Minor => 3,
            Severity::Info => 4,
            Severity::Unknown(_) => UNKNOWN_SEVERITY_RANK,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Blocker => "BLOCKER",
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Info => "INFO",
            Severity::Unknown(raw) => raw,
        }
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "BLOCKER" => Severity::Blocker,
            "CRITICAL" => Severity::Critical,
            "MAJOR" => Severity::Major,
            "MINOR" => Severity::Minor,
            "INFO" => Severity::Info,
            _ => Severity::Unknown(raw),
        }
    }
}

impl From<&str> for Severity {
    fn from(raw: &str) -> Self {
        Severity::from(raw.to_string())
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding as exported by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub rule: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub issue_type: String,
    /// File path the finding points into.
    pub component: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub line: Option<i64>,
    pub message: String,
    pub status: String,
    /// Analyzer cost estimate; may be negative.
    #[serde(default, deserialize_with = "whole_number")]
    pub effort: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Issue {
    /// Only OPEN and REOPENED issues are eligible for grouping.
    pub fn is_actionable(&self) -> bool {
        matches!(self.status.as_str(), "OPEN" | "REOPENED")
    }

    pub fn effort_or_zero(&self) -> i64 {
        self.effort.unwrap_or(0)
    }
}

/// Accept integers and integral floats (`2.0`); reject fractions.
fn whole_number<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(n) = number.as_i64() {
        return Ok(Some(n));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Ok(Some(f as i64))
        }
        _ => Err(serde::de::Error::custom(format!(
            "expected a whole number, got {number}"
        ))),
    }
}

#[derive(Deserialize)]
struct WrappedIssues {
    issues: Vec<Issue>,
}

/// Parse an issues document: either a bare JSON array or an object with an
/// `issues` array. Validates the whole set before returning.
pub fn parse_issues(json: &str) -> Result<Vec<Issue>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| Error::InputParse(format!("invalid issues JSON: {e}")))?;

    let decoded = if value.is_array() {
        serde_json::from_value::<Vec<Issue>>(value)
    } else if value.get("issues").is_some() {
        serde_json::from_value::<WrappedIssues>(value).map(|doc| doc.issues)
    } else {
        return Err(Error::InputParse(
            "expected a JSON array of issues or an object with an \"issues\" array".to_string(),
        ));
    };
    let issues =
        decoded.map_err(|e| Error::InputParse(format!("invalid issue record: {e}")))?;

    validate_issues(&issues)?;
    Ok(issues)
}

/// Read and parse an issues file.
pub fn load_issues(path: &Path) -> Result<Vec<Issue>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("failed to read issues file {}: {e}", path.display()),
        )
    })?;
    parse_issues(&content)
}

fn validate_issues(issues: &[Issue]) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, issue) in issues.iter().enumerate() {
        if issue.key.trim().is_empty() {
            return Err(Error::InputValidation(format!(
                "issue at index {idx} has an empty key"
            )));
        }
        if issue.component.trim().is_empty() {
            return Err(Error::InputValidation(format!(
                "issue {} has an empty component",
                issue.key
            )));
        }
        if !seen.insert(issue.key.as_str()) {
            return Err(Error::InputValidation(format!(
                "duplicate issue key: {}",
                issue.key
            )));
        }
    }
    Ok(())
}
