use std::fmt;

use serde::{Deserialize, Serialize};

use crate::issue::Severity;

pub const DEFAULT_MAX_GROUPS: usize = 5;
pub const DEFAULT_MAX_ISSUES_PER_GROUP: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// BLOCKER/CRITICAL are high, MAJOR is medium, anything else is low.
    pub fn from_severity(severity: &Severity) -> Self {
        match severity {
            Severity::Blocker | Severity::Critical => Priority::High,
            Severity::Major => Priority::Medium,
            _ => Priority::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Capitalized form used in group names.
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limits applied while grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPolicy {
    pub max_groups: usize,
    pub max_issues_per_group: usize,
    /// Recorded in the snapshot only; groups are always confined to one file.
    pub avoid_file_overlap_between_groups: bool,
}

impl Default for WorkPolicy {
    fn default() -> Self {
        Self {
            max_groups: DEFAULT_MAX_GROUPS,
            max_issues_per_group: DEFAULT_MAX_ISSUES_PER_GROUP,
            avoid_file_overlap_between_groups: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkGroup {
    pub group_id: String,
    pub name: String,
    pub priority: Priority,
    pub rationale: String,
    pub issue_keys: Vec<String>,
    pub touched_files: Vec<String>,
}

/// Result of one categorization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSet {
    pub cycle_id: String,
    pub generated_at: String,
    pub policy: WorkPolicy,
    pub groups: Vec<WorkGroup>,
    #[serde(default)]
    pub omitted_issue_keys: Vec<String>,
}

pub fn group_id(ordinal: usize) -> String {
    format!("group-{ordinal}")
}

pub fn group_name(priority: Priority, file: &str) -> String {
    format!("{} issues in {file}", priority.label())
}

pub fn group_rationale(worst: &Severity) -> String {
    format!(
        "Grouped by file path to reduce merge-conflict risk; worst severity in group: {worst}."
    )
}
