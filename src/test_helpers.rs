use crate::issue::{Issue, Severity};

/// Create an OPEN `Issue` with sensible defaults for tests.
pub fn issue(key: &str, severity: &str, component: &str, effort: Option<i64>) -> Issue {
    Issue {
        key: key.to_string(),
        rule: "python:S1192".to_string(),
        severity: Severity::from(severity),
        issue_type: "CODE_SMELL".to_string(),
        component: component.to_string(),
        line: Some(1),
        message: format!("{key} message"),
        status: "OPEN".to_string(),
        effort,
        tags: vec![],
    }
}

pub fn issue_with_status(key: &str, severity: &str, component: &str, status: &str) -> Issue {
    Issue {
        status: status.to_string(),
        ..issue(key, severity, component, None)
    }
}
