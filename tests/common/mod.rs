#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Value, json};

use triageplan::clock::{FixedClock, SharedClock, parse_timestamp};
use triageplan::config::Config;
use triageplan::issue::{Issue, Severity};
use triageplan::work_set::WorkPolicy;

pub const PINNED_AT: &str = "2024-07-01T09:00:00Z";

pub fn pinned_clock() -> SharedClock {
    Arc::new(FixedClock(parse_timestamp(PINNED_AT).unwrap()))
}

pub fn make_issue(key: &str, severity: &str, component: &str, effort: Option<i64>) -> Issue {
    Issue {
        key: key.to_string(),
        rule: "python:S3776".to_string(),
        severity: Severity::from(severity),
        issue_type: "CODE_SMELL".to_string(),
        component: component.to_string(),
        line: Some(10),
        message: format!("{key} message"),
        status: "OPEN".to_string(),
        effort,
        tags: vec![],
    }
}

/// JSON record in the analyzer's export shape.
pub fn issue_json(key: &str, severity: &str, component: &str, status: &str, effort: i64) -> Value {
    json!({
        "key": key,
        "rule": "python:S3776",
        "severity": severity,
        "type": "CODE_SMELL",
        "component": component,
        "line": 3,
        "message": format!("{key} message"),
        "status": status,
        "effort": effort,
        "tags": ["brain-overload"],
    })
}

/// The three-issue scenario: two findings in x.py, one in y.py.
pub fn scenario_issues_json() -> Value {
    json!([
        issue_json("A1", "BLOCKER", "x.py", "OPEN", 5),
        issue_json("A2", "MINOR", "x.py", "OPEN", 1),
        issue_json("A3", "MAJOR", "y.py", "OPEN", 2),
    ])
}

pub fn write_issues(dir: &Path, issues: &Value) -> PathBuf {
    let path = dir.join("issues.json");
    std::fs::write(&path, serde_json::to_string_pretty(issues).unwrap()).unwrap();
    path
}

/// Pinned, reproducible config rooted in `dir`.
pub fn test_config(dir: &Path, issues: PathBuf) -> Config {
    Config {
        issues,
        out_dir: dir.join("out"),
        cycle_id: Some("cycle-test".to_string()),
        generated_at: Some(PINNED_AT.to_string()),
        policy: WorkPolicy::default(),
    }
}
