use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::audit::{AuditAction, AuditSink};
use crate::error::Result;
use crate::work_set::{WorkGroup, WorkSet};

/// Instructions every step carries, regardless of the file.
pub const STEP_CHANGES: [&str; 3] = [
    "Identify the exact rule violations at the referenced line(s).",
    "Apply minimal, low-risk refactor/fix to satisfy the Sonar rule.",
    "Run unit tests and update/add tests if behavior changes.",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixStep {
    pub goal: String,
    pub changes: Vec<String>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixPlan {
    pub group_id: String,
    pub issue_keys: Vec<String>,
    pub summary: String,
    pub steps: Vec<FixStep>,
}

/// Build the step for a single file.
pub fn file_step(file: &str) -> FixStep {
    FixStep {
        goal: format!("Address issues in {file}"),
        changes: STEP_CHANGES.iter().map(|c| c.to_string()).collect(),
        files: vec![file.to_string()],
    }
}

/// Build the plan for one group from its aggregate metadata only.
pub fn plan_for_group(group: &WorkGroup) -> FixPlan {
    FixPlan {
        group_id: group.group_id.clone(),
        issue_keys: group.issue_keys.clone(),
        summary: format!(
            "Plan to address {} priority issues in '{}'.",
            group.priority, group.name
        ),
        steps: group.touched_files.iter().map(|f| file_step(f)).collect(),
    }
}

/// Turns a [`WorkSet`] into one [`FixPlan`] per group.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner;

impl Planner {
    pub fn new() -> Self {
        Self
    }

    /// Plans come back in `work_set.groups` order.
    pub fn plan(&self, work_set: &WorkSet, audit: &mut dyn AuditSink) -> Result<Vec<FixPlan>> {
        audit.log(
            AuditAction::RunStarted,
            json!({ "group_count": work_set.groups.len() }),
            Some("Start planning for groups."),
        )?;

        let mut plans = Vec::with_capacity(work_set.groups.len());
        for group in &work_set.groups {
            audit.log(
                AuditAction::PlanStarted,
                json!({ "group_id": group.group_id, "issue_keys": group.issue_keys }),
                Some("Create fix plan."),
            )?;

            let plan = plan_for_group(group);

            audit.log(
                AuditAction::PlanCreated,
                json!({
                    "group_id": group.group_id,
                    "steps": plan.steps.len(),
                    "files": group.touched_files,
                    "priority": group.priority,
                }),
                Some("Generated per-file steps to keep changes reviewable and reduce conflicts."),
            )?;
            plans.push(plan);
        }

        audit.log(
            AuditAction::RunCompleted,
            json!({ "plan_count": plans.len() }),
            Some("Completed planning run."),
        )?;
        info!(cycle_id = %work_set.cycle_id, plans = plans.len(), "planning complete");

        Ok(plans)
    }
}
