use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::audit::{AuditAction, AuditSink};
use crate::clock::{SharedClock, format_timestamp};
use crate::error::Result;
use crate::issue::{Issue, Severity};
use crate::work_set::{
    Priority, WorkGroup, WorkPolicy, WorkSet, group_id, group_name, group_rationale,
};

/// Why an actionable issue was left out of every group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OmissionReason {
    MaxIssuesPerGroup,
    MaxGroups,
}

impl OmissionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            OmissionReason::MaxIssuesPerGroup => "max_issues_per_group",
            OmissionReason::MaxGroups => "max_groups",
        }
    }

    fn reasoning(self) -> &'static str {
        match self {
            OmissionReason::MaxIssuesPerGroup => "Group for this file is full per policy.",
            OmissionReason::MaxGroups => "Reached max_groups limit.",
        }
    }
}

impl fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order issues worst-first: severity rank ascending, then effort descending.
/// The sort is stable, so ties keep input order.
pub fn sort_for_grouping(issues: &mut [&Issue]) {
    issues.sort_by_key(|issue| (issue.severity.rank(), Reverse(issue.effort_or_zero())));
}

/// Lowest-rank severity; the first one wins on ties.
pub fn worst_severity<'a>(
    severities: impl IntoIterator<Item = &'a Severity>,
) -> Option<&'a Severity> {
    severities.into_iter().min_by_key(|s| s.rank())
}

/// A group under construction. Name, priority and rationale are never
/// stored; they are derived from `severities` whenever needed.
struct GroupSlot {
    group_id: String,
    file: String,
    issue_keys: Vec<String>,
    severities: Vec<Severity>,
}

impl GroupSlot {
    fn worst(&self) -> &Severity {
        // A slot is always seeded with one issue.
        worst_severity(&self.severities).unwrap_or(&self.severities[0])
    }

    fn priority(&self) -> Priority {
        Priority::from_severity(self.worst())
    }

    fn name(&self) -> String {
        group_name(self.priority(), &self.file)
    }

    fn rationale(&self) -> String {
        group_rationale(self.worst())
    }

    fn into_work_group(self) -> WorkGroup {
        WorkGroup {
            name: self.name(),
            priority: self.priority(),
            rationale: self.rationale(),
            group_id: self.group_id,
            issue_keys: self.issue_keys,
            touched_files: vec![self.file],
        }
    }
}

enum Placement {
    Assigned(usize),
    Created(usize),
    Omitted(OmissionReason),
}

/// Bookkeeping for a single grouping pass: groups in creation order plus
/// the file each one owns.
struct GroupBuilder<'p> {
    policy: &'p WorkPolicy,
    slots: Vec<GroupSlot>,
    by_file: HashMap<String, usize>,
}

impl<'p> GroupBuilder<'p> {
    fn new(policy: &'p WorkPolicy) -> Self {
        Self {
            policy,
            slots: Vec::new(),
            by_file: HashMap::new(),
        }
    }

    fn place(&mut self, issue: &Issue) -> Placement {
        if let Some(&idx) = self.by_file.get(&issue.component) {
            let slot = &mut self.slots[idx];
            if slot.issue_keys.len() >= self.policy.max_issues_per_group {
                return Placement::Omitted(OmissionReason::MaxIssuesPerGroup);
            }
            slot.issue_keys.push(issue.key.clone());
            slot.severities.push(issue.severity.clone());
            return Placement::Assigned(idx);
        }

        if self.slots.len() >= self.policy.max_groups {
            return Placement::Omitted(OmissionReason::MaxGroups);
        }
        // The seed issue is placed without consulting max_issues_per_group.
        let idx = self.slots.len();
        self.slots.push(GroupSlot {
            group_id: group_id(idx + 1),
            file: issue.component.clone(),
            issue_keys: vec![issue.key.clone()],
            severities: vec![issue.severity.clone()],
        });
        self.by_file.insert(issue.component.clone(), idx);
        Placement::Created(idx)
    }

    fn slot(&self, idx: usize) -> &GroupSlot {
        &self.slots[idx]
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn finish(self) -> Vec<WorkGroup> {
        self.slots
            .into_iter()
            .map(GroupSlot::into_work_group)
            .collect()
    }
}

/// Buckets actionable issues into per-file work groups under a [`WorkPolicy`].
pub struct Categorizer {
    policy: WorkPolicy,
    clock: SharedClock,
}

impl Categorizer {
    pub fn new(policy: WorkPolicy, clock: SharedClock) -> Self {
        Self { policy, clock }
    }

    /// Run one grouping pass. Every decision is written to `audit` before the
    /// next issue is considered; an audit failure aborts the run.
    pub fn categorize(
        &self,
        issues: &[Issue],
        cycle_id: &str,
        audit: &mut dyn AuditSink,
    ) -> Result<WorkSet> {
        audit.log(
            AuditAction::RunStarted,
            json!({ "issue_count": issues.len() }),
            Some("Start triage and grouping."),
        )?;

        if !self.policy.avoid_file_overlap_between_groups {
            warn!("file overlap between groups was requested; groups stay confined to one file");
        }

        let mut open: Vec<&Issue> = issues.iter().filter(|i| i.is_actionable()).collect();
        audit.log(
            AuditAction::Filtered,
            json!({ "kept": open.len(), "dropped": issues.len() - open.len() }),
            Some("Keep only OPEN/REOPENED issues for this cycle."),
        )?;
        debug!(
            kept = open.len(),
            dropped = issues.len() - open.len(),
            "filtered issues"
        );

        sort_for_grouping(&mut open);

        let mut builder = GroupBuilder::new(&self.policy);
        let mut omitted = Vec::new();

        for issue in open {
            match builder.place(issue) {
                Placement::Assigned(idx) => {
                    let slot = builder.slot(idx);
                    audit.log(
                        AuditAction::IssueAssigned,
                        json!({
                            "issue_key": issue.key,
                            "group_id": slot.group_id,
                            "file": issue.component,
                            "severity": issue.severity,
                        }),
                        Some("Same file as existing group; assign to avoid cross-group conflicts."),
                    )?;
                }
                Placement::Created(idx) => {
                    let slot = builder.slot(idx);
                    debug!(group_id = %slot.group_id, file = %slot.file, "group created");
                    audit.log(
                        AuditAction::GroupCreated,
                        json!({
                            "group_id": slot.group_id,
                            "issue_keys": slot.issue_keys,
                            "touched_files": [slot.file],
                            "worst_severity": slot.worst(),
                        }),
                        Some(slot.rationale().as_str()),
                    )?;
                }
                Placement::Omitted(reason) => {
                    debug!(issue_key = %issue.key, %reason, "issue omitted");
                    omitted.push(issue.key.clone());
                    audit.log(
                        AuditAction::IssueOmitted,
                        json!({
                            "issue_key": issue.key,
                            "reason": reason,
                            "file": issue.component,
                            "severity": issue.severity,
                        }),
                        Some(reason.reasoning()),
                    )?;
                }
            }
        }

        let group_count = builder.len();
        let work_set = WorkSet {
            cycle_id: cycle_id.to_string(),
            generated_at: format_timestamp(self.clock.now()),
            policy: self.policy.clone(),
            groups: builder.finish(),
            omitted_issue_keys: omitted,
        };

        audit.log(
            AuditAction::RunCompleted,
            json!({ "groups": group_count, "omitted": work_set.omitted_issue_keys.len() }),
            Some("Completed grouping run."),
        )?;
        info!(
            cycle_id,
            groups = group_count,
            omitted = work_set.omitted_issue_keys.len(),
            "categorization complete"
        );

        Ok(work_set)
    }
}
