mod common;

use std::collections::{HashMap, HashSet};

use triageplan::audit::{AuditAction, CATEGORIZE_AGENT, MemoryAuditLog};
use triageplan::categorize::{Categorizer, worst_severity};
use triageplan::issue::{Issue, Severity};
use triageplan::work_set::{Priority, WorkPolicy, WorkSet};

use common::{make_issue, pinned_clock};

const SEVERITIES: [&str; 6] = ["BLOCKER", "CRITICAL", "MAJOR", "MINOR", "INFO", "ODD"];
const STATUSES: [&str; 4] = ["OPEN", "REOPENED", "CLOSED", "RESOLVED"];

/// Small deterministic generator so every run sees the same issue sets.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn generate(seed: u64, count: usize) -> Vec<Issue> {
    let mut rng = Lcg(seed);
    (0..count)
        .map(|n| {
            let mut issue = make_issue(
                &format!("K{n}"),
                SEVERITIES[rng.next(SEVERITIES.len())],
                &format!("src/file_{}.py", rng.next(7)),
                match rng.next(4) {
                    0 => None,
                    e => Some(e as i64 * 3),
                },
            );
            issue.status = STATUSES[rng.next(STATUSES.len())].to_string();
            issue
        })
        .collect()
}

fn categorize(issues: &[Issue], policy: WorkPolicy) -> (WorkSet, MemoryAuditLog) {
    let mut audit = MemoryAuditLog::new(CATEGORIZE_AGENT, "cycle-prop", pinned_clock());
    let ws = Categorizer::new(policy, pinned_clock())
        .categorize(issues, "cycle-prop", &mut audit)
        .unwrap();
    (ws, audit)
}

fn policies() -> Vec<WorkPolicy> {
    let mut out = Vec::new();
    for max_groups in [0, 1, 3, 10] {
        for max_issues_per_group in [0, 1, 2, 8] {
            out.push(WorkPolicy {
                max_groups,
                max_issues_per_group,
                avoid_file_overlap_between_groups: true,
            });
        }
    }
    out
}

fn check_invariants(issues: &[Issue], policy: &WorkPolicy, ws: &WorkSet) {
    let actionable: HashSet<&str> = issues
        .iter()
        .filter(|i| i.is_actionable())
        .map(|i| i.key.as_str())
        .collect();

    // Partition: every actionable key exactly once across groups + omitted.
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for key in ws
        .groups
        .iter()
        .flat_map(|g| g.issue_keys.iter())
        .chain(ws.omitted_issue_keys.iter())
    {
        *seen.entry(key.as_str()).or_default() += 1;
    }
    assert_eq!(seen.len(), actionable.len());
    for key in &actionable {
        assert_eq!(seen.get(key), Some(&1), "key {key} not placed exactly once");
    }

    // Bounds.
    assert!(ws.groups.len() <= policy.max_groups);
    for group in &ws.groups {
        // A new file's group is always seeded with its first issue.
        assert!(group.issue_keys.len() <= policy.max_issues_per_group.max(1));
        assert_eq!(group.touched_files.len(), 1);
    }

    // File -> group is injective.
    let files: HashSet<&str> = ws
        .groups
        .iter()
        .flat_map(|g| g.touched_files.iter().map(String::as_str))
        .collect();
    assert_eq!(files.len(), ws.groups.len());

    // Priority follows the worst member severity.
    let by_key: HashMap<&str, &Issue> = issues.iter().map(|i| (i.key.as_str(), i)).collect();
    for group in &ws.groups {
        let severities: Vec<&Severity> = group
            .issue_keys
            .iter()
            .map(|k| &by_key[k.as_str()].severity)
            .collect();
        let worst = worst_severity(severities.iter().copied()).unwrap();
        assert_eq!(group.priority, Priority::from_severity(worst));
        assert!(
            group
                .issue_keys
                .iter()
                .all(|k| by_key[k.as_str()].component == group.touched_files[0])
        );
    }

    // Sequential ids.
    for (idx, group) in ws.groups.iter().enumerate() {
        assert_eq!(group.group_id, format!("group-{}", idx + 1));
    }
}

#[test]
fn test_invariants_hold_across_generated_inputs() {
    for seed in 1..=25u64 {
        let issues = generate(seed, 40);
        for policy in policies() {
            let (ws, _) = categorize(&issues, policy.clone());
            check_invariants(&issues, &policy, &ws);
        }
    }
}

#[test]
fn test_one_audit_event_per_decision() {
    for seed in [3u64, 11, 19] {
        let issues = generate(seed, 30);
        let actionable = issues.iter().filter(|i| i.is_actionable()).count();
        let (ws, audit) = categorize(&issues, WorkPolicy::default());

        let decisions = audit
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e.action,
                    AuditAction::IssueAssigned | AuditAction::IssueOmitted | AuditAction::GroupCreated
                )
            })
            .count();
        assert_eq!(decisions, actionable);

        let created = audit
            .events()
            .iter()
            .filter(|e| e.action == AuditAction::GroupCreated)
            .count();
        assert_eq!(created, ws.groups.len());

        let omitted: Vec<String> = audit
            .events()
            .iter()
            .filter(|e| e.action == AuditAction::IssueOmitted)
            .map(|e| e.details["issue_key"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(omitted, ws.omitted_issue_keys);
    }
}

#[test]
fn test_same_input_same_output() {
    let issues = generate(7, 50);
    let policy = WorkPolicy {
        max_groups: 4,
        max_issues_per_group: 3,
        avoid_file_overlap_between_groups: true,
    };
    let (a, audit_a) = categorize(&issues, policy.clone());
    let (b, audit_b) = categorize(&issues, policy);
    assert_eq!(
        serde_json::to_string_pretty(&a).unwrap(),
        serde_json::to_string_pretty(&b).unwrap()
    );
    assert_eq!(audit_a.events(), audit_b.events());
}

#[test]
fn test_nine_issues_in_one_file() {
    let issues: Vec<Issue> = (0..9i64)
        .map(|n| make_issue(&format!("z{n}"), "MAJOR", "z.py", Some(10 * (n + 1))))
        .collect();
    let (ws, audit) = categorize(&issues, WorkPolicy::default());

    assert_eq!(ws.groups.len(), 1);
    assert_eq!(ws.groups[0].issue_keys.len(), 8);
    // Lowest effort sorts last and is the one left out.
    assert_eq!(ws.omitted_issue_keys, vec!["z0"]);
    assert!(!ws.groups[0].issue_keys.contains(&"z0".to_string()));

    let omission = audit
        .events()
        .iter()
        .find(|e| e.action == AuditAction::IssueOmitted)
        .unwrap();
    assert_eq!(omission.details["reason"], "max_issues_per_group");
    assert_eq!(omission.reasoning.as_deref(), Some("Group for this file is full per policy."));
}

#[test]
fn test_worse_issues_claim_groups_first() {
    let issues = vec![
        make_issue("late-info", "INFO", "a.py", Some(50)),
        make_issue("early-blocker", "BLOCKER", "b.py", None),
    ];
    let policy = WorkPolicy {
        max_groups: 1,
        ..WorkPolicy::default()
    };
    let (ws, _) = categorize(&issues, policy);
    assert_eq!(ws.groups[0].touched_files, vec!["b.py"]);
    assert_eq!(ws.omitted_issue_keys, vec!["late-info"]);
}
