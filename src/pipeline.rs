use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::audit::{AuditLogger, CATEGORIZE_AGENT, PLANNER_AGENT};
use crate::categorize::Categorizer;
use crate::clock::{FixedClock, SharedClock, SystemClock, format_timestamp, parse_timestamp};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::issue::load_issues;
use crate::plan::Planner;

/// Where one run writes its documents.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn work_set_path(&self) -> PathBuf {
        self.root.join("work_set.json")
    }

    pub fn fix_plans_dir(&self) -> PathBuf {
        self.root.join("fix_plans")
    }

    pub fn plan_path(&self, group_id: &str) -> PathBuf {
        self.fix_plans_dir().join(format!("{group_id}.json"))
    }

    pub fn audit_dir(&self) -> PathBuf {
        self.root.join("audit_logs")
    }

    pub fn categorize_log_path(&self) -> PathBuf {
        self.audit_dir().join("audit_log_categorize_agent.jsonl")
    }

    pub fn planner_log_path(&self) -> PathBuf {
        self.audit_dir().join("audit_log_planner_agent.jsonl")
    }

    fn create_dirs(&self) -> Result<()> {
        for dir in [self.root.clone(), self.fix_plans_dir(), self.audit_dir()] {
            fs::create_dir_all(&dir).map_err(|e| {
                Error::Output(format!("failed to create {}: {e}", dir.display()))
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub cycle_id: String,
    pub issue_count: usize,
    pub group_count: usize,
    pub omitted_count: usize,
    pub plan_count: usize,
    pub work_set_path: PathBuf,
}

/// Fixed clock when `generated_at` is configured, wall clock otherwise.
pub fn clock_for(config: &Config) -> Result<SharedClock> {
    match config.generated_at {
        Some(ref raw) => Ok(Arc::new(FixedClock(parse_timestamp(raw)?))),
        None => Ok(Arc::new(SystemClock)),
    }
}

pub fn default_cycle_id(clock: &SharedClock) -> String {
    format!("cycle-{}", format_timestamp(clock.now()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Output(format!("failed to serialize {}: {e}", path.display())))?;
    fs::write(path, content)
        .map_err(|e| Error::Output(format!("failed to write {}: {e}", path.display())))?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}

/// Run one cycle end to end: load issues, group, plan, and persist
/// everything under `config.out_dir`.
pub fn run(config: &Config) -> Result<RunSummary> {
    let clock = clock_for(config)?;
    let cycle_id = config
        .cycle_id
        .clone()
        .unwrap_or_else(|| default_cycle_id(&clock));

    let issues = load_issues(&config.issues)?;
    info!(
        cycle_id = %cycle_id,
        issues = issues.len(),
        path = %config.issues.display(),
        "issues loaded"
    );

    let layout = OutputLayout::new(&config.out_dir);
    layout.create_dirs()?;

    let mut categorize_log = AuditLogger::new(
        layout.categorize_log_path(),
        CATEGORIZE_AGENT,
        &cycle_id,
        clock.clone(),
    );
    let work_set = Categorizer::new(config.policy.clone(), clock.clone()).categorize(
        &issues,
        &cycle_id,
        &mut categorize_log,
    )?;
    write_json(&layout.work_set_path(), &work_set)?;

    let mut planner_log =
        AuditLogger::new(layout.planner_log_path(), PLANNER_AGENT, &cycle_id, clock);
    let plans = Planner::new().plan(&work_set, &mut planner_log)?;
    for plan in &plans {
        write_json(&layout.plan_path(&plan.group_id), plan)?;
    }

    Ok(RunSummary {
        cycle_id,
        issue_count: issues.len(),
        group_count: work_set.groups.len(),
        omitted_count: work_set.omitted_issue_keys.len(),
        plan_count: plans.len(),
        work_set_path: layout.work_set_path(),
    })
}
