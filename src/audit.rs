use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::{SharedClock, format_timestamp};
use crate::error::{Error, Result};

pub const CATEGORIZE_AGENT: &str = "CategorizeAgent";
pub const PLANNER_AGENT: &str = "PlannerAgent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    RunStarted,
    Filtered,
    IssueAssigned,
    IssueOmitted,
    GroupCreated,
    RunCompleted,
    PlanStarted,
    PlanCreated,
}

/// One line of an audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub agent: String,
    pub cycle_id: String,
    pub action: AuditAction,
    pub details: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Destination for decision records. Both engines call this inline, once per
/// decision, and abort on error.
pub trait AuditSink {
    fn log(&mut self, action: AuditAction, details: Value, reasoning: Option<&str>) -> Result<()>;
}

/// Identity shared by every event one sink writes.
struct EventStamp {
    agent: String,
    cycle_id: String,
    clock: SharedClock,
}

impl EventStamp {
    fn event(&self, action: AuditAction, details: Value, reasoning: Option<&str>) -> AuditEvent {
        AuditEvent {
            timestamp: format_timestamp(self.clock.now()),
            agent: self.agent.clone(),
            cycle_id: self.cycle_id.clone(),
            action,
            details,
            reasoning: reasoning.filter(|r| !r.is_empty()).map(str::to_string),
        }
    }
}

/// Appends events as newline-delimited JSON to a file.
///
/// The file is opened in append mode for every event, so lines land on disk
/// in call order and nothing is held in memory between calls.
pub struct AuditLogger {
    path: PathBuf,
    stamp: EventStamp,
}

impl AuditLogger {
    pub fn new(
        path: impl Into<PathBuf>,
        agent: impl Into<String>,
        cycle_id: impl Into<String>,
        clock: SharedClock,
    ) -> Self {
        Self {
            path: path.into(),
            stamp: EventStamp {
                agent: agent.into(),
                cycle_id: cycle_id.into(),
                clock,
            },
        }
    }

    fn append(&self, event: &AuditEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Audit(format!(
                    "failed to create audit dir {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let line = serde_json::to_string(event)
            .map_err(|e| Error::Audit(format!("failed to serialize audit event: {e}")))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                Error::Audit(format!(
                    "failed to open audit log {}: {e}",
                    self.path.display()
                ))
            })?;
        writeln!(file, "{line}").map_err(|e| {
            Error::Audit(format!(
                "failed to append to audit log {}: {e}",
                self.path.display()
            ))
        })
    }
}

impl AuditSink for AuditLogger {
    fn log(&mut self, action: AuditAction, details: Value, reasoning: Option<&str>) -> Result<()> {
        let event = self.stamp.event(action, details, reasoning);
        self.append(&event)
    }
}

/// Keeps events in memory. Useful for embedding the engines without touching
/// the filesystem.
pub struct MemoryAuditLog {
    stamp: EventStamp,
    events: Vec<AuditEvent>,
}

impl MemoryAuditLog {
    pub fn new(agent: impl Into<String>, cycle_id: impl Into<String>, clock: SharedClock) -> Self {
        Self {
            stamp: EventStamp {
                agent: agent.into(),
                cycle_id: cycle_id.into(),
                clock,
            },
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn actions(&self) -> Vec<AuditAction> {
        self.events.iter().map(|e| e.action).collect()
    }
}

impl AuditSink for MemoryAuditLog {
    fn log(&mut self, action: AuditAction, details: Value, reasoning: Option<&str>) -> Result<()> {
        let event = self.stamp.event(action, details, reasoning);
        self.events.push(event);
        Ok(())
    }
}

/// Read back a JSONL audit log.
pub fn read_audit_log(path: &Path) -> Result<Vec<AuditEvent>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| {
                Error::Audit(format!(
                    "malformed audit line {} in {}: {e}",
                    idx + 1,
                    path.display()
                ))
            })
        })
        .collect()
}
