use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{Error, Result};

/// Source of "now" for everything that stamps output.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Used for `--generated-at` and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Render a UTC instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC 3339 timestamp, normalizing it to UTC with sub-second
/// precision dropped.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|e| Error::ConfigValidation(format!("invalid timestamp '{raw}': {e}")))?;
    let utc = parsed.with_timezone(&Utc);
    DateTime::from_timestamp(utc.timestamp(), 0)
        .ok_or_else(|| Error::ConfigValidation(format!("timestamp out of range: {raw}")))
}
