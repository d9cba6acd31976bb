use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use osq_core::{Preset, Property, QueryError, Result, ValueKind};
use serde_json::Value;

use super::{mismatched, ClientSideHandler, PresetMappings};
use crate::args::FilterArgs;

/// Timestamp layout of most OpenStack APIs.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Age comparisons of timestamp properties against "now".
#[derive(Debug, Clone)]
pub struct DateTimeHandler<P> {
    pub(crate) mappings: PresetMappings<P>,
    now: DateTime<Utc>,
}

impl<P: Property> DateTimeHandler<P> {
    pub fn new(mappings: PresetMappings<P>) -> Self {
        Self {
            mappings,
            now: Utc::now(),
        }
    }

    pub fn set_now(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

impl<P: Property> ClientSideHandler<P> for DateTimeHandler<P> {
    fn kind(&self) -> ValueKind {
        ValueKind::DateTime
    }

    fn mappings(&self) -> &PresetMappings<P> {
        &self.mappings
    }

    fn evaluate(&self, preset: Preset, value: &Value, args: &FilterArgs) -> Result<bool> {
        let (Preset::DateTime(op), FilterArgs::Age(age)) = (preset, args) else {
            return Err(mismatched(preset, "age threshold"));
        };
        let raw = match value {
            Value::Null => return Ok(false),
            Value::String(s) if s.is_empty() => return Ok(false),
            Value::String(s) => s,
            other => {
                return Err(QueryError::invalid(
                    preset,
                    format!("expected a timestamp string, found {}", other),
                ))
            }
        };
        let format = age.format.as_deref().unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
        let timestamp = parse_timestamp(raw, format).ok_or_else(|| {
            QueryError::invalid(
                preset,
                format!("cannot parse timestamp '{}' with format '{}'", raw, format),
            )
        })?;
        Ok(op.compare(self.now - timestamp, age.threshold))
    }
}

/// Parse `raw` with `format`, read as UTC when the format carries no
/// offset. RFC 3339 is accepted as a fallback.
pub fn parse_timestamp(raw: &str, format: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(raw, format) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
