//! # Filter Arguments
//!
//! Raw filter arguments arrive as JSON (from the CLI, a check definition or
//! a caller). They are validated once, when the filter is attached to a
//! query, into a typed [`FilterArgs`] so evaluation never re-parses a regex
//! or a threshold per resource.

use chrono::Duration;
use osq_core::{Preset, QueryError, Result, StringPreset};
use regex::Regex;
use serde_json::Value;

/// Upper bound on an age threshold (100 years) to keep arithmetic on
/// timestamps in range.
const MAX_AGE_SECONDS: f64 = 100.0 * 365.0 * 86_400.0;

/// Validated arguments for one preset.
#[derive(Debug, Clone)]
pub enum FilterArgs {
    /// Membership list for `any_in` / `not_any_in`.
    Values(Vec<Value>),
    /// Integer threshold for relational presets.
    Threshold(i64),
    /// Compiled pattern for `matches_regex`.
    Pattern(Regex),
    /// Age threshold for datetime presets.
    Age(AgeArgs),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgeArgs {
    pub threshold: Duration,
    /// strftime-style format of the property's timestamps. `None` means the
    /// resource's default format.
    pub format: Option<String>,
}

impl FilterArgs {
    /// Validate raw JSON arguments against the arity/type contract of `preset`.
    pub fn parse(preset: Preset, raw: &Value) -> Result<Self> {
        match preset {
            Preset::Generic(_) => Ok(Self::Values(parse_list(preset, raw)?)),
            Preset::String(StringPreset::MatchesRegex) => parse_pattern(preset, raw).map(Self::Pattern),
            Preset::String(_) => {
                let values = parse_list(preset, raw)?;
                if let Some(bad) = values.iter().find(|v| !v.is_string()) {
                    return Err(QueryError::invalid(
                        preset,
                        format!("expected a list of strings, found {}", bad),
                    ));
                }
                Ok(Self::Values(values))
            }
            Preset::Integer(_) => parse_integer(preset, raw).map(Self::Threshold),
            Preset::DateTime(_) => parse_age(preset, raw).map(Self::Age),
        }
    }

    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Self::Values(v) => Some(v),
            _ => None,
        }
    }
}

fn parse_list(preset: Preset, raw: &Value) -> Result<Vec<Value>> {
    match raw {
        Value::Null => Err(QueryError::missing(preset, "a list of values is required")),
        Value::Array(items) if items.is_empty() => Err(QueryError::missing(
            preset,
            "values list must contain at least one item to match against",
        )),
        Value::Array(items) => Ok(items.clone()),
        scalar => Ok(vec![scalar.clone()]),
    }
}

fn parse_pattern(preset: Preset, raw: &Value) -> Result<Regex> {
    match raw {
        Value::Null => Err(QueryError::missing(preset, "a regex pattern is required")),
        Value::String(s) if s.is_empty() => {
            Err(QueryError::missing(preset, "regex pattern must not be empty"))
        }
        Value::String(s) => Regex::new(s).map_err(|e| QueryError::invalid(preset, e.to_string())),
        other => Err(QueryError::invalid(
            preset,
            format!("expected a regex pattern string, found {}", other),
        )),
    }
}

fn parse_integer(preset: Preset, raw: &Value) -> Result<i64> {
    match raw {
        Value::Null => Err(QueryError::missing(preset, "an integer threshold is required")),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| QueryError::invalid(preset, format!("'{}' is not an integer", n))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| QueryError::invalid(preset, format!("'{}' is not an integer", s))),
        other => Err(QueryError::invalid(
            preset,
            format!("expected an integer threshold, found {}", other),
        )),
    }
}

fn parse_age(preset: Preset, raw: &Value) -> Result<AgeArgs> {
    let (seconds, format) = match raw {
        Value::Null => {
            return Err(QueryError::missing(preset, "an age threshold is required"));
        }
        Value::Number(_) | Value::String(_) => (number_part(preset, "days", raw)? * 86_400.0, None),
        Value::Object(map) => {
            let mut total = 0.0;
            let mut format = None;
            for (key, value) in map {
                match key.as_str() {
                    "days" => total += number_part(preset, key, value)? * 86_400.0,
                    "hours" => total += number_part(preset, key, value)? * 3_600.0,
                    "minutes" => total += number_part(preset, key, value)? * 60.0,
                    "seconds" => total += number_part(preset, key, value)?,
                    "format" => match value {
                        Value::String(f) if !f.is_empty() => format = Some(f.clone()),
                        Value::Null => {}
                        other => {
                            return Err(QueryError::invalid(
                                preset,
                                format!("'format' must be a string, found {}", other),
                            ))
                        }
                    },
                    other => {
                        return Err(QueryError::invalid(
                            preset,
                            format!("unexpected age argument '{}'", other),
                        ))
                    }
                }
            }
            (total, format)
        }
        other => {
            return Err(QueryError::invalid(
                preset,
                format!("expected a number of days or an age object, found {}", other),
            ))
        }
    };

    if seconds > MAX_AGE_SECONDS {
        return Err(QueryError::invalid(preset, "age threshold is out of range"));
    }
    let millis = (seconds * 1000.0).round() as i64;
    if millis == 0 {
        return Err(QueryError::missing(
            preset,
            "at least one of days, hours, minutes or seconds must be non-zero",
        ));
    }
    Ok(AgeArgs {
        threshold: Duration::milliseconds(millis),
        format,
    })
}

fn number_part(preset: Preset, key: &str, value: &Value) -> Result<f64> {
    let n = match value {
        Value::Null => 0.0,
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    };
    if !n.is_finite() || n < 0.0 {
        return Err(QueryError::invalid(
            preset,
            format!("'{}' must be a non-negative number, found {}", key, value),
        ));
    }
    Ok(n)
}
