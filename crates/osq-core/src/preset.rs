//! # Preset Vocabulary
//!
//! Four closed, non-overlapping enumerations of comparison operators. A
//! preset's meaning never depends on the resource type; only the property
//! it is applied to changes.

use crate::error::{QueryError, Result};
use crate::property::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Kind-specific enumerations
// =============================================================================

/// Equality-based set membership. Valid on every property kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenericPreset {
    AnyIn,
    NotAnyIn,
}

impl GenericPreset {
    pub const ALL: [GenericPreset; 2] = [Self::AnyIn, Self::NotAnyIn];

    pub fn name(self) -> &'static str {
        match self {
            Self::AnyIn => "any_in",
            Self::NotAnyIn => "not_any_in",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "any_in" | "in" => Some(Self::AnyIn),
            "not_any_in" | "not_in" => Some(Self::NotAnyIn),
            _ => None,
        }
    }

    /// Turn "the value was found in the list" into the preset's verdict.
    #[inline]
    pub fn apply(self, found: bool) -> bool {
        match self {
            Self::AnyIn => found,
            Self::NotAnyIn => !found,
        }
    }

    /// Membership of `value` in `list` by equality, then [`apply`](Self::apply).
    pub fn matches<T: PartialEq>(self, list: &[T], value: &T) -> bool {
        self.apply(contains(list, value))
    }
}

/// True iff some element of `list` equals `value`.
#[inline]
pub fn contains<T: PartialEq>(list: &[T], value: &T) -> bool {
    list.iter().any(|candidate| candidate == value)
}

/// Relational comparison against a scalar threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntegerPreset {
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
}

impl IntegerPreset {
    pub const ALL: [IntegerPreset; 4] = [
        Self::LessThan,
        Self::GreaterThan,
        Self::LessOrEqual,
        Self::GreaterOrEqual,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::LessThan => "less_than",
            Self::GreaterThan => "greater_than",
            Self::LessOrEqual => "less_or_equal",
            Self::GreaterOrEqual => "greater_or_equal",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "less_than" | "lt" => Some(Self::LessThan),
            "greater_than" | "gt" => Some(Self::GreaterThan),
            "less_or_equal" | "less_than_or_equal_to" | "lte" => Some(Self::LessOrEqual),
            "greater_or_equal" | "greater_than_or_equal_to" | "gte" => Some(Self::GreaterOrEqual),
            _ => None,
        }
    }

    /// `value <op> threshold`.
    #[inline]
    pub fn compare<T: Ord>(self, value: T, threshold: T) -> bool {
        match self {
            Self::LessThan => value < threshold,
            Self::GreaterThan => value > threshold,
            Self::LessOrEqual => value <= threshold,
            Self::GreaterOrEqual => value >= threshold,
        }
    }
}

/// Pattern and literal-membership tests on string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StringPreset {
    MatchesRegex,
    AnyIn,
    NotAnyIn,
}

impl StringPreset {
    pub const ALL: [StringPreset; 3] = [Self::MatchesRegex, Self::AnyIn, Self::NotAnyIn];

    pub fn name(self) -> &'static str {
        match self {
            Self::MatchesRegex => "matches_regex",
            Self::AnyIn => "any_in",
            Self::NotAnyIn => "not_any_in",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "matches_regex" | "regex" => Some(Self::MatchesRegex),
            "any_in" | "in" => Some(Self::AnyIn),
            "not_any_in" | "not_in" => Some(Self::NotAnyIn),
            _ => None,
        }
    }

    /// The membership law shared with [`GenericPreset`], if this is a membership preset.
    pub fn membership(self) -> Option<GenericPreset> {
        match self {
            Self::AnyIn => Some(GenericPreset::AnyIn),
            Self::NotAnyIn => Some(GenericPreset::NotAnyIn),
            Self::MatchesRegex => None,
        }
    }
}

/// Age of a timestamp relative to "now".
///
/// The boundary instant (elapsed time exactly equal to the threshold)
/// counts as "older": `OlderThan` and `OlderThanOrEqual` include it,
/// `YoungerThan` excludes it and `YoungerThanOrEqual` includes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DateTimePreset {
    OlderThan,
    YoungerThan,
    OlderThanOrEqual,
    YoungerThanOrEqual,
}

impl DateTimePreset {
    pub const ALL: [DateTimePreset; 4] = [
        Self::OlderThan,
        Self::YoungerThan,
        Self::OlderThanOrEqual,
        Self::YoungerThanOrEqual,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::OlderThan => "older_than",
            Self::YoungerThan => "younger_than",
            Self::OlderThanOrEqual => "older_than_or_equal",
            Self::YoungerThanOrEqual => "younger_than_or_equal",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "older_than" | "before" => Some(Self::OlderThan),
            "younger_than" | "after" => Some(Self::YoungerThan),
            "older_than_or_equal" | "older_than_or_equal_to" => Some(Self::OlderThanOrEqual),
            "younger_than_or_equal" | "younger_than_or_equal_to" => {
                Some(Self::YoungerThanOrEqual)
            }
            _ => None,
        }
    }

    /// Compare the time elapsed since a timestamp against a threshold.
    #[inline]
    pub fn compare<T: Ord>(self, elapsed: T, threshold: T) -> bool {
        match self {
            Self::OlderThan | Self::OlderThanOrEqual => elapsed >= threshold,
            Self::YoungerThan => elapsed < threshold,
            Self::YoungerThanOrEqual => elapsed <= threshold,
        }
    }
}

// =============================================================================
// Preset
// =============================================================================

/// A named comparison operator usable in a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Preset {
    Generic(GenericPreset),
    Integer(IntegerPreset),
    String(StringPreset),
    DateTime(DateTimePreset),
}

impl Preset {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Generic(_) => ValueKind::Generic,
            Self::Integer(_) => ValueKind::Integer,
            Self::String(_) => ValueKind::String,
            Self::DateTime(_) => ValueKind::DateTime,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Generic(p) => p.name(),
            Self::Integer(p) => p.name(),
            Self::String(p) => p.name(),
            Self::DateTime(p) => p.name(),
        }
    }

    /// Every preset of every kind, in declaration order.
    pub fn all() -> Vec<Preset> {
        let mut out = Vec::new();
        out.extend(GenericPreset::ALL.iter().copied().map(Self::Generic));
        out.extend(IntegerPreset::ALL.iter().copied().map(Self::Integer));
        out.extend(StringPreset::ALL.iter().copied().map(Self::String));
        out.extend(DateTimePreset::ALL.iter().copied().map(Self::DateTime));
        out
    }

    /// Presets of exactly one kind.
    pub fn of_kind(kind: ValueKind) -> Vec<Preset> {
        Self::all().into_iter().filter(|p| p.kind() == kind).collect()
    }

    /// Generic presets apply to any property; the rest only to their own kind.
    pub fn is_valid_for(&self, kind: ValueKind) -> bool {
        matches!(self.kind(), ValueKind::Generic) || self.kind() == kind
    }

    fn from_kind_and_name(kind: ValueKind, name: &str) -> Option<Self> {
        match kind {
            ValueKind::Generic => GenericPreset::from_name(name).map(Self::Generic),
            ValueKind::Integer => IntegerPreset::from_name(name).map(Self::Integer),
            ValueKind::String => StringPreset::from_name(name).map(Self::String),
            ValueKind::DateTime => DateTimePreset::from_name(name).map(Self::DateTime),
        }
    }

    /// Resolve a preset name against the kind of the property it will be
    /// applied to.
    ///
    /// `kind::name` is taken literally. A bare name prefers the property's own
    /// kind, then the generic kind, then whichever single kind defines it; the
    /// kind check proper happens when the filter is attached to a query.
    pub fn resolve(name: &str, property_kind: ValueKind) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        if normalized.contains("::") {
            return normalized.parse();
        }
        if let Some(p) = Self::from_kind_and_name(property_kind, &normalized) {
            return Ok(p);
        }
        if let Some(p) = Self::from_kind_and_name(ValueKind::Generic, &normalized) {
            return Ok(p);
        }
        ValueKind::ALL
            .iter()
            .find_map(|k| Self::from_kind_and_name(*k, &normalized))
            .ok_or_else(|| QueryError::UnknownPreset(name.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.kind(), self.name())
    }
}

impl FromStr for Preset {
    type Err = QueryError;

    /// Parses the qualified `kind::name` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let (kind, name) = normalized
            .split_once("::")
            .ok_or_else(|| QueryError::UnknownPreset(s.to_string()))?;
        let kind: ValueKind = kind
            .parse()
            .map_err(|_| QueryError::UnknownPreset(s.to_string()))?;
        Self::from_kind_and_name(kind, name).ok_or_else(|| QueryError::UnknownPreset(s.to_string()))
    }
}

impl TryFrom<String> for Preset {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Preset> for String {
    fn from(p: Preset) -> String {
        p.to_string()
    }
}

impl From<GenericPreset> for Preset {
    fn from(p: GenericPreset) -> Self {
        Self::Generic(p)
    }
}

impl From<IntegerPreset> for Preset {
    fn from(p: IntegerPreset) -> Self {
        Self::Integer(p)
    }
}

impl From<StringPreset> for Preset {
    fn from(p: StringPreset) -> Self {
        Self::String(p)
    }
}

impl From<DateTimePreset> for Preset {
    fn from(p: DateTimePreset) -> Self {
        Self::DateTime(p)
    }
}
