//! # Handlers
//!
//! A resource type owns exactly one [`ClientSideHandlers`] registry (one
//! handler per value kind) and one [`ServerSideHandler`] capability table.
//! Client-side evaluation is the semantic source of truth; the server-side
//! table is an optimization and must stay a subset of it, which
//! [`ServerSideHandler::check_consistency`] verifies.

pub mod datetime;
pub mod generic;
pub mod integer;
pub mod server;
pub mod string;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use osq_core::{Preset, Property, QueryError, Result, ValueKind};
use serde_json::Value;

use crate::args::FilterArgs;

pub use datetime::{parse_timestamp, DateTimeHandler, DEFAULT_TIMESTAMP_FORMAT};
pub use generic::GenericHandler;
pub use integer::IntegerHandler;
pub use server::{cutoff, single_value, single_value_with, value_list, ServerSideHandler, Translation};
pub use string::StringHandler;

// =============================================================================
// Preset → property mappings
// =============================================================================

/// Which properties a preset is declared for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Supported<P> {
    /// Every property whose kind the preset is valid for.
    All,
    Only(Vec<P>),
}

impl<P: Property> Supported<P> {
    fn contains(&self, prop: P) -> bool {
        match self {
            Self::All => true,
            Self::Only(props) => props.contains(&prop),
        }
    }
}

/// Per-preset restriction of the properties a handler accepts. A preset
/// with no entry is not supported at all.
#[derive(Debug, Clone)]
pub struct PresetMappings<P> {
    entries: HashMap<Preset, Supported<P>>,
}

impl<P: Property> Default for PresetMappings<P> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<P: Property> PresetMappings<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every preset of `kind`, on every property of a matching kind.
    pub fn for_kind(kind: ValueKind) -> Self {
        let mut mappings = Self::new();
        for preset in Preset::of_kind(kind) {
            mappings.entries.insert(preset, Supported::All);
        }
        mappings
    }

    pub fn allow(mut self, preset: impl Into<Preset>, supported: Supported<P>) -> Self {
        self.entries.insert(preset.into(), supported);
        self
    }

    pub fn supports(&self, preset: Preset, prop: P) -> bool {
        preset.is_valid_for(prop.kind())
            && self
                .entries
                .get(&preset)
                .map_or(false, |supported| supported.contains(prop))
    }
}

// =============================================================================
// Client-side handler trait
// =============================================================================

/// Evaluates the presets of one value kind against a single property value.
pub trait ClientSideHandler<P: Property> {
    fn kind(&self) -> ValueKind;

    fn mappings(&self) -> &PresetMappings<P>;

    /// True iff `preset` is registered for `prop` on this resource type.
    fn check_supported(&self, preset: Preset, prop: P) -> bool {
        preset.kind() == self.kind() && self.mappings().supports(preset, prop)
    }

    /// Apply the predicate. `value` is the projected property value, `Null`
    /// when absent.
    fn evaluate(&self, preset: Preset, value: &Value, args: &FilterArgs) -> Result<bool>;
}

/// Reject a preset routed to a handler of another kind, or arguments of the
/// wrong shape for it.
pub(crate) fn mismatched(preset: Preset, expected: &str) -> QueryError {
    QueryError::invalid(preset, format!("expected {} arguments", expected))
}

// =============================================================================
// Registry
// =============================================================================

/// The four client-side handlers of one resource type, dispatched by the
/// kind of the preset.
pub struct ClientSideHandlers<P: Property> {
    generic: GenericHandler<P>,
    integer: IntegerHandler<P>,
    string: StringHandler<P>,
    datetime: DateTimeHandler<P>,
}

impl<P: Property> ClientSideHandlers<P> {
    pub fn new(
        generic: GenericHandler<P>,
        integer: IntegerHandler<P>,
        string: StringHandler<P>,
        datetime: DateTimeHandler<P>,
    ) -> Self {
        Self {
            generic,
            integer,
            string,
            datetime,
        }
    }

    /// Every preset on every property of a matching kind.
    pub fn by_kind() -> Self {
        Self::new(
            GenericHandler::new(PresetMappings::for_kind(ValueKind::Generic)),
            IntegerHandler::new(PresetMappings::for_kind(ValueKind::Integer)),
            StringHandler::new(PresetMappings::for_kind(ValueKind::String)),
            DateTimeHandler::new(PresetMappings::for_kind(ValueKind::DateTime)),
        )
    }

    /// Replace the mapping of a single preset.
    pub fn restrict(mut self, preset: impl Into<Preset>, supported: Supported<P>) -> Self {
        let preset = preset.into();
        match preset.kind() {
            ValueKind::Generic => self.generic.mappings = self.generic.mappings.allow(preset, supported),
            ValueKind::Integer => self.integer.mappings = self.integer.mappings.allow(preset, supported),
            ValueKind::String => self.string.mappings = self.string.mappings.allow(preset, supported),
            ValueKind::DateTime => {
                self.datetime.mappings = self.datetime.mappings.allow(preset, supported)
            }
        }
        self
    }

    /// Fix "now" for datetime predicates.
    pub fn set_now(&mut self, now: DateTime<Utc>) {
        self.datetime.set_now(now);
    }

    pub fn handler(&self, kind: ValueKind) -> &dyn ClientSideHandler<P> {
        match kind {
            ValueKind::Generic => &self.generic,
            ValueKind::Integer => &self.integer,
            ValueKind::String => &self.string,
            ValueKind::DateTime => &self.datetime,
        }
    }

    pub fn check_supported(&self, preset: Preset, prop: P) -> bool {
        self.handler(preset.kind()).check_supported(preset, prop)
    }

    pub fn evaluate(&self, preset: Preset, value: &Value, args: &FilterArgs) -> Result<bool> {
        self.handler(preset.kind()).evaluate(preset, value, args)
    }

    /// Every supported (preset, property) pair, in declaration order.
    pub fn supported_pairs(&self) -> Vec<(Preset, P)> {
        let mut pairs = Vec::new();
        for preset in Preset::all() {
            for prop in P::all() {
                if self.check_supported(preset, *prop) {
                    pairs.push((preset, *prop));
                }
            }
        }
        pairs
    }
}
