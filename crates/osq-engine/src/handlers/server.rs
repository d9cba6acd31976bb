//! Server-side capability table: the (preset, property) pairs a listing
//! call can filter natively, and how to translate their arguments.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use osq_core::{GenericPreset, Preset, Property, QueryError, ResourceType, Result, StringPreset, ValueKind};
use serde_json::Value;

use super::ClientSideHandlers;
use crate::args::FilterArgs;
use crate::lister::NativeFilters;

/// Turns validated arguments into native filters, or `None` when the
/// native API cannot express the condition exactly.
pub type Translation = Arc<dyn Fn(&FilterArgs, DateTime<Utc>) -> Option<NativeFilters> + Send + Sync>;

pub struct ServerSideHandler<P: Property> {
    table: HashMap<(Preset, P), Translation>,
}

impl<P: Property> Default for ServerSideHandler<P> {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
        }
    }
}

impl<P: Property> fmt::Debug for ServerSideHandler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSideHandler")
            .field("pairs", &self.pairs())
            .finish()
    }
}

impl<P: Property> ServerSideHandler<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, preset: impl Into<Preset>, prop: P, translation: Translation) -> Self {
        self.table.insert((preset.into(), prop), translation);
        self
    }

    /// Register `any_in` under both spellings the property admits: the
    /// generic preset always, the string preset for string properties.
    pub fn any_in(self, prop: P, translation: Translation) -> Self {
        let this = self.with(GenericPreset::AnyIn, prop, translation.clone());
        if prop.kind() == ValueKind::String {
            this.with(StringPreset::AnyIn, prop, translation)
        } else {
            this
        }
    }

    pub fn check_supported(&self, preset: Preset, prop: P) -> bool {
        self.table.contains_key(&(preset, prop))
    }

    pub fn translate(
        &self,
        preset: Preset,
        prop: P,
        args: &FilterArgs,
        now: DateTime<Utc>,
    ) -> Option<NativeFilters> {
        self.table.get(&(preset, prop)).and_then(|f| f(args, now))
    }

    /// Registered pairs, sorted.
    pub fn pairs(&self) -> Vec<(Preset, P)> {
        let mut pairs: Vec<_> = self.table.keys().copied().collect();
        pairs.sort();
        pairs
    }

    /// Every server-side pair must also be supported client-side, so any
    /// condition can fall back to local evaluation.
    pub fn check_consistency(&self, resource: ResourceType, client: &ClientSideHandlers<P>) -> Result<()> {
        for (preset, prop) in self.pairs() {
            if !client.check_supported(preset, prop) {
                return Err(QueryError::UnsupportedPreset {
                    resource,
                    property: prop.name().to_string(),
                    preset,
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Translations
// =============================================================================

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// `key=value` for a one-element membership list. APIs that filter on a
/// single value cannot express a longer list without widening it.
pub fn single_value(key: &'static str) -> Translation {
    single_value_with(key, Vec::new())
}

/// Like [`single_value`], adding fixed companion filters (`all_tenants`).
pub fn single_value_with(key: &'static str, extra: Vec<(&'static str, Value)>) -> Translation {
    Arc::new(move |args: &FilterArgs, _now: DateTime<Utc>| match args.values()? {
        [value] if is_scalar(value) => {
            let mut filters = NativeFilters::new();
            filters.insert(key.to_string(), value.clone());
            for (k, v) in &extra {
                filters.insert(k.to_string(), v.clone());
            }
            Some(filters)
        }
        _ => None,
    })
}

/// `key=[values..]` for APIs that accept repeated query parameters.
pub fn value_list(key: &'static str) -> Translation {
    Arc::new(move |args: &FilterArgs, _now: DateTime<Utc>| {
        let values = args.values()?;
        if !values.iter().all(is_scalar) {
            return None;
        }
        let mut filters = NativeFilters::new();
        filters.insert(key.to_string(), Value::Array(values.to_vec()));
        Some(filters)
    })
}

/// `key=<now - threshold>` as an RFC 3339 instant, for `changes_since`
/// style filters.
pub fn cutoff(key: &'static str) -> Translation {
    Arc::new(move |args: &FilterArgs, now: DateTime<Utc>| match args {
        FilterArgs::Age(age) => {
            let instant = now.checked_sub_signed(age.threshold)?;
            let mut filters = NativeFilters::new();
            filters.insert(
                key.to_string(),
                Value::String(instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            );
            Some(filters)
        }
        _ => None,
    })
}
