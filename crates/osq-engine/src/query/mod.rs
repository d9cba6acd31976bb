//! # Query
//!
//! A [`Query`] composes three independently testable collaborators:
//!
//! - [`QueryBuilder`] validates conditions and splits them between the
//!   listing call and the client-side stage.
//! - [`QueryRunner`] lists candidates and filters them.
//! - [`QueryOutput`] projects, groups and renders what survives.
//!
//! A query is built, run once and consumed. "Now" is captured when it is
//! constructed and shared by client-side datetime predicates and
//! server-side cutoffs, so both stages agree on every boundary.

pub mod builder;
pub mod output;
pub mod request;
pub mod runner;

use std::fmt;

use chrono::{DateTime, Utc};
use osq_core::{Preset, Property, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info_span};
use uuid::Uuid;

use crate::lister::{AuxiliaryLookup, ResourceLister};
use crate::resources::QueryResource;

pub use builder::{FilterCondition, QueryBuilder, Resolution};
pub use output::{group_key, QueryOutput, QueryResults, ResultBody, ResultRecord};
pub use request::{FilterSpec, QueryRequest};
pub use runner::QueryRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Evaluate pushed-down conditions again on the client.
    pub client_side_recheck: bool,
    /// Allow conditions to be folded into native filters at all.
    pub server_side: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            client_side_recheck: true,
            server_side: true,
        }
    }
}

/// Lifecycle of a single run, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Built,
    Executing,
    ClientFiltering,
    Projecting,
    Grouping,
    Flat,
    Done,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Built => "built",
            Self::Executing => "executing",
            Self::ClientFiltering => "client_filtering",
            Self::Projecting => "projecting",
            Self::Grouping => "grouping",
            Self::Flat => "flat",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

pub struct Query<R: QueryResource> {
    builder: QueryBuilder<R>,
    output: QueryOutput<R::Prop>,
    options: QueryOptions,
}

impl<R: QueryResource> Default for Query<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: QueryResource> Query<R> {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// A query evaluated as if the current time were `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            builder: QueryBuilder::new(now),
            output: QueryOutput::new(),
            options: QueryOptions::default(),
        }
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.builder.set_server_side(options.server_side);
        self.options = options;
        self
    }

    pub fn select(mut self, props: impl IntoIterator<Item = R::Prop>) -> Self {
        self.output.select(props);
        self
    }

    pub fn select_names<S: AsRef<str>>(self, names: &[S]) -> Result<Self> {
        let props = names
            .iter()
            .map(|name| name.as_ref().parse::<R::Prop>())
            .collect::<Result<Vec<_>>>()?;
        Ok(self.select(props))
    }

    pub fn where_preset(mut self, prop: R::Prop, preset: impl Into<Preset>, args: &Value) -> Result<Self> {
        self.builder.add_filter(prop, preset.into(), args)?;
        Ok(self)
    }

    /// Filter by names, resolving a bare preset name against the
    /// property's kind. String presets take numbers and booleans as the
    /// text they were written as.
    pub fn where_named(self, prop: &str, preset: &str, args: &Value) -> Result<Self> {
        let prop: R::Prop = prop.parse()?;
        let preset = Preset::resolve(preset, prop.kind())?;
        match preset {
            Preset::String(_) => self.where_preset(prop, preset, &as_text(args)),
            _ => self.where_preset(prop, preset, args),
        }
    }

    pub fn where_native(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.builder.add_native(key.into(), value.into());
        self
    }

    pub fn group_by(mut self, prop: R::Prop) -> Self {
        self.output.set_group_by(prop);
        self
    }

    pub fn group_by_name(self, name: &str) -> Result<Self> {
        let prop = name.parse()?;
        Ok(self.group_by(prop))
    }

    pub fn builder(&self) -> &QueryBuilder<R> {
        &self.builder
    }

    pub fn run(self, lister: &dyn ResourceLister, lookup: &dyn AuxiliaryLookup) -> Result<QueryResults> {
        let run_id = Uuid::new_v4();
        let span = info_span!("query", resource = %R::RESOURCE_TYPE, %run_id);
        let _guard = span.enter();
        let step = |state: ExecutionState| debug!(%state, "query state");

        step(ExecutionState::Built);
        let native = self.builder.native_filters();
        step(ExecutionState::Executing);
        let shown = Value::Object(native.clone());
        debug!(filters = %shown, "listing");
        let mut runner = QueryRunner::new(lister, lookup);
        let candidates = runner.fetch::<R>(&native)?;

        step(ExecutionState::ClientFiltering);
        let conditions = self.builder.client_conditions(self.options.client_side_recheck);
        let listed = candidates.len();
        let matched = runner.filter(candidates, &conditions, self.builder.handlers())?;
        debug!(listed, matched = matched.len(), evaluated = conditions.len(), "client-side filtering done");

        step(ExecutionState::Projecting);
        let records = self.output.project(&matched, &mut runner);
        let body = match self.output.group_by() {
            Some(prop) => {
                step(ExecutionState::Grouping);
                ResultBody::Grouped(self.output.group(prop, &matched, records, &mut runner))
            }
            None => {
                step(ExecutionState::Flat);
                ResultBody::Flat(records)
            }
        };
        step(ExecutionState::Done);
        debug!(lookups = runner.lookups_made(), "query finished");
        Ok(self.output.results::<R>(body))
    }
}

fn as_text(args: &Value) -> Value {
    match args {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Array(items) => Value::Array(items.iter().map(as_text).collect()),
        other => other.clone(),
    }
}
