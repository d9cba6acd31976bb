//! # Lookup Cache
//!
//! Derived properties (a server's project name, a snapshot's project email)
//! need one auxiliary record per foreign key. The cache lives for a single
//! query run and is dropped with it.

use std::collections::HashMap;

use osq_core::{LookupTarget, QueryError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::lister::AuxiliaryLookup;
use crate::resources::Lookup;

pub struct LookupCache<'a> {
    lookup: &'a dyn AuxiliaryLookup,
    records: HashMap<(LookupTarget, String), Option<Value>>,
}

impl<'a> LookupCache<'a> {
    pub fn new(lookup: &'a dyn AuxiliaryLookup) -> Self {
        Self {
            lookup,
            records: HashMap::new(),
        }
    }

    /// Resolve a derived property. Missing ids, missing records and failed
    /// lookups all yield `Null`; failures are cached as absent so the same
    /// id is not retried within the run.
    pub fn resolve(&mut self, derived: &Lookup) -> Value {
        let Some(id) = derived.id.as_deref() else {
            return Value::Null;
        };
        self.record(derived.target, id)
            .and_then(|record| record.get(derived.field))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn record(&mut self, target: LookupTarget, id: &str) -> Option<&Value> {
        let key = (target, id.to_string());
        if !self.records.contains_key(&key) {
            let fetched = match self.lookup.get(target, id) {
                Ok(Some(record)) => Some(record),
                Ok(None) => {
                    debug!(%target, id, "lookup found no record");
                    None
                }
                Err(e) => {
                    let failure = QueryError::LookupFailure {
                        target,
                        id: id.to_string(),
                        reason: e.to_string(),
                    };
                    warn!(error = %failure, "derived property degrades to null");
                    None
                }
            };
            self.records.insert(key.clone(), fetched);
        }
        self.records.get(&key).and_then(Option::as_ref)
    }

    /// Distinct (target, id) pairs fetched so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
