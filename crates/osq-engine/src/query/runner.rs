//! Query Runner: fetch candidates, apply the client-side stage, resolve
//! property values (including derived ones) through a per-run cache.

use osq_core::{QueryError, Result};
use serde_json::Value;

use super::builder::FilterCondition;
use crate::handlers::ClientSideHandlers;
use crate::lister::{AuxiliaryLookup, NativeFilters, ResourceLister};
use crate::lookup::LookupCache;
use crate::resources::{PropertyValue, QueryResource};

pub struct QueryRunner<'a> {
    lister: &'a dyn ResourceLister,
    lookups: LookupCache<'a>,
}

impl<'a> QueryRunner<'a> {
    pub fn new(lister: &'a dyn ResourceLister, lookup: &'a dyn AuxiliaryLookup) -> Self {
        Self {
            lister,
            lookups: LookupCache::new(lookup),
        }
    }

    /// List and decode candidates. Lister failures are wrapped unchanged
    /// and not retried.
    pub fn fetch<R: QueryResource>(&self, filters: &NativeFilters) -> Result<Vec<R>> {
        let raw = self
            .lister
            .list(R::RESOURCE_TYPE, filters)
            .map_err(|source| QueryError::Transport {
                resource: R::RESOURCE_TYPE,
                source,
            })?;
        raw.into_iter().map(R::decode).collect()
    }

    pub fn value<R: QueryResource>(&mut self, resource: &R, prop: R::Prop) -> Value {
        match resource.property(prop) {
            PropertyValue::Direct(value) => value,
            PropertyValue::Derived(lookup) => self.lookups.resolve(&lookup),
        }
    }

    /// Keep the resources that satisfy every condition. Evaluation errors
    /// (an unparseable timestamp) abort the run.
    pub fn filter<R: QueryResource>(
        &mut self,
        candidates: Vec<R>,
        conditions: &[&FilterCondition<R::Prop>],
        handlers: &ClientSideHandlers<R::Prop>,
    ) -> Result<Vec<R>> {
        let mut kept = Vec::with_capacity(candidates.len());
        'resources: for resource in candidates {
            for condition in conditions {
                let value = self.value(&resource, condition.property);
                if !handlers.evaluate(condition.preset, &value, &condition.args)? {
                    continue 'resources;
                }
            }
            kept.push(resource);
        }
        Ok(kept)
    }

    /// Distinct auxiliary records fetched during this run.
    pub fn lookups_made(&self) -> usize {
        self.lookups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::NoLookup;
    use crate::memory::MemoryLister;
    use crate::resources::{Server, ServerProperty};
    use osq_core::{BoxError, ResourceType};
    use serde_json::json;

    struct Unreachable;

    impl ResourceLister for Unreachable {
        fn list(&self, _: ResourceType, _: &NativeFilters) -> std::result::Result<Vec<Value>, BoxError> {
            Err("connection refused".into())
        }
    }

    #[test]
    fn test_transport_failure_propagates() {
        let runner = QueryRunner::new(&Unreachable, &NoLookup);
        match runner.fetch::<Server>(&NativeFilters::new()) {
            Err(QueryError::Transport { resource, source }) => {
                assert_eq!(resource, ResourceType::Server);
                assert_eq!(source.to_string(), "connection refused");
            }
            other => panic!("unexpected: {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn test_malformed_record_aborts_fetch() {
        let lister = MemoryLister::new().with(ResourceType::Server, vec![json!({"id": 7})]);
        let runner = QueryRunner::new(&lister, &NoLookup);
        assert!(matches!(
            runner.fetch::<Server>(&NativeFilters::new()),
            Err(QueryError::MalformedResource { .. })
        ));
    }

    #[test]
    fn test_derived_value_without_lookup_is_null() {
        let lister = MemoryLister::new();
        let mut runner = QueryRunner::new(&lister, &NoLookup);
        let server = Server::decode(json!({"id": "s1", "project_id": "p1"})).unwrap();
        assert_eq!(runner.value(&server, ServerProperty::ProjectName), Value::Null);
        assert_eq!(runner.value(&server, ServerProperty::ProjectId), json!("p1"));
    }
}
