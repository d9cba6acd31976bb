//! Caller-facing invocation by resource type name, for callers that hold
//! filters as data (the CLI, check definitions, JSON requests).

use chrono::{DateTime, Utc};
use osq_core::{ResourceType, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Query, QueryOptions, QueryResults};
use crate::lister::{AuxiliaryLookup, NativeFilters, ResourceLister};
use crate::resources::{
    FloatingIp, LoadBalancer, Project, QueryResource, SecurityGroupRule, Server, VolumeSnapshot,
};

/// One `(property, preset, args)` filter, all by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub property: String,
    pub preset: String,
    #[serde(default)]
    pub args: Value,
}

impl FilterSpec {
    pub fn new(property: impl Into<String>, preset: impl Into<String>, args: Value) -> Self {
        Self {
            property: property.into(),
            preset: preset.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub resource: ResourceType,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    /// Passed straight through to the lister.
    #[serde(default)]
    pub native: NativeFilters,
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub options: QueryOptions,
}

impl QueryRequest {
    pub fn new(resource: ResourceType) -> Self {
        Self {
            resource,
            filters: Vec::new(),
            native: NativeFilters::new(),
            select: Vec::new(),
            group_by: None,
            options: QueryOptions::default(),
        }
    }

    pub fn execute(&self, lister: &dyn ResourceLister, lookup: &dyn AuxiliaryLookup) -> Result<QueryResults> {
        self.execute_at(Utc::now(), lister, lookup)
    }

    pub fn execute_at(
        &self,
        now: DateTime<Utc>,
        lister: &dyn ResourceLister,
        lookup: &dyn AuxiliaryLookup,
    ) -> Result<QueryResults> {
        match self.resource {
            ResourceType::Server => self.build::<Server>(now)?.run(lister, lookup),
            ResourceType::FloatingIp => self.build::<FloatingIp>(now)?.run(lister, lookup),
            ResourceType::LoadBalancer => self.build::<LoadBalancer>(now)?.run(lister, lookup),
            ResourceType::VolumeSnapshot => self.build::<VolumeSnapshot>(now)?.run(lister, lookup),
            ResourceType::Project => self.build::<Project>(now)?.run(lister, lookup),
            ResourceType::SecurityGroupRule => self.build::<SecurityGroupRule>(now)?.run(lister, lookup),
        }
    }

    /// Build without running; every name and argument is validated here.
    pub fn build<R: QueryResource>(&self, now: DateTime<Utc>) -> Result<Query<R>> {
        let mut query = Query::<R>::at(now)
            .options(self.options)
            .select_names(self.select.as_slice())?;
        for filter in &self.filters {
            query = query.where_named(&filter.property, &filter.preset, &filter.args)?;
        }
        for (key, value) in &self.native {
            query = query.where_native(key.clone(), value.clone());
        }
        if let Some(group_by) = &self.group_by {
            query = query.group_by_name(group_by)?;
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::NoLookup;
    use crate::memory::MemoryLister;
    use chrono::TimeZone;
    use osq_core::QueryError;
    use serde_json::json;

    #[test]
    fn test_request_from_json() {
        let request: QueryRequest = serde_json::from_value(json!({
            "resource": "load_balancer",
            "filters": [{"property": "operating_status", "preset": "not_any_in", "args": ["ONLINE"]}],
            "select": ["id", "operating_status"]
        }))
        .unwrap();
        let lister = MemoryLister::new().with(
            ResourceType::LoadBalancer,
            vec![
                json!({"id": "lb1", "operating_status": "ONLINE"}),
                json!({"id": "lb2", "operating_status": "ERROR"}),
            ],
        );
        let now = Utc.with_ymd_and_hms(2021, 8, 1, 0, 0, 0).unwrap();
        let results = request.execute_at(now, &lister, &NoLookup).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.records()[0]["id"], json!("lb2"));
        assert!(request.options.client_side_recheck);
    }

    #[test]
    fn test_numeric_arguments_match_string_properties() {
        let lister = MemoryLister::new().with(
            ResourceType::Server,
            vec![json!({"id": "s1", "name": "123"}), json!({"id": "s2", "name": "web"})],
        );
        let now = Utc.with_ymd_and_hms(2021, 8, 1, 0, 0, 0).unwrap();

        let mut request = QueryRequest::new(ResourceType::Server);
        request.filters.push(FilterSpec::new("name", "any_in", json!(123)));
        let results = request.execute_at(now, &lister, &NoLookup).unwrap();
        assert_eq!(results.records()[0]["id"], json!("s1"));
        assert_eq!(results.len(), 1);

        let mut request = QueryRequest::new(ResourceType::Server);
        request.native.insert("name".to_string(), json!(123));
        assert_eq!(request.execute_at(now, &lister, &NoLookup).unwrap().len(), 1);
    }

    #[test]
    fn test_build_errors_abort_before_listing() {
        let mut request = QueryRequest::new(ResourceType::Project);
        request.filters.push(FilterSpec::new("is_enabled", "any_in", json!([])));
        assert!(matches!(
            request.build::<Project>(Utc::now()),
            Err(QueryError::MissingMandatoryParam { .. })
        ));
    }
}
