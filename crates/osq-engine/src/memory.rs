//! In-memory catalogue implementing both lister traits.
//!
//! Interprets the native filter vocabulary the server-side tables produce,
//! so pushed-down and client-side evaluation can be compared without a
//! cloud. Also backs `osq query --from-file`.

use std::collections::BTreeMap;

use osq_core::{BoxError, LookupTarget, ResourceType};
use serde_json::Value;
use tracing::debug;

use crate::handlers::{parse_timestamp, DEFAULT_TIMESTAMP_FORMAT};
use crate::lister::{AuxiliaryLookup, NativeFilters, ResourceLister};

#[derive(Debug, Clone, Default)]
pub struct MemoryLister {
    resources: BTreeMap<ResourceType, Vec<Value>>,
    /// Lookup-only records: users and security groups.
    auxiliary: BTreeMap<LookupTarget, Vec<Value>>,
}

impl MemoryLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: ResourceType, records: Vec<Value>) -> Self {
        self.resources.entry(resource).or_default().extend(records);
        self
    }

    pub fn with_users(self, users: Vec<Value>) -> Self {
        self.with_lookups(LookupTarget::User, users)
    }

    pub fn with_lookups(mut self, target: LookupTarget, records: Vec<Value>) -> Self {
        self.auxiliary.entry(target).or_default().extend(records);
        self
    }

    /// Load a dump shaped like `{"servers": [...], "projects": [...], "users": [...]}`.
    /// `security_groups` is read as lookup records.
    pub fn from_dump(dump: &Value) -> Result<Self, BoxError> {
        let Value::Object(collections) = dump else {
            return Err("resource dump must be a JSON object keyed by collection".into());
        };
        let mut lister = Self::new();
        for (key, records) in collections {
            let Value::Array(records) = records else {
                return Err(format!("collection '{}' must be an array", key).into());
            };
            if let Some(target) = [LookupTarget::User, LookupTarget::SecurityGroup]
                .into_iter()
                .find(|target| target.plural() == key)
            {
                lister = lister.with_lookups(target, records.clone());
                continue;
            }
            match key.parse::<ResourceType>() {
                Ok(resource) => lister = lister.with(resource, records.clone()),
                Err(_) => debug!(collection = %key, "ignoring unknown collection in dump"),
            }
        }
        Ok(lister)
    }

    pub fn records(&self, resource: ResourceType) -> &[Value] {
        self.resources.get(&resource).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ResourceLister for MemoryLister {
    fn list(&self, resource: ResourceType, filters: &NativeFilters) -> Result<Vec<Value>, BoxError> {
        Ok(self
            .records(resource)
            .iter()
            .filter(|record| filters.iter().all(|(key, want)| matches_native(record, key, want)))
            .cloned()
            .collect())
    }
}

impl AuxiliaryLookup for MemoryLister {
    fn get(&self, target: LookupTarget, id: &str) -> Result<Option<Value>, BoxError> {
        let pool = match target {
            LookupTarget::Project => self.records(ResourceType::Project),
            other => self.auxiliary.get(&other).map(Vec::as_slice).unwrap_or(&[]),
        };
        Ok(pool
            .iter()
            .find(|record| record.get("id").and_then(Value::as_str) == Some(id))
            .cloned())
    }
}

/// Field spellings a native key may be stored under.
fn field_aliases(key: &str) -> &'static [&'static str] {
    match key {
        "project_id" => &["project_id", "tenant_id", "os-extended-snapshot-attributes:project_id"],
        "enabled" => &["enabled", "is_enabled"],
        _ => &[],
    }
}

fn matches_native(record: &Value, key: &str, want: &Value) -> bool {
    match key {
        "all_tenants" => true,
        "changes_since" => compare_updated(record, want, |ts, cut| ts >= cut),
        _ => {
            let aliases = field_aliases(key);
            let found = if aliases.is_empty() {
                record.get(key)
            } else {
                aliases.iter().find_map(|alias| record.get(*alias))
            };
            let Some(found) = found else {
                return false;
            };
            // Nested references such as `flavor: {"id": ..}` filter by id.
            let found = found.get("id").unwrap_or(found);
            match want {
                Value::Array(options) => options.iter().any(|option| same_param(option, found)),
                single => same_param(single, found),
            }
        }
    }
}

/// Native filters travel as query-string text, so `123` matches `"123"`.
fn same_param(want: &Value, found: &Value) -> bool {
    want == found || matches!((param_text(want), param_text(found)), (Some(a), Some(b)) if a == b)
}

fn param_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_updated(
    record: &Value,
    want: &Value,
    keep: impl Fn(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) -> bool,
) -> bool {
    let Some(cut) = want.as_str().and_then(|s| parse_timestamp(s, DEFAULT_TIMESTAMP_FORMAT)) else {
        return false;
    };
    ["updated_at", "updated"]
        .iter()
        .find_map(|field| record.get(*field).and_then(Value::as_str))
        .and_then(|raw| parse_timestamp(raw, DEFAULT_TIMESTAMP_FORMAT))
        .map_or(false, |ts| keep(ts, cut))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lister() -> MemoryLister {
        MemoryLister::from_dump(&json!({
            "servers": [
                {"id": "a", "status": "ACTIVE", "tenant_id": "p1", "flavor": {"id": "m1"}, "updated": "2021-07-01T00:00:00Z"},
                {"id": "b", "status": "ERROR", "project_id": "p2", "flavor": {"id": "m2"}, "updated_at": "2021-07-20T00:00:00Z"},
                {"id": "c", "status": "SHUTOFF"}
            ],
            "projects": [{"id": "p1", "name": "alpha", "enabled": true}],
            "users": [{"id": "u1", "name": "alice"}],
            "security_groups": [{"id": "sg1", "name": "default"}],
            "networks": []
        }))
        .unwrap()
    }

    fn ids(records: Vec<Value>) -> Vec<String> {
        records.iter().map(|r| r["id"].as_str().unwrap().to_string()).collect()
    }

    fn filters(value: Value) -> NativeFilters {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_empty_filters_list_everything() {
        let all = lister().list(ResourceType::Server, &NativeFilters::new()).unwrap();
        assert_eq!(ids(all), vec!["a", "b", "c"]);
        assert!(lister().list(ResourceType::LoadBalancer, &NativeFilters::new()).unwrap().is_empty());
    }

    #[test]
    fn test_exact_alias_and_nested_filters() {
        let l = lister();
        let f = filters(json!({"status": "ERROR"}));
        assert_eq!(ids(l.list(ResourceType::Server, &f).unwrap()), vec!["b"]);
        let f = filters(json!({"project_id": "p1", "all_tenants": true}));
        assert_eq!(ids(l.list(ResourceType::Server, &f).unwrap()), vec!["a"]);
        let f = filters(json!({"flavor": "m2"}));
        assert_eq!(ids(l.list(ResourceType::Server, &f).unwrap()), vec!["b"]);
        let f = filters(json!({"status": ["ACTIVE", "SHUTOFF"]}));
        assert_eq!(ids(l.list(ResourceType::Server, &f).unwrap()), vec!["a", "c"]);
    }

    #[test]
    fn test_native_values_compare_as_text() {
        let l = MemoryLister::new().with(
            ResourceType::Server,
            vec![json!({"id": "a", "name": "123", "locked": true}), json!({"id": "b", "name": "web"})],
        );
        let f = filters(json!({"name": 123}));
        assert_eq!(ids(l.list(ResourceType::Server, &f).unwrap()), vec!["a"]);
        let f = filters(json!({"locked": "true"}));
        assert_eq!(ids(l.list(ResourceType::Server, &f).unwrap()), vec!["a"]);
        let f = filters(json!({"name": [124, "web"]}));
        assert_eq!(ids(l.list(ResourceType::Server, &f).unwrap()), vec!["b"]);
    }

    #[test]
    fn test_changes_since_is_inclusive() {
        let l = lister();
        let f = filters(json!({"changes_since": "2021-07-20T00:00:00Z"}));
        assert_eq!(ids(l.list(ResourceType::Server, &f).unwrap()), vec!["b"]);
        let f = filters(json!({"changes_since": "2021-07-01T00:00:00Z"}));
        assert_eq!(ids(l.list(ResourceType::Server, &f).unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn test_lookup_by_id() {
        let l = lister();
        assert_eq!(l.get(LookupTarget::Project, "p1").unwrap().unwrap()["name"], json!("alpha"));
        assert_eq!(l.get(LookupTarget::User, "u1").unwrap().unwrap()["name"], json!("alice"));
        assert!(l.get(LookupTarget::Project, "nope").unwrap().is_none());
        assert_eq!(l.get(LookupTarget::SecurityGroup, "sg1").unwrap().unwrap()["name"], json!("default"));
        assert!(l.get(LookupTarget::SecurityGroup, "u1").unwrap().is_none());
    }

    #[test]
    fn test_dump_must_be_an_object_of_arrays() {
        assert!(MemoryLister::from_dump(&json!([])).is_err());
        assert!(MemoryLister::from_dump(&json!({"servers": {}})).is_err());
    }
}
