//! # Resource Schemas
//!
//! Each queryable resource type is a serde struct plus a closed property
//! enum. Raw records are decoded before any property is read, so a record
//! that does not fit the schema is reported as malformed instead of
//! surfacing as a missing attribute halfway through a run.

pub mod floating_ip;
pub mod load_balancer;
pub mod project;
pub mod security_group_rule;
pub mod server;
pub mod volume_snapshot;

use osq_core::{LookupTarget, Preset, Property, QueryError, ResourceType, Result, ValueKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::handlers::{ClientSideHandlers, ServerSideHandler, DEFAULT_TIMESTAMP_FORMAT};

pub use floating_ip::{FloatingIp, FloatingIpProperty};
pub use load_balancer::{LoadBalancer, LoadBalancerProperty};
pub use project::{Project, ProjectProperty};
pub use security_group_rule::{SecurityGroupRule, SecurityGroupRuleProperty};
pub use server::{Server, ServerProperty};
pub use volume_snapshot::{VolumeSnapshot, VolumeSnapshotProperty};

/// How a property's value is obtained from a decoded resource.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Read straight off the record.
    Direct(Value),
    /// Read from an auxiliary record fetched by id.
    Derived(Lookup),
}

/// A field of an auxiliary record, addressed by foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub target: LookupTarget,
    /// `None` when the resource carries no foreign key.
    pub id: Option<String>,
    pub field: &'static str,
}

/// A resource type the engine can query.
pub trait QueryResource: DeserializeOwned + Sized {
    type Prop: Property;

    const RESOURCE_TYPE: ResourceType;

    /// strftime layout of this resource's timestamps.
    const TIMESTAMP_FORMAT: &'static str = DEFAULT_TIMESTAMP_FORMAT;

    /// Columns shown when a query selects nothing.
    const DEFAULT_COLUMNS: &'static [Self::Prop];

    fn property(&self, prop: Self::Prop) -> PropertyValue;

    fn client_side_handlers() -> ClientSideHandlers<Self::Prop>;

    fn server_side_handler() -> ServerSideHandler<Self::Prop>;

    fn decode(raw: Value) -> Result<Self> {
        serde_json::from_value(raw).map_err(|e| QueryError::MalformedResource {
            resource: Self::RESOURCE_TYPE,
            reason: e.to_string(),
        })
    }
}

pub(crate) fn text(value: &Option<String>) -> PropertyValue {
    PropertyValue::Direct(value.clone().map_or(Value::Null, Value::String))
}

/// The first present spelling of a field.
pub(crate) fn either(primary: &Option<String>, fallback: &Option<String>) -> PropertyValue {
    text(if primary.is_some() { primary } else { fallback })
}

/// Id of a nested reference such as `{"flavor": {"id": ..}}`; a bare
/// string is taken as the id itself.
pub(crate) fn nested_id(value: &Option<Value>) -> PropertyValue {
    PropertyValue::Direct(match value {
        Some(Value::Object(map)) => map.get("id").cloned().unwrap_or(Value::Null),
        Some(Value::String(s)) if !s.is_empty() => Value::String(s.clone()),
        _ => Value::Null,
    })
}

pub(crate) fn derived(target: LookupTarget, id: &Option<String>, field: &'static str) -> PropertyValue {
    PropertyValue::Derived(Lookup {
        target,
        id: id.clone(),
        field,
    })
}

// =============================================================================
// Introspection
// =============================================================================

/// A property as listed by `osq properties`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyInfo {
    pub name: &'static str,
    pub kind: ValueKind,
    pub presets: Vec<Preset>,
    /// Presets the listing call can evaluate natively.
    pub pushdown: Vec<Preset>,
}

pub fn describe<R: QueryResource>() -> Vec<PropertyInfo> {
    let client = R::client_side_handlers();
    let server = R::server_side_handler();
    R::Prop::all()
        .iter()
        .map(|prop| PropertyInfo {
            name: prop.name(),
            kind: prop.kind(),
            presets: Preset::all()
                .into_iter()
                .filter(|p| client.check_supported(*p, *prop))
                .collect(),
            pushdown: Preset::all()
                .into_iter()
                .filter(|p| server.check_supported(*p, *prop))
                .collect(),
        })
        .collect()
}

pub fn describe_type(resource: ResourceType) -> Vec<PropertyInfo> {
    match resource {
        ResourceType::Server => describe::<Server>(),
        ResourceType::FloatingIp => describe::<FloatingIp>(),
        ResourceType::LoadBalancer => describe::<LoadBalancer>(),
        ResourceType::VolumeSnapshot => describe::<VolumeSnapshot>(),
        ResourceType::Project => describe::<Project>(),
        ResourceType::SecurityGroupRule => describe::<SecurityGroupRule>(),
    }
}

fn check_registry<R: QueryResource>() -> Result<()> {
    R::server_side_handler().check_consistency(R::RESOURCE_TYPE, &R::client_side_handlers())
}

/// Verify, for every resource type, that server-side support is a subset
/// of client-side support. Run once at start-up.
pub fn validate_registries() -> Result<()> {
    check_registry::<Server>()?;
    check_registry::<FloatingIp>()?;
    check_registry::<LoadBalancer>()?;
    check_registry::<VolumeSnapshot>()?;
    check_registry::<Project>()?;
    check_registry::<SecurityGroupRule>()?;
    Ok(())
}
