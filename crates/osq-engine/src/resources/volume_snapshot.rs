use osq_core::{define_properties, LookupTarget, ResourceType};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{derived, either, text, PropertyValue, QueryResource};
use crate::handlers::{single_value, single_value_with, ClientSideHandlers, ServerSideHandler};

define_properties! {
    /// Properties of a Cinder volume snapshot.
    pub enum VolumeSnapshotProperty for VolumeSnapshot {
        Id => "id": String | "snapshot_id",
        Name => "name": String,
        Description => "description": String,
        Status => "status": String,
        VolumeId => "volume_id": String | "volume",
        ProjectId => "project_id": String | "project" | "tenant_id",
        Size => "size": Integer,
        CreatedAt => "created_at": DateTime,
        UpdatedAt => "updated_at": DateTime,
        LastUpdated => "last_updated": DateTime,
        ProjectName => "project_name": String,
        ProjectEmail => "project_email": String,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeSnapshot {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub volume_id: Option<String>,
    #[serde(default, rename = "os-extended-snapshot-attributes:project_id")]
    pub extended_project_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl VolumeSnapshot {
    fn project(&self) -> &Option<String> {
        if self.extended_project_id.is_some() {
            &self.extended_project_id
        } else {
            &self.project_id
        }
    }
}

impl QueryResource for VolumeSnapshot {
    type Prop = VolumeSnapshotProperty;

    const RESOURCE_TYPE: ResourceType = ResourceType::VolumeSnapshot;

    const TIMESTAMP_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.f";

    const DEFAULT_COLUMNS: &'static [VolumeSnapshotProperty] = &[
        VolumeSnapshotProperty::Id,
        VolumeSnapshotProperty::Name,
        VolumeSnapshotProperty::Status,
        VolumeSnapshotProperty::VolumeId,
        VolumeSnapshotProperty::LastUpdated,
    ];

    fn property(&self, prop: VolumeSnapshotProperty) -> PropertyValue {
        use VolumeSnapshotProperty::*;
        match prop {
            Id => PropertyValue::Direct(self.id.clone().into()),
            Name => text(&self.name),
            Description => text(&self.description),
            Status => text(&self.status),
            VolumeId => text(&self.volume_id),
            ProjectId => text(self.project()),
            Size => PropertyValue::Direct(self.size.map_or(Value::Null, |s| json!(s))),
            CreatedAt => text(&self.created_at),
            UpdatedAt => text(&self.updated_at),
            // Never-updated snapshots report a null updated_at.
            LastUpdated => either(&self.updated_at, &self.created_at),
            ProjectName => derived(LookupTarget::Project, self.project(), "name"),
            ProjectEmail => derived(LookupTarget::Project, self.project(), "email"),
        }
    }

    fn client_side_handlers() -> ClientSideHandlers<VolumeSnapshotProperty> {
        ClientSideHandlers::by_kind()
    }

    fn server_side_handler() -> ServerSideHandler<VolumeSnapshotProperty> {
        use VolumeSnapshotProperty::*;
        ServerSideHandler::new()
            .any_in(Status, single_value("status"))
            .any_in(Name, single_value("name"))
            .any_in(VolumeId, single_value("volume_id"))
            .any_in(ProjectId, single_value_with("project_id", vec![("all_tenants", json!(true))]))
    }
}
