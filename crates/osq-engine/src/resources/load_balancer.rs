use osq_core::{define_properties, LookupTarget, ResourceType};
use serde::Deserialize;

use super::{derived, text, PropertyValue, QueryResource};
use crate::handlers::{single_value, ClientSideHandlers, ServerSideHandler};

define_properties! {
    /// Properties of an Octavia load balancer.
    pub enum LoadBalancerProperty for LoadBalancer {
        Id => "id": String | "lb_id",
        Name => "name": String,
        Description => "description": String,
        VipAddress => "vip_address": String | "vip",
        ProvisioningStatus => "provisioning_status": String,
        OperatingStatus => "operating_status": String,
        Provider => "provider": String,
        ProjectId => "project_id": String | "project" | "tenant_id",
        CreatedAt => "created_at": DateTime,
        UpdatedAt => "updated_at": DateTime,
        ProjectName => "project_name": String,
        ProjectEmail => "project_email": String,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vip_address: Option<String>,
    #[serde(default)]
    pub provisioning_status: Option<String>,
    #[serde(default)]
    pub operating_status: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl QueryResource for LoadBalancer {
    type Prop = LoadBalancerProperty;

    const RESOURCE_TYPE: ResourceType = ResourceType::LoadBalancer;

    const TIMESTAMP_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.f";

    const DEFAULT_COLUMNS: &'static [LoadBalancerProperty] = &[
        LoadBalancerProperty::Id,
        LoadBalancerProperty::Name,
        LoadBalancerProperty::VipAddress,
        LoadBalancerProperty::ProvisioningStatus,
        LoadBalancerProperty::OperatingStatus,
    ];

    fn property(&self, prop: LoadBalancerProperty) -> PropertyValue {
        use LoadBalancerProperty::*;
        match prop {
            Id => PropertyValue::Direct(self.id.clone().into()),
            Name => text(&self.name),
            Description => text(&self.description),
            VipAddress => text(&self.vip_address),
            ProvisioningStatus => text(&self.provisioning_status),
            OperatingStatus => text(&self.operating_status),
            Provider => text(&self.provider),
            ProjectId => text(&self.project_id),
            CreatedAt => text(&self.created_at),
            UpdatedAt => text(&self.updated_at),
            ProjectName => derived(LookupTarget::Project, &self.project_id, "name"),
            ProjectEmail => derived(LookupTarget::Project, &self.project_id, "email"),
        }
    }

    fn client_side_handlers() -> ClientSideHandlers<LoadBalancerProperty> {
        ClientSideHandlers::by_kind()
    }

    fn server_side_handler() -> ServerSideHandler<LoadBalancerProperty> {
        use LoadBalancerProperty::*;
        ServerSideHandler::new()
            .any_in(Id, single_value("id"))
            .any_in(Name, single_value("name"))
            .any_in(ProvisioningStatus, single_value("provisioning_status"))
            .any_in(OperatingStatus, single_value("operating_status"))
            .any_in(ProjectId, single_value("project_id"))
            .any_in(VipAddress, single_value("vip_address"))
    }
}
