use osq_core::{define_properties, DateTimePreset, LookupTarget, ResourceType};
use serde::Deserialize;

use super::{derived, either, text, PropertyValue, QueryResource};
use crate::handlers::{cutoff, value_list, ClientSideHandlers, ServerSideHandler};

define_properties! {
    /// Properties of a Neutron floating IP.
    pub enum FloatingIpProperty for FloatingIp {
        Id => "id": String | "fip_id",
        Name => "name": String,
        FloatingIpAddress => "floating_ip_address": String | "address" | "ip",
        FixedIpAddress => "fixed_ip_address": String | "fixed_ip",
        FloatingNetworkId => "floating_network_id": String | "network_id" | "network",
        PortId => "port_id": String | "port",
        RouterId => "router_id": String | "router",
        Status => "status": String,
        Description => "description": String,
        ProjectId => "project_id": String | "project" | "tenant_id",
        CreatedAt => "created_at": DateTime,
        UpdatedAt => "updated_at": DateTime,
        ProjectName => "project_name": String,
        ProjectEmail => "project_email": String,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub floating_ip_address: Option<String>,
    #[serde(default)]
    pub fixed_ip_address: Option<String>,
    #[serde(default)]
    pub floating_network_id: Option<String>,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub router_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl FloatingIp {
    fn project(&self) -> &Option<String> {
        if self.project_id.is_some() {
            &self.project_id
        } else {
            &self.tenant_id
        }
    }
}

impl QueryResource for FloatingIp {
    type Prop = FloatingIpProperty;

    const RESOURCE_TYPE: ResourceType = ResourceType::FloatingIp;

    const DEFAULT_COLUMNS: &'static [FloatingIpProperty] = &[
        FloatingIpProperty::Id,
        FloatingIpProperty::FloatingIpAddress,
        FloatingIpProperty::Status,
        FloatingIpProperty::PortId,
        FloatingIpProperty::ProjectId,
    ];

    fn property(&self, prop: FloatingIpProperty) -> PropertyValue {
        use FloatingIpProperty::*;
        match prop {
            Id => PropertyValue::Direct(self.id.clone().into()),
            // Neutron floating IPs carry no name of their own.
            Name => either(&self.name, &self.floating_ip_address),
            FloatingIpAddress => text(&self.floating_ip_address),
            FixedIpAddress => text(&self.fixed_ip_address),
            FloatingNetworkId => text(&self.floating_network_id),
            PortId => text(&self.port_id),
            RouterId => text(&self.router_id),
            Status => text(&self.status),
            Description => text(&self.description),
            ProjectId => text(self.project()),
            CreatedAt => text(&self.created_at),
            UpdatedAt => text(&self.updated_at),
            ProjectName => derived(LookupTarget::Project, self.project(), "name"),
            ProjectEmail => derived(LookupTarget::Project, self.project(), "email"),
        }
    }

    fn client_side_handlers() -> ClientSideHandlers<FloatingIpProperty> {
        ClientSideHandlers::by_kind()
    }

    /// Neutron accepts repeated query parameters, so any membership list
    /// can be pushed down. `changes_since` keeps rows with
    /// `updated_at >= cutoff`.
    fn server_side_handler() -> ServerSideHandler<FloatingIpProperty> {
        use FloatingIpProperty::*;
        ServerSideHandler::new()
            .with(DateTimePreset::YoungerThanOrEqual, UpdatedAt, cutoff("changes_since"))
            .any_in(Id, value_list("id"))
            .any_in(Status, value_list("status"))
            .any_in(ProjectId, value_list("project_id"))
            .any_in(PortId, value_list("port_id"))
            .any_in(RouterId, value_list("router_id"))
            .any_in(FloatingNetworkId, value_list("floating_network_id"))
            .any_in(FloatingIpAddress, value_list("floating_ip_address"))
    }
}
