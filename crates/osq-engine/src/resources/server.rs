use osq_core::{define_properties, LookupTarget};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{derived, either, nested_id, text, PropertyValue, QueryResource};
use crate::handlers::{single_value, single_value_with, ClientSideHandlers, ServerSideHandler};

define_properties! {
    /// Properties of a compute server.
    pub enum ServerProperty for Server {
        Id => "id": String | "server_id" | "uuid",
        Name => "name": String | "server_name",
        Status => "status": String | "server_status",
        TaskState => "task_state": String,
        Host => "host": String | "hypervisor_hostname",
        FlavorId => "flavor_id": String | "flavor",
        ImageId => "image_id": String | "image",
        ProjectId => "project_id": String | "project" | "tenant_id",
        UserId => "user_id": String | "user",
        CreatedAt => "created_at": DateTime | "server_creation_date",
        UpdatedAt => "updated_at": DateTime | "server_last_updated_date",
        SecurityGroups => "security_groups": String | "security_group_names",
        ProjectName => "project_name": String,
        ProjectEmail => "project_email": String,
        UserName => "user_name": String,
        UserEmail => "user_email": String,
    }
}

/// A Nova server, as returned by `GET /servers/detail`.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "OS-EXT-STS:task_state", alias = "task_state")]
    pub task_state: Option<String>,
    #[serde(default, rename = "OS-EXT-SRV-ATTR:hypervisor_hostname", alias = "hypervisor_hostname")]
    pub host: Option<String>,
    #[serde(default)]
    pub flavor: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub security_groups: Option<Vec<Value>>,
}

impl Server {
    fn project(&self) -> &Option<String> {
        if self.project_id.is_some() {
            &self.project_id
        } else {
            &self.tenant_id
        }
    }

    /// Applied group names as Nova reports them, comma-joined in order.
    fn security_group_names(&self) -> PropertyValue {
        let names: Vec<&str> = self
            .security_groups
            .iter()
            .flatten()
            .filter_map(|group| group.get("name").and_then(Value::as_str))
            .collect();
        if names.is_empty() {
            PropertyValue::Direct(Value::Null)
        } else {
            PropertyValue::Direct(Value::String(names.join(",")))
        }
    }
}

impl QueryResource for Server {
    type Prop = ServerProperty;

    const RESOURCE_TYPE: osq_core::ResourceType = osq_core::ResourceType::Server;

    const DEFAULT_COLUMNS: &'static [ServerProperty] = &[
        ServerProperty::Id,
        ServerProperty::Name,
        ServerProperty::Status,
        ServerProperty::ProjectId,
        ServerProperty::UpdatedAt,
    ];

    fn property(&self, prop: ServerProperty) -> PropertyValue {
        use ServerProperty::*;
        match prop {
            Id => PropertyValue::Direct(Value::String(self.id.clone())),
            Name => text(&self.name),
            Status => text(&self.status),
            TaskState => text(&self.task_state),
            Host => text(&self.host),
            FlavorId => nested_id(&self.flavor),
            ImageId => nested_id(&self.image),
            ProjectId => text(self.project()),
            UserId => text(&self.user_id),
            CreatedAt => either(&self.created_at, &self.created),
            UpdatedAt => either(&self.updated_at, &self.updated),
            SecurityGroups => self.security_group_names(),
            ProjectName => derived(LookupTarget::Project, self.project(), "name"),
            ProjectEmail => derived(LookupTarget::Project, self.project(), "email"),
            UserName => derived(LookupTarget::User, &self.user_id, "name"),
            UserEmail => derived(LookupTarget::User, &self.user_id, "email"),
        }
    }

    fn client_side_handlers() -> ClientSideHandlers<ServerProperty> {
        ClientSideHandlers::by_kind()
    }

    /// Nova filters on one value per parameter. `updated_at` is never pushed
    /// down: `changes-since` and `changes-before` also list deleted servers.
    fn server_side_handler() -> ServerSideHandler<ServerProperty> {
        use ServerProperty::*;
        ServerSideHandler::new()
            .any_in(Status, single_value("status"))
            .any_in(ProjectId, single_value_with("project_id", vec![("all_tenants", json!(true))]))
            .any_in(UserId, single_value("user_id"))
            .any_in(FlavorId, single_value("flavor"))
            .any_in(ImageId, single_value("image"))
    }
}
