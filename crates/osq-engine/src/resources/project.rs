use osq_core::{define_properties, ResourceType, StringPreset};
use serde::Deserialize;
use serde_json::Value;

use super::{text, PropertyValue, QueryResource};
use crate::handlers::{single_value, ClientSideHandlers, ServerSideHandler, Supported};

define_properties! {
    /// Properties of a Keystone project.
    pub enum ProjectProperty for Project {
        Id => "id": String | "project_id",
        Name => "name": String | "project_name",
        Description => "description": String,
        DomainId => "domain_id": String | "domain",
        ParentId => "parent_id": String | "parent",
        Email => "email": String | "project_email",
        IsEnabled => "is_enabled": Generic | "enabled",
        IsDomain => "is_domain": Generic,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Contact address; an extra attribute set by the cloud operator.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "is_enabled")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub is_domain: Option<bool>,
}

impl QueryResource for Project {
    type Prop = ProjectProperty;

    const RESOURCE_TYPE: ResourceType = ResourceType::Project;

    const DEFAULT_COLUMNS: &'static [ProjectProperty] = &[
        ProjectProperty::Id,
        ProjectProperty::Name,
        ProjectProperty::DomainId,
        ProjectProperty::IsEnabled,
    ];

    fn property(&self, prop: ProjectProperty) -> PropertyValue {
        use ProjectProperty::*;
        let flag = |v: Option<bool>| PropertyValue::Direct(v.map_or(Value::Null, Value::Bool));
        match prop {
            Id => PropertyValue::Direct(self.id.clone().into()),
            Name => text(&self.name),
            Description => text(&self.description),
            DomainId => text(&self.domain_id),
            ParentId => text(&self.parent_id),
            Email => text(&self.email),
            IsEnabled => flag(self.enabled),
            IsDomain => flag(self.is_domain),
        }
    }

    fn client_side_handlers() -> ClientSideHandlers<ProjectProperty> {
        use ProjectProperty::*;
        // Ids are opaque; only human-readable fields take patterns.
        ClientSideHandlers::by_kind().restrict(
            StringPreset::MatchesRegex,
            Supported::Only(vec![Name, Description, Email]),
        )
    }

    fn server_side_handler() -> ServerSideHandler<ProjectProperty> {
        use ProjectProperty::*;
        ServerSideHandler::new()
            .any_in(Name, single_value("name"))
            .any_in(DomainId, single_value("domain_id"))
            .any_in(ParentId, single_value("parent_id"))
            .any_in(IsEnabled, single_value("enabled"))
    }
}
