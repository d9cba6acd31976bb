use osq_core::{define_properties, LookupTarget, ResourceType};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{derived, text, PropertyValue, QueryResource};
use crate::handlers::{value_list, ClientSideHandlers, ServerSideHandler};

define_properties! {
    /// Properties of a Neutron security group rule.
    pub enum SecurityGroupRuleProperty for SecurityGroupRule {
        Id => "id": String | "rule_id",
        SecurityGroupId => "security_group_id": String | "security_group" | "sec_id",
        Direction => "direction": String,
        Ethertype => "ethertype": String | "ether_type",
        Protocol => "protocol": String,
        PortRangeMin => "port_range_min": Integer | "min_port",
        PortRangeMax => "port_range_max": Integer | "max_port",
        RemoteIpPrefix => "remote_ip_prefix": String | "ip_prefix" | "cidr",
        RemoteGroupId => "remote_group_id": String,
        Description => "description": String,
        ProjectId => "project_id": String | "project" | "tenant_id",
        CreatedAt => "created_at": DateTime,
        UpdatedAt => "updated_at": DateTime,
        SecurityGroupName => "security_group_name": String,
        ProjectName => "project_name": String,
        ProjectEmail => "project_email": String,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityGroupRule {
    pub id: String,
    #[serde(default)]
    pub security_group_id: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub ethertype: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub port_range_min: Option<i64>,
    #[serde(default)]
    pub port_range_max: Option<i64>,
    #[serde(default)]
    pub remote_ip_prefix: Option<String>,
    #[serde(default)]
    pub remote_group_id: Option<String>,
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

impl SecurityGroupRule {
    fn project(&self) -> &Option<String> {
        if self.project_id.is_some() {
            &self.project_id
        } else {
            &self.tenant_id
        }
    }
}

fn port(value: Option<i64>) -> PropertyValue {
    PropertyValue::Direct(value.map_or(Value::Null, |p| json!(p)))
}

impl QueryResource for SecurityGroupRule {
    type Prop = SecurityGroupRuleProperty;

    const RESOURCE_TYPE: ResourceType = ResourceType::SecurityGroupRule;

    const DEFAULT_COLUMNS: &'static [SecurityGroupRuleProperty] = &[
        SecurityGroupRuleProperty::Id,
        SecurityGroupRuleProperty::SecurityGroupId,
        SecurityGroupRuleProperty::Direction,
        SecurityGroupRuleProperty::RemoteIpPrefix,
        SecurityGroupRuleProperty::PortRangeMin,
        SecurityGroupRuleProperty::PortRangeMax,
    ];

    fn property(&self, prop: SecurityGroupRuleProperty) -> PropertyValue {
        use SecurityGroupRuleProperty::*;
        match prop {
            Id => PropertyValue::Direct(self.id.clone().into()),
            SecurityGroupId => text(&self.security_group_id),
            Direction => text(&self.direction),
            Ethertype => text(&self.ethertype),
            Protocol => text(&self.protocol),
            PortRangeMin => port(self.port_range_min),
            PortRangeMax => port(self.port_range_max),
            RemoteIpPrefix => text(&self.remote_ip_prefix),
            RemoteGroupId => text(&self.remote_group_id),
            Description => text(&self.description),
            ProjectId => text(self.project()),
            CreatedAt => text(&self.created_at),
            UpdatedAt => text(&self.updated_at),
            SecurityGroupName => derived(LookupTarget::SecurityGroup, &self.security_group_id, "name"),
            ProjectName => derived(LookupTarget::Project, self.project(), "name"),
            ProjectEmail => derived(LookupTarget::Project, self.project(), "email"),
        }
    }

    fn client_side_handlers() -> ClientSideHandlers<SecurityGroupRuleProperty> {
        ClientSideHandlers::by_kind()
    }

    /// Neutron filters every listed attribute by exact match and accepts
    /// repeated parameters.
    fn server_side_handler() -> ServerSideHandler<SecurityGroupRuleProperty> {
        use SecurityGroupRuleProperty::*;
        ServerSideHandler::new()
            .any_in(Id, value_list("id"))
            .any_in(SecurityGroupId, value_list("security_group_id"))
            .any_in(Direction, value_list("direction"))
            .any_in(Ethertype, value_list("ethertype"))
            .any_in(Protocol, value_list("protocol"))
            .any_in(PortRangeMin, value_list("port_range_min"))
            .any_in(PortRangeMax, value_list("port_range_max"))
            .any_in(RemoteIpPrefix, value_list("remote_ip_prefix"))
            .any_in(ProjectId, value_list("project_id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Lookup;
    use osq_core::{GenericPreset, IntegerPreset, Preset};

    #[test]
    fn test_decodes_neutron_rule() {
        let rule = SecurityGroupRule::decode(json!({
            "id": "r1",
            "security_group_id": "sg1",
            "direction": "ingress",
            "ethertype": "IPv4",
            "protocol": "tcp",
            "port_range_min": 22,
            "port_range_max": 22,
            "remote_ip_prefix": "0.0.0.0/0",
            "tenant_id": "p1"
        }))
        .unwrap();
        assert_eq!(rule.property(SecurityGroupRuleProperty::PortRangeMin), PropertyValue::Direct(json!(22)));
        assert_eq!(rule.property(SecurityGroupRuleProperty::ProjectId), PropertyValue::Direct(json!("p1")));
        assert_eq!(
            rule.property(SecurityGroupRuleProperty::SecurityGroupName),
            PropertyValue::Derived(Lookup {
                target: LookupTarget::SecurityGroup,
                id: Some("sg1".to_string()),
                field: "name",
            })
        );
        let any_port = SecurityGroupRule::decode(json!({"id": "r2", "port_range_min": null})).unwrap();
        assert_eq!(any_port.property(SecurityGroupRuleProperty::PortRangeMax), PropertyValue::Direct(Value::Null));
    }

    #[test]
    fn test_ports_take_integer_and_membership_presets() {
        let client = SecurityGroupRule::client_side_handlers();
        let server = SecurityGroupRule::server_side_handler();
        let port = SecurityGroupRuleProperty::PortRangeMin;
        assert!(client.check_supported(Preset::Integer(IntegerPreset::GreaterOrEqual), port));
        assert!(server.check_supported(Preset::Generic(GenericPreset::AnyIn), port));
        assert!(!server.check_supported(Preset::Integer(IntegerPreset::GreaterOrEqual), port));
        assert_eq!("ip_prefix".parse::<SecurityGroupRuleProperty>().unwrap(), SecurityGroupRuleProperty::RemoteIpPrefix);
    }

    #[test]
    fn test_pushdown_is_consistent() {
        SecurityGroupRule::server_side_handler()
            .check_consistency(ResourceType::SecurityGroupRule, &SecurityGroupRule::client_side_handlers())
            .unwrap();
    }
}
