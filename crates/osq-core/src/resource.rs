use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The OpenStack collections the engine can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Server,
    FloatingIp,
    LoadBalancer,
    VolumeSnapshot,
    Project,
    SecurityGroupRule,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        Self::Server,
        Self::FloatingIp,
        Self::LoadBalancer,
        Self::VolumeSnapshot,
        Self::Project,
        Self::SecurityGroupRule,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::FloatingIp => "floating_ip",
            Self::LoadBalancer => "load_balancer",
            Self::VolumeSnapshot => "volume_snapshot",
            Self::Project => "project",
            Self::SecurityGroupRule => "security_group_rule",
        }
    }

    /// Collection key used in JSON dumps and API list responses.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Server => "servers",
            Self::FloatingIp => "floatingips",
            Self::LoadBalancer => "loadbalancers",
            Self::VolumeSnapshot => "snapshots",
            Self::Project => "projects",
            Self::SecurityGroupRule => "security_group_rules",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "server" | "servers" | "vm" => Ok(Self::Server),
            "floating_ip" | "floating_ips" | "floatingip" | "floatingips" | "fip" | "fips" => {
                Ok(Self::FloatingIp)
            }
            "load_balancer" | "load_balancers" | "loadbalancer" | "loadbalancers" | "lb" => {
                Ok(Self::LoadBalancer)
            }
            "volume_snapshot" | "volume_snapshots" | "snapshot" | "snapshots" => {
                Ok(Self::VolumeSnapshot)
            }
            "project" | "projects" => Ok(Self::Project),
            "security_group_rule" | "security_group_rules" | "sg_rule" | "sg_rules" | "rule" | "rules" => {
                Ok(Self::SecurityGroupRule)
            }
            _ => Err(QueryError::UnknownResourceType(s.to_string())),
        }
    }
}

/// Records that can be fetched by id to resolve derived properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupTarget {
    Project,
    User,
    SecurityGroup,
}

impl LookupTarget {
    pub fn name(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::User => "user",
            Self::SecurityGroup => "security_group",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Project => "projects",
            Self::User => "users",
            Self::SecurityGroup => "security_groups",
        }
    }
}

impl fmt::Display for LookupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("FIPs".parse::<ResourceType>().unwrap(), ResourceType::FloatingIp);
        assert_eq!("load-balancer".parse::<ResourceType>().unwrap(), ResourceType::LoadBalancer);
        assert_eq!("snapshot".parse::<ResourceType>().unwrap(), ResourceType::VolumeSnapshot);
        assert_eq!("sg-rules".parse::<ResourceType>().unwrap(), ResourceType::SecurityGroupRule);
    }

    #[test]
    fn test_parse_round_trips_name() {
        for rt in ResourceType::ALL {
            assert_eq!(rt.name().parse::<ResourceType>().unwrap(), rt);
            assert_eq!(rt.plural().parse::<ResourceType>().unwrap(), rt);
        }
    }

    #[test]
    fn test_unknown_resource_type() {
        assert!(matches!(
            "network".parse::<ResourceType>(),
            Err(QueryError::UnknownResourceType(_))
        ));
    }
}
