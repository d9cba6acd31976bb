//! # Anomaly Checks
//!
//! A closed set of named checks, each expressed as one or more ordinary
//! queries whose matches become tickets. Checks are dispatched by enum
//! variant; the CLI builds every check once at start-up so a bad definition
//! fails before anything is listed.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use osq_core::{DateTimePreset, GenericPreset, LookupTarget, QueryError, ResourceType, Result, StringPreset};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::lister::{AuxiliaryLookup, ResourceLister};
use crate::query::{Query, QueryOptions, QueryResults, ResultBody, ResultRecord};
use crate::resources::{
    FloatingIp, FloatingIpProperty, LoadBalancer, LoadBalancerProperty, QueryResource, SecurityGroupRule,
    SecurityGroupRuleProperty, Server, ServerProperty, VolumeSnapshot, VolumeSnapshotProperty,
};
use crate::tickets::{Ticket, TicketTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Check {
    /// Servers stuck in the `deleting` task state.
    DeletingServers,
    /// Volume snapshots nobody has touched for a long time.
    StaleSnapshots,
    /// Load balancers whose operating status is not ONLINE.
    UnhealthyLoadBalancers,
    /// Floating IPs that have been DOWN for a while.
    DownFloatingIps,
    /// Servers carrying a security group with a rule that opens a port
    /// range to a remote prefix.
    MisappliedSecurityRules,
    /// Floating IPs whose project no longer exists.
    OrphanedFloatingIps,
}

/// Optional scope and overrides for a check run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckParams {
    pub project_id: Option<String>,
    /// Minutes for `deleting-servers`, days for the age-based others.
    pub age: Option<u32>,
    /// Remote prefix of a misapplied rule (default `0.0.0.0/0`).
    pub ip_prefix: Option<String>,
    /// Port range of a misapplied rule (default 22-22).
    pub min_port: Option<u16>,
    pub max_port: Option<u16>,
}

impl CheckParams {
    fn rule_shape(&self) -> (&str, u16, u16) {
        (
            self.ip_prefix.as_deref().unwrap_or("0.0.0.0/0"),
            self.min_port.unwrap_or(22),
            self.max_port.unwrap_or(22),
        )
    }
}

/// Columns of a `misapplied-security-rules` record: the server's, then the
/// offending rule's.
const MISAPPLIED_SERVER_COLUMNS: [&str; 6] = ["id", "name", "status", "project_id", "project_name", "project_email"];
const MISAPPLIED_RULE_COLUMNS: [&str; 6] = [
    "security_group_id",
    "security_group_name",
    "rule_id",
    "remote_ip_prefix",
    "port_range_min",
    "port_range_max",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub check: Check,
    pub results: QueryResults,
    pub tickets: Vec<Ticket>,
}

impl Check {
    pub const ALL: [Check; 6] = [
        Self::DeletingServers,
        Self::StaleSnapshots,
        Self::UnhealthyLoadBalancers,
        Self::DownFloatingIps,
        Self::MisappliedSecurityRules,
        Self::OrphanedFloatingIps,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::DeletingServers => "deleting-servers",
            Self::StaleSnapshots => "stale-snapshots",
            Self::UnhealthyLoadBalancers => "unhealthy-load-balancers",
            Self::DownFloatingIps => "down-floating-ips",
            Self::MisappliedSecurityRules => "misapplied-security-rules",
            Self::OrphanedFloatingIps => "orphaned-floating-ips",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::DeletingServers => "servers stuck deleting for longer than N minutes (default 10)",
            Self::StaleSnapshots => "volume snapshots not updated for N days (default 30)",
            Self::UnhealthyLoadBalancers => "load balancers whose operating status is not ONLINE",
            Self::DownFloatingIps => "floating IPs DOWN and unchanged for N days (default 7)",
            Self::MisappliedSecurityRules => {
                "servers with a security group opening a port range to a prefix (default 22-22 from 0.0.0.0/0)"
            }
            Self::OrphanedFloatingIps => "floating IPs whose project no longer exists",
        }
    }

    /// The age threshold actually applied, `None` for checks without one.
    pub fn age(self, params: &CheckParams) -> Option<u32> {
        let default = match self {
            Self::DeletingServers => 10,
            Self::StaleSnapshots => 30,
            Self::DownFloatingIps => 7,
            Self::UnhealthyLoadBalancers | Self::MisappliedSecurityRules | Self::OrphanedFloatingIps => return None,
        };
        Some(params.age.unwrap_or(default))
    }

    pub fn template(self, params: &CheckParams) -> TicketTemplate {
        let age = self.age(params).unwrap_or_default();
        match self {
            Self::DeletingServers => TicketTemplate::new(
                format!("Server {{id}} has not been updated in more than {} minutes during deletion", age),
                "The following information may be useful\nServer: {name} ({id})\nHost: {host}\n\
                 Task state: {task_state}\nLast updated: {updated_at}\n\
                 Project: {project_name} ({project_id})\nContact: {project_email}",
            ),
            Self::StaleSnapshots => TicketTemplate::new(
                "Project {project_name} has an old volume snapshot",
                "The volume snapshot was last updated on: {last_updated}\nSnapshot name: {name}\n\
                 Snapshot id: {id}\nVolume id: {volume_id}\nProject id: {project_id}\nContact: {project_email}",
            ),
            Self::UnhealthyLoadBalancers => TicketTemplate::new(
                "Issue with load balancer {name} ({id})",
                "Operating status: {operating_status}\nProvisioning status: {provisioning_status}\n\
                 VIP address: {vip_address}\nProject: {project_name} ({project_id})",
            ),
            Self::DownFloatingIps => TicketTemplate::new(
                format!("Floating IP {{floating_ip_address}} has been DOWN for more than {} days", age),
                "Floating IP id: {id}\nPort: {port_id}\nLast updated: {updated_at}\n\
                 Project: {project_name} ({project_id})\nContact: {project_email}",
            ),
            Self::MisappliedSecurityRules => TicketTemplate::new(
                "Server {id} has an incorrectly configured security group",
                "Security group: {security_group_name} ({security_group_id})\n\
                 Rule: {rule_id} allows {remote_ip_prefix} on ports {port_range_min}-{port_range_max}\n\
                 Server: {name} ({id})\nProject: {project_name} ({project_id})\nContact: {project_email}",
            ),
            Self::OrphanedFloatingIps => TicketTemplate::new(
                "Floating IP {floating_ip_address} belongs to missing project {project_id}",
                "Floating IP id: {id}\nStatus: {status}\nPort: {port_id}\nProject id: {project_id}",
            ),
        }
    }

    /// Build the check's query without running it.
    pub fn validate(self, params: &CheckParams) -> Result<()> {
        let now = Utc::now();
        match self {
            Self::DeletingServers => deleting_servers(params, now).map(drop),
            Self::StaleSnapshots => stale_snapshots(params, now).map(drop),
            Self::UnhealthyLoadBalancers => unhealthy_load_balancers(params, now).map(drop),
            Self::DownFloatingIps => down_floating_ips(params, now).map(drop),
            Self::MisappliedSecurityRules => {
                misapplied_rules(params, now)?;
                servers_in_group("project", "group", now).map(drop)
            }
            Self::OrphanedFloatingIps => owned_floating_ips(params, now).map(drop),
        }
    }

    pub fn run(
        self,
        params: &CheckParams,
        now: DateTime<Utc>,
        options: QueryOptions,
        lister: &dyn ResourceLister,
        lookup: &dyn AuxiliaryLookup,
    ) -> Result<CheckReport> {
        let results = match self {
            Self::DeletingServers => deleting_servers(params, now)?.options(options).run(lister, lookup)?,
            Self::StaleSnapshots => stale_snapshots(params, now)?.options(options).run(lister, lookup)?,
            Self::UnhealthyLoadBalancers => {
                unhealthy_load_balancers(params, now)?.options(options).run(lister, lookup)?
            }
            Self::DownFloatingIps => down_floating_ips(params, now)?.options(options).run(lister, lookup)?,
            Self::MisappliedSecurityRules => misapplied_security_rules(params, now, options, lister, lookup)?,
            Self::OrphanedFloatingIps => orphaned_floating_ips(params, now, options, lister, lookup)?,
        };
        let template = self.template(params);
        let tickets: Vec<Ticket> = results.records().into_iter().map(|r| template.render(r)).collect();
        info!(check = %self, matched = results.len(), project = ?params.project_id, "check complete");
        Ok(CheckReport {
            check: self,
            results,
            tickets,
        })
    }
}

/// Validate every check with default parameters.
pub fn validate_checks() -> Result<()> {
    Check::ALL
        .iter()
        .try_for_each(|check| check.validate(&CheckParams::default()))
}

fn scoped<R: QueryResource>(query: Query<R>, prop: R::Prop, params: &CheckParams) -> Result<Query<R>> {
    match &params.project_id {
        Some(id) => query.where_preset(prop, StringPreset::AnyIn, &json!([id])),
        None => Ok(query),
    }
}

fn deleting_servers(params: &CheckParams, now: DateTime<Utc>) -> Result<Query<Server>> {
    use ServerProperty::*;
    let minutes = Check::DeletingServers.age(params).unwrap_or_default();
    let query = Query::at(now)
        .select([Id, Name, Host, TaskState, UpdatedAt, ProjectId, ProjectName, ProjectEmail])
        .where_preset(TaskState, StringPreset::AnyIn, &json!(["deleting"]))?
        .where_preset(UpdatedAt, DateTimePreset::OlderThan, &json!({"minutes": minutes}))?;
    scoped(query, ProjectId, params)
}

fn stale_snapshots(params: &CheckParams, now: DateTime<Utc>) -> Result<Query<VolumeSnapshot>> {
    use VolumeSnapshotProperty::*;
    let days = Check::StaleSnapshots.age(params).unwrap_or_default();
    let query = Query::at(now)
        .select([Id, Name, VolumeId, LastUpdated, ProjectId, ProjectName, ProjectEmail])
        .where_preset(LastUpdated, DateTimePreset::OlderThan, &json!(days))?;
    scoped(query, ProjectId, params)
}

fn unhealthy_load_balancers(params: &CheckParams, now: DateTime<Utc>) -> Result<Query<LoadBalancer>> {
    use LoadBalancerProperty::*;
    let query = Query::at(now)
        .select([Id, Name, VipAddress, OperatingStatus, ProvisioningStatus, ProjectId, ProjectName])
        .where_preset(OperatingStatus, StringPreset::NotAnyIn, &json!(["ONLINE"]))?;
    scoped(query, ProjectId, params)
}

fn down_floating_ips(params: &CheckParams, now: DateTime<Utc>) -> Result<Query<FloatingIp>> {
    use FloatingIpProperty::*;
    let days = Check::DownFloatingIps.age(params).unwrap_or_default();
    let query = Query::at(now)
        .select([Id, FloatingIpAddress, Status, PortId, UpdatedAt, ProjectId, ProjectName, ProjectEmail])
        .where_preset(Status, StringPreset::AnyIn, &json!(["DOWN"]))?
        .where_preset(UpdatedAt, DateTimePreset::OlderThan, &json!(days))?;
    scoped(query, ProjectId, params)
}

fn misapplied_rules(params: &CheckParams, now: DateTime<Utc>) -> Result<Query<SecurityGroupRule>> {
    use SecurityGroupRuleProperty::*;
    let (prefix, min_port, max_port) = params.rule_shape();
    let query = Query::at(now)
        .select([Id, SecurityGroupId, SecurityGroupName, RemoteIpPrefix, PortRangeMin, PortRangeMax, ProjectId])
        .where_preset(RemoteIpPrefix, StringPreset::AnyIn, &json!([prefix]))?
        .where_preset(PortRangeMin, GenericPreset::AnyIn, &json!([min_port]))?
        .where_preset(PortRangeMax, GenericPreset::AnyIn, &json!([max_port]))?;
    scoped(query, ProjectId, params)
}

/// Servers of one project with the named group applied. Nova reports
/// applied groups by name only.
fn servers_in_group(project_id: &str, group: &str, now: DateTime<Utc>) -> Result<Query<Server>> {
    use ServerProperty::*;
    let pattern = format!("(^|,){}(,|$)", regex::escape(group));
    Query::at(now)
        .select([Id, Name, Status, ProjectId, ProjectName, ProjectEmail])
        .where_preset(ProjectId, StringPreset::AnyIn, &json!([project_id]))?
        .where_preset(SecurityGroups, StringPreset::MatchesRegex, &json!(pattern))
}

fn misapplied_security_rules(
    params: &CheckParams,
    now: DateTime<Utc>,
    options: QueryOptions,
    lister: &dyn ResourceLister,
    lookup: &dyn AuxiliaryLookup,
) -> Result<QueryResults> {
    let rules = misapplied_rules(params, now)?.options(options).run(lister, lookup)?;
    let mut groups_seen = HashSet::new();
    let mut records = Vec::new();
    for rule in rules.records() {
        let field = |key: &str| rule.get(key).and_then(Value::as_str);
        let (Some(group_id), Some(group), Some(project)) =
            (field("security_group_id"), field("security_group_name"), field("project_id"))
        else {
            warn!(rule = ?rule.get("id"), "rule without a resolvable group or project, skipped");
            continue;
        };
        // One ticket per server and group, however many rules match.
        if !groups_seen.insert(group_id.to_string()) {
            continue;
        }
        let servers = servers_in_group(project, group, now)?.options(options).run(lister, lookup)?;
        debug!(group, project, servers = servers.len(), "group applied");
        for server in servers.records() {
            let mut record = ResultRecord::new();
            for key in MISAPPLIED_SERVER_COLUMNS {
                record.insert(key.to_string(), server.get(key).cloned().unwrap_or(Value::Null));
            }
            for key in MISAPPLIED_RULE_COLUMNS {
                let source = if key == "rule_id" { "id" } else { key };
                record.insert(key.to_string(), rule.get(source).cloned().unwrap_or(Value::Null));
            }
            records.push(record);
        }
    }
    Ok(QueryResults {
        resource: ResourceType::Server,
        columns: MISAPPLIED_SERVER_COLUMNS
            .iter()
            .chain(MISAPPLIED_RULE_COLUMNS.iter())
            .map(|c| c.to_string())
            .collect(),
        group_by: None,
        body: ResultBody::Flat(records),
    })
}

fn owned_floating_ips(params: &CheckParams, now: DateTime<Utc>) -> Result<Query<FloatingIp>> {
    use FloatingIpProperty::*;
    let query = Query::at(now)
        .select([Id, FloatingIpAddress, Status, PortId, ProjectId])
        .where_preset(ProjectId, GenericPreset::NotAnyIn, &json!([null]))?;
    scoped(query, ProjectId, params)
}

/// Floating IPs whose project the identity service no longer knows. A
/// failed lookup aborts the check rather than reporting a false orphan.
fn orphaned_floating_ips(
    params: &CheckParams,
    now: DateTime<Utc>,
    options: QueryOptions,
    lister: &dyn ResourceLister,
    lookup: &dyn AuxiliaryLookup,
) -> Result<QueryResults> {
    let results = owned_floating_ips(params, now)?.options(options).run(lister, lookup)?;
    let mut exists: HashMap<String, bool> = HashMap::new();
    let mut orphans = Vec::new();
    for record in results.records() {
        let Some(project) = record.get("project_id").and_then(Value::as_str) else {
            continue;
        };
        let found = match exists.get(project) {
            Some(found) => *found,
            None => {
                let found = lookup
                    .get(LookupTarget::Project, project)
                    .map_err(|e| QueryError::LookupFailure {
                        target: LookupTarget::Project,
                        id: project.to_string(),
                        reason: e.to_string(),
                    })?
                    .is_some();
                exists.insert(project.to_string(), found);
                found
            }
        };
        if !found {
            orphans.push(record.clone());
        }
    }
    debug!(projects = exists.len(), orphans = orphans.len(), "project existence checked");
    Ok(QueryResults {
        body: ResultBody::Flat(orphans),
        ..results
    })
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Check {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase().replace('_', "-");
        Check::ALL
            .into_iter()
            .find(|c| c.name() == needle)
            .ok_or_else(|| QueryError::UnknownCheck(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::NoLookup;
    use crate::memory::MemoryLister;
    use chrono::TimeZone;
    use osq_core::ResourceType;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 8, 1, 12, 0, 0).unwrap()
    }

    fn cloud() -> MemoryLister {
        MemoryLister::from_dump(&json!({
            "servers": [
                {"id": "s1", "name": "old", "OS-EXT-STS:task_state": "deleting", "project_id": "p1", "updated": "2021-08-01T11:30:00Z",
                 "security_groups": [{"name": "default"}]},
                {"id": "s2", "name": "new", "OS-EXT-STS:task_state": "deleting", "project_id": "p2", "updated": "2021-08-01T11:55:00Z",
                 "security_groups": [{"name": "ssh-open"}]},
                {"id": "s3", "name": "idle", "OS-EXT-STS:task_state": null, "project_id": "p1", "updated": "2021-01-01T00:00:00Z",
                 "security_groups": [{"name": "default"}, {"name": "ssh-open"}]},
                {"id": "s4", "name": "lookalike", "project_id": "p1", "updated": "2021-08-01T00:00:00Z",
                 "security_groups": [{"name": "ssh-open-v2"}]}
            ],
            "security_group_rules": [
                {"id": "r1", "security_group_id": "sg1", "remote_ip_prefix": "0.0.0.0/0", "port_range_min": 22, "port_range_max": 22, "project_id": "p1"},
                {"id": "r2", "security_group_id": "sg1", "remote_ip_prefix": "0.0.0.0/0", "port_range_min": 22, "port_range_max": 22, "project_id": "p1"},
                {"id": "r3", "security_group_id": "sg2", "remote_ip_prefix": "10.0.0.0/8", "port_range_min": 22, "port_range_max": 22, "project_id": "p1"},
                {"id": "r4", "security_group_id": "sg3", "remote_ip_prefix": "0.0.0.0/0", "port_range_min": 1, "port_range_max": 65535, "project_id": "p1"}
            ],
            "security_groups": [
                {"id": "sg1", "name": "ssh-open"},
                {"id": "sg2", "name": "internal"},
                {"id": "sg3", "name": "default"}
            ],
            "loadbalancers": [
                {"id": "lb1", "name": "front", "operating_status": "ONLINE"},
                {"id": "lb2", "name": "back", "operating_status": "DEGRADED", "project_id": "p1"}
            ],
            "floatingips": [
                {"id": "f1", "floating_ip_address": "203.0.113.9", "status": "DOWN", "updated_at": "2021-07-01T00:00:00Z"},
                {"id": "f2", "floating_ip_address": "203.0.113.10", "status": "ACTIVE", "project_id": "p1"},
                {"id": "f3", "floating_ip_address": "203.0.113.11", "status": "ACTIVE", "project_id": "gone"},
                {"id": "f4", "floating_ip_address": "203.0.113.12", "status": "ACTIVE", "project_id": "gone"}
            ],
            "projects": [{"id": "p1", "name": "alpha", "email": "alpha@example.org"}]
        }))
        .unwrap()
    }

    fn ids(report: &CheckReport) -> Vec<String> {
        report
            .results
            .records()
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    fn run(check: Check, params: &CheckParams) -> CheckReport {
        let lister = cloud();
        check.run(params, now(), QueryOptions::default(), &lister, &lister).unwrap()
    }

    #[test]
    fn test_deleting_servers_respects_minutes() {
        let report = run(Check::DeletingServers, &CheckParams::default());
        assert_eq!(report.tickets.len(), 1);
        assert_eq!(
            report.tickets[0].title,
            "Server s1 has not been updated in more than 10 minutes during deletion"
        );
        assert!(report.tickets[0].body.contains("Contact: alpha@example.org"));
        assert!(report.tickets[0].body.contains("Host: null"));

        let wider = run(
            Check::DeletingServers,
            &CheckParams {
                age: Some(1),
                ..CheckParams::default()
            },
        );
        assert_eq!(wider.tickets.len(), 2);
    }

    #[test]
    fn test_project_scope() {
        let params = CheckParams {
            project_id: Some("p2".to_string()),
            age: Some(1),
            ..CheckParams::default()
        };
        let report = run(Check::DeletingServers, &params);
        assert_eq!(report.results.records()[0]["id"], json!("s2"));
        assert_eq!(report.tickets.len(), 1);
    }

    #[test]
    fn test_unhealthy_load_balancers() {
        let report = run(Check::UnhealthyLoadBalancers, &CheckParams::default());
        assert_eq!(report.tickets.len(), 1);
        assert_eq!(report.tickets[0].title, "Issue with load balancer back (lb2)");
        assert_eq!(report.results.resource, ResourceType::LoadBalancer);
    }

    #[test]
    fn test_down_floating_ips_and_empty_snapshots() {
        let report = run(Check::DownFloatingIps, &CheckParams::default());
        assert_eq!(report.tickets[0].title, "Floating IP 203.0.113.9 has been DOWN for more than 7 days");
        let report = run(Check::StaleSnapshots, &CheckParams::default());
        assert!(report.tickets.is_empty());
    }

    #[test]
    fn test_every_check_builds() {
        validate_checks().unwrap();
        for check in Check::ALL {
            assert_eq!(check.name().parse::<Check>().unwrap(), check);
        }
        assert_eq!("stale_snapshots".parse::<Check>().unwrap(), Check::StaleSnapshots);
        assert!("melting-disks".parse::<Check>().is_err());
    }

    #[test]
    fn test_misapplied_security_rules_flag_servers_carrying_the_group() {
        let report = run(Check::MisappliedSecurityRules, &CheckParams::default());
        // s2 carries a group of the same name in another project; s4 only a
        // name that starts the same.
        assert_eq!(ids(&report), vec!["s3"]);
        assert_eq!(report.tickets.len(), 1);
        assert_eq!(report.tickets[0].title, "Server s3 has an incorrectly configured security group");
        assert!(report.tickets[0]
            .body
            .contains("Security group: ssh-open (sg1)\nRule: r1 allows 0.0.0.0/0 on ports 22-22"));
        assert!(report.tickets[0].body.contains("Contact: alpha@example.org"));
        assert_eq!(report.results.columns.len(), 12);
    }

    #[test]
    fn test_misapplied_security_rules_overrides() {
        let internal = CheckParams {
            ip_prefix: Some("10.0.0.0/8".to_string()),
            ..CheckParams::default()
        };
        assert!(run(Check::MisappliedSecurityRules, &internal).tickets.is_empty());

        let wide = CheckParams {
            min_port: Some(1),
            max_port: Some(65535),
            ..CheckParams::default()
        };
        let report = run(Check::MisappliedSecurityRules, &wide);
        assert_eq!(ids(&report), vec!["s1", "s3"]);
        assert_eq!(report.results.records()[0]["rule_id"], json!("r4"));

        let elsewhere = CheckParams {
            project_id: Some("p2".to_string()),
            ..CheckParams::default()
        };
        assert!(run(Check::MisappliedSecurityRules, &elsewhere).tickets.is_empty());
    }

    #[test]
    fn test_orphaned_floating_ips() {
        let report = run(Check::OrphanedFloatingIps, &CheckParams::default());
        assert_eq!(ids(&report), vec!["f3", "f4"]);
        assert_eq!(
            report.tickets[0].title,
            "Floating IP 203.0.113.11 belongs to missing project gone"
        );
    }

    struct Unreachable;

    impl AuxiliaryLookup for Unreachable {
        fn get(&self, _target: LookupTarget, _id: &str) -> std::result::Result<Option<Value>, osq_core::BoxError> {
            Err("identity service unavailable".into())
        }
    }

    #[test]
    fn test_orphan_check_fails_instead_of_guessing() {
        let lister = cloud();
        let err = Check::OrphanedFloatingIps
            .run(&CheckParams::default(), now(), QueryOptions::default(), &lister, &Unreachable)
            .unwrap_err();
        assert!(matches!(err, QueryError::LookupFailure { target: LookupTarget::Project, .. }));
    }

    #[test]
    fn test_runs_without_lookups() {
        let lister = cloud();
        let report = Check::UnhealthyLoadBalancers
            .run(&CheckParams::default(), now(), QueryOptions::default(), &lister, &NoLookup)
            .unwrap();
        assert!(report.tickets[0].body.contains("Project: null (p1)"));
    }
}
