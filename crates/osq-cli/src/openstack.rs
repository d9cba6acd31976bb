//! # OpenStack Client
//!
//! Blocking HTTP lister and lookup against the per-service endpoints in
//! `[cloud]`. Requests carry a pre-issued token in `X-Auth-Token`; obtaining
//! that token is left to the operator (`openstack token issue`).

use std::collections::HashSet;
use std::time::Duration;

use osq_core::{BoxError, LookupTarget, ResourceType};
use osq_engine::{AuxiliaryLookup, NativeFilters, ResourceLister};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::CloudConfig;

pub struct OpenStackClient {
    http: Client,
    cloud: CloudConfig,
    token: String,
}

impl OpenStackClient {
    pub fn from_config(cloud: &CloudConfig) -> Result<Self, BoxError> {
        let token = std::env::var(&cloud.token_env)
            .map_err(|_| format!("no token: set {} (e.g. from `openstack token issue`)", cloud.token_env))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(cloud.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            cloud: cloud.clone(),
            token,
        })
    }

    /// Collection URL and the key the response wraps its records in.
    fn collection(&self, resource: ResourceType) -> (String, &'static str) {
        let url = match resource {
            ResourceType::Server => format!("{}/servers/detail", self.cloud.compute),
            ResourceType::FloatingIp => format!("{}/v2.0/floatingips", self.cloud.network),
            ResourceType::LoadBalancer => format!("{}/v2/lbaas/loadbalancers", self.cloud.load_balancer),
            ResourceType::VolumeSnapshot => format!("{}/snapshots/detail", self.cloud.block_storage),
            ResourceType::Project => format!("{}/v3/projects", self.cloud.identity),
            ResourceType::SecurityGroupRule => format!("{}/v2.0/security-group-rules", self.cloud.network),
        };
        (url, resource.plural())
    }

    fn record_url(&self, target: LookupTarget, id: &str) -> String {
        match target {
            LookupTarget::SecurityGroup => format!("{}/v2.0/security-groups/{}", self.cloud.network, id),
            LookupTarget::Project | LookupTarget::User => {
                format!("{}/v3/{}/{}", self.cloud.identity, target.plural(), id)
            }
        }
    }
}

impl ResourceLister for OpenStackClient {
    fn list(&self, resource: ResourceType, filters: &NativeFilters) -> Result<Vec<Value>, BoxError> {
        let (url, key) = self.collection(resource);
        let params = query_params(filters);
        debug!(%resource, %url, params = params.len(), "listing");

        // Next-page hrefs already carry the filters and the marker.
        collect_pages(key, &url, |page, first| {
            let request = self.http.get(page).header("X-Auth-Token", &self.token);
            let request = if first { request.query(&params) } else { request };
            Ok(request.send()?.error_for_status()?.json()?)
        })
    }
}

impl AuxiliaryLookup for OpenStackClient {
    fn get(&self, target: LookupTarget, id: &str) -> Result<Option<Value>, BoxError> {
        let url = self.record_url(target, id);
        debug!(%target, %id, "lookup");

        let response = self.http.get(&url).header("X-Auth-Token", &self.token).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let mut body: Value = response.error_for_status()?.json()?;
        Ok(body.get_mut(target.name()).map(Value::take))
    }
}

/// Fetch `first` and every page linked from it, concatenating the `key`
/// lists. `fetch` is told whether it is requesting the first page.
fn collect_pages(
    key: &str,
    first: &str,
    mut fetch: impl FnMut(&str, bool) -> Result<Value, BoxError>,
) -> Result<Vec<Value>, BoxError> {
    let mut records = Vec::new();
    let mut visited = HashSet::new();
    let mut url = first.to_string();
    loop {
        let mut body = fetch(&url, visited.is_empty())?;
        let page = match body.get_mut(key).map(Value::take) {
            Some(Value::Array(page)) => page,
            _ => return Err(format!("response from {} has no '{}' list", url, key).into()),
        };
        let exhausted = page.is_empty();
        records.extend(page);
        visited.insert(url);
        match next_link(&body, key) {
            Some(next) if !exhausted && !visited.contains(&next) => {
                debug!(%next, listed = records.len(), "following next page");
                url = next;
            }
            _ => break,
        }
    }
    Ok(records)
}

/// The `rel=next` href in `<key>_links` (compute, block storage, network,
/// load balancer) or `links.next` (identity).
fn next_link(body: &Value, key: &str) -> Option<String> {
    if let Some(Value::Array(links)) = body.get(format!("{}_links", key).as_str()) {
        return links
            .iter()
            .find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))
            .and_then(|link| link.get("href"))
            .and_then(Value::as_str)
            .map(str::to_string);
    }
    body.get("links")
        .and_then(|links| links.get("next"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Native filters as query parameters. Arrays repeat the parameter, null
/// drops it.
pub fn query_params(filters: &NativeFilters) -> Vec<(String, String)> {
    let mut params = Vec::new();
    for (key, value) in filters {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = param_text(item) {
                        params.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = param_text(other) {
                    params.push((key.clone(), text));
                }
            }
        }
    }
    params
}

fn param_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(raw: Value) -> NativeFilters {
        match raw {
            Value::Object(map) => map,
            _ => panic!("filters must be an object"),
        }
    }

    #[test]
    fn test_query_params_scalars_and_lists() {
        let params = query_params(&filters(json!({
            "status": "ACTIVE",
            "all_tenants": true,
            "id": ["a", "b"],
            "limit": 50,
            "marker": null,
        })));
        assert_eq!(
            params,
            vec![
                ("status".to_string(), "ACTIVE".to_string()),
                ("all_tenants".to_string(), "true".to_string()),
                ("id".to_string(), "a".to_string()),
                ("id".to_string(), "b".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_filters_list_everything() {
        assert!(query_params(&NativeFilters::new()).is_empty());
    }

    #[test]
    fn test_follows_next_links_across_pages() {
        let base = "http://nova/v2.1/servers/detail";
        let next = "http://nova/v2.1/servers/detail?all_tenants=true&marker=s2";
        let mut requests = Vec::new();
        let records = collect_pages("servers", base, |url, first| {
            requests.push((url.to_string(), first));
            Ok(if url == base {
                json!({
                    "servers": [{"id": "s1"}, {"id": "s2"}],
                    "servers_links": [{"rel": "next", "href": next}]
                })
            } else {
                json!({"servers": [{"id": "s3"}]})
            })
        })
        .unwrap();
        let ids: Vec<&str> = records.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
        assert_eq!(requests, vec![(base.to_string(), true), (next.to_string(), false)]);
    }

    #[test]
    fn test_identity_links_and_loops_stop() {
        let body = json!({"projects": [], "links": {"self": "x", "next": "http://ks/v3/projects?marker=p9"}});
        assert_eq!(next_link(&body, "projects").as_deref(), Some("http://ks/v3/projects?marker=p9"));
        assert_eq!(next_link(&json!({"links": {"next": null}}), "projects"), None);

        let mut calls = 0;
        let records = collect_pages("floatingips", "http://neutron/fips", |_, _| {
            calls += 1;
            Ok(json!({
                "floatingips": [{"id": "f1"}],
                "floatingips_links": [{"rel": "next", "href": "http://neutron/fips"}]
            }))
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(records.len(), 1);

        assert!(collect_pages("servers", "http://nova", |_, _| Ok(json!({"error": "x"}))).is_err());
    }

    #[test]
    fn test_collection_urls() {
        let client = OpenStackClient {
            http: Client::new(),
            cloud: CloudConfig::default(),
            token: "t".into(),
        };
        let (url, key) = client.collection(ResourceType::FloatingIp);
        assert_eq!(url, "http://127.0.0.1:9696/v2.0/floatingips");
        assert_eq!(key, "floatingips");
        let (url, key) = client.collection(ResourceType::VolumeSnapshot);
        assert_eq!(url, "http://127.0.0.1:8776/v3/snapshots/detail");
        assert_eq!(key, "snapshots");
        assert_eq!(
            client.record_url(LookupTarget::User, "u1"),
            "http://127.0.0.1:5000/v3/users/u1"
        );
        assert_eq!(
            client.record_url(LookupTarget::SecurityGroup, "sg1"),
            "http://127.0.0.1:9696/v2.0/security-groups/sg1"
        );
        let (url, key) = client.collection(ResourceType::SecurityGroupRule);
        assert_eq!(url, "http://127.0.0.1:9696/v2.0/security-group-rules");
        assert_eq!(key, "security_group_rules");
    }
}
