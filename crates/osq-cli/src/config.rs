//! `osq.toml`. Every section and field has a default; a missing file is the
//! default configuration.

use std::path::Path;

use osq_engine::QueryOptions;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub cloud: CloudConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub tickets: TicketConfig,
}

impl Config {
    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("invalid config {}: {}", path.display(), e))
    }
}

// =============================================================================
// [cloud]
// =============================================================================

/// Per-service endpoints. The token is pre-issued and read from the
/// environment variable named by `token_env`.
#[derive(Debug, Deserialize, Clone)]
pub struct CloudConfig {
    #[serde(default = "default_compute")]
    pub compute: String,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_load_balancer")]
    pub load_balancer: String,
    #[serde(default = "default_block_storage")]
    pub block_storage: String,
    #[serde(default = "default_identity")]
    pub identity: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            compute: default_compute(),
            network: default_network(),
            load_balancer: default_load_balancer(),
            block_storage: default_block_storage(),
            identity: default_identity(),
            token_env: default_token_env(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// [query]
// =============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    #[serde(default = "default_true")]
    pub client_side_recheck: bool,
    #[serde(default = "default_true")]
    pub server_side: bool,
    #[serde(default)]
    pub pretty: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            client_side_recheck: true,
            server_side: true,
            pretty: false,
        }
    }
}

impl QueryConfig {
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            client_side_recheck: self.client_side_recheck,
            server_side: self.server_side,
        }
    }
}

// =============================================================================
// [tickets]
// =============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct TicketConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_service_desk_id")]
    pub service_desk_id: String,
    #[serde(default = "default_request_type_id")]
    pub request_type_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            service_desk_id: default_service_desk_id(),
            request_type_id: default_request_type_id(),
            email: String::new(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_compute() -> String {
    "http://127.0.0.1:8774/v2.1".into()
}
fn default_network() -> String {
    "http://127.0.0.1:9696".into()
}
fn default_load_balancer() -> String {
    "http://127.0.0.1:9876".into()
}
fn default_block_storage() -> String {
    "http://127.0.0.1:8776/v3".into()
}
fn default_identity() -> String {
    "http://127.0.0.1:5000".into()
}
fn default_token_env() -> String {
    "OS_TOKEN".into()
}
fn default_timeout() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_service_desk_id() -> String {
    "1".into()
}
fn default_request_type_id() -> String {
    "1".into()
}
fn default_api_key_env() -> String {
    "OSQ_SERVICE_DESK_KEY".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cloud.token_env, "OS_TOKEN");
        assert_eq!(config.cloud.timeout_secs, 60);
        assert!(config.query.client_side_recheck);
        assert!(!config.query.pretty);
        assert!(config.tickets.base_url.is_empty());
    }

    #[test]
    fn test_partial_sections_keep_field_defaults() {
        let config: Config = toml::from_str(
            r#"
            [cloud]
            compute = "https://nova.example.org/v2.1"

            [query]
            pretty = true

            [tickets]
            base_url = "https://desk.example.org"
            email = "ops@example.org"
            "#,
        )
        .unwrap();
        assert_eq!(config.cloud.compute, "https://nova.example.org/v2.1");
        assert_eq!(config.cloud.identity, default_identity());
        assert!(config.query.pretty);
        assert!(config.query.server_side);
        assert_eq!(config.tickets.email, "ops@example.org");
        assert_eq!(config.tickets.api_key_env, "OSQ_SERVICE_DESK_KEY");
    }

    #[test]
    fn test_query_options_follow_config() {
        let config: Config = toml::from_str("[query]\nclient_side_recheck = false\n").unwrap();
        let options = config.query.options();
        assert!(!options.client_side_recheck);
        assert!(options.server_side);
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let config = Config::load(Path::new("/nonexistent/osq.toml")).unwrap();
        assert_eq!(config.cloud.network, default_network());
    }
}
