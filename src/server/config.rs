use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::clients::alert_manager::DEFAULT_ENDPOINT;
use crate::clients::kubernetes::{
    KubeClientConfig, SERVICE_ACCOUNT_CA_PATH, SERVICE_ACCOUNT_TOKEN_PATH,
};

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_alert_manager_endpoint")]
    pub alert_manager_endpoint: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// `None` disables the resource listing routes.
    #[serde(default)]
    pub kubernetes_api_url: Option<String>,

    #[serde(default = "default_kubernetes_token_path")]
    pub kubernetes_token_path: String,

    #[serde(default = "default_kubernetes_ca_path")]
    pub kubernetes_ca_path: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Low 16 bits of the generated IDs; distinct per replica.
    #[serde(default)]
    pub machine_id: u16,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    alert_manager_endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
    kubernetes_api_url: Option<String>,
    kubernetes_token_path: Option<String>,
    kubernetes_ca_path: Option<String>,
    log_dir: Option<String>,
    machine_id: Option<u16>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_alert_manager_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_kubernetes_token_path() -> String {
    SERVICE_ACCOUNT_TOKEN_PATH.to_string()
}

fn default_kubernetes_ca_path() -> String {
    SERVICE_ACCOUNT_CA_PATH.to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn in_cluster_api_url() -> Option<String> {
    let host = env::var("KUBERNETES_SERVICE_HOST").ok()?;
    let port = env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());
    Some(format!("https://{host}:{port}"))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::merge(PartialServerConfig::default(), PartialServerConfig::default(), None)
    }
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        let config = Self::merge(env_config, file_config, in_cluster_api_url());
        if config.request_timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be greater than zero".to_string());
        }
        Ok(config)
    }

    fn merge(
        env_config: PartialServerConfig,
        file_config: PartialServerConfig,
        in_cluster_api_url: Option<String>,
    ) -> Self {
        ServerConfig {
            listen_addr: env_config.listen_addr.or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            alert_manager_endpoint: env_config.alert_manager_endpoint.or(file_config.alert_manager_endpoint)
                .unwrap_or_else(default_alert_manager_endpoint),
            request_timeout_secs: env_config.request_timeout_secs.or(file_config.request_timeout_secs)
                .unwrap_or_else(default_request_timeout_secs),
            kubernetes_api_url: env_config.kubernetes_api_url.or(file_config.kubernetes_api_url)
                .or(in_cluster_api_url)
                .filter(|url| !url.is_empty()),
            kubernetes_token_path: env_config.kubernetes_token_path.or(file_config.kubernetes_token_path)
                .unwrap_or_else(default_kubernetes_token_path),
            kubernetes_ca_path: env_config.kubernetes_ca_path.or(file_config.kubernetes_ca_path)
                .unwrap_or_else(default_kubernetes_ca_path),
            log_dir: env_config.log_dir.or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            machine_id: env_config.machine_id.or(file_config.machine_id)
                .unwrap_or_default(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn kube_client_config(&self) -> Option<KubeClientConfig> {
        self.kubernetes_api_url.as_ref().map(|api_url| KubeClientConfig {
            api_url: api_url.clone(),
            token_path: self.kubernetes_token_path.clone(),
            ca_path: self.kubernetes_ca_path.clone(),
        })
    }
}
