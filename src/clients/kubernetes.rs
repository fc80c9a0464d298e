use std::fmt;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const SERVICE_ACCOUNT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
pub const SERVICE_ACCOUNT_CA_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

#[derive(Error, Debug)]
pub enum KubeError {
    #[error("Kubernetes client is not configured")]
    NotConfigured,
    #[error("Invalid Kubernetes API server URL `{0}`")]
    InvalidUrl(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Kubernetes request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Kubernetes API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Node,
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl ResourceKind {
    pub const WORKLOADS: [ResourceKind; 3] = [
        ResourceKind::Deployment,
        ResourceKind::StatefulSet,
        ResourceKind::DaemonSet,
    ];

    pub fn parse(kind: &str) -> Option<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "node" | "nodes" => Some(Self::Node),
            "deployment" | "deployments" => Some(Self::Deployment),
            "statefulset" | "statefulsets" => Some(Self::StatefulSet),
            "daemonset" | "daemonsets" => Some(Self::DaemonSet),
            _ => None,
        }
    }

    /// Path segments of the collection on the API server. Nodes are cluster
    /// scoped, the workloads live under a namespace.
    pub fn collection_segments<'a>(&self, namespace: &'a str) -> Vec<&'a str> {
        let workloads = |plural: &'a str| vec!["apis", "apps", "v1", "namespaces", namespace, plural];
        match self {
            Self::Node => vec!["api", "v1", "nodes"],
            Self::Deployment => workloads("deployments"),
            Self::StatefulSet => workloads("statefulsets"),
            Self::DaemonSet => workloads("daemonsets"),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Node => "node",
            Self::Deployment => "deployment",
            Self::StatefulSet => "statefulset",
            Self::DaemonSet => "daemonset",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeResource {
    pub kind: ResourceKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[async_trait]
pub trait ResourceLister: Send + Sync {
    /// Lists resources of `kind` matching a `k=v,...` label selector. An empty
    /// selector lists everything; `namespace` is ignored for nodes.
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<KubeResource>, KubeError>;
}

#[derive(Debug, Clone)]
pub struct KubeClientConfig {
    pub api_url: String,
    pub token_path: String,
    pub ca_path: String,
}

#[derive(Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<Object>,
}

#[derive(Deserialize)]
struct Object {
    metadata: ObjectMeta,
}

#[derive(Deserialize)]
struct ObjectMeta {
    name: String,
    namespace: Option<String>,
}

/// Read-only REST client for the handful of list calls the gateway needs.
pub struct KubeRestClient {
    http: reqwest::Client,
    api_url: Url,
    config: KubeClientConfig,
}

impl KubeRestClient {
    pub async fn new(config: KubeClientConfig) -> Result<Self, KubeError> {
        let api_url = Url::parse(&config.api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| KubeError::InvalidUrl(config.api_url.clone()))?;

        let mut builder = reqwest::Client::builder();
        match tokio::fs::read(&config.ca_path).await {
            Ok(pem) => {
                builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %config.ca_path, "No cluster CA bundle found; using system roots.");
            }
            Err(source) => {
                return Err(KubeError::Io {
                    path: config.ca_path.clone(),
                    source,
                });
            }
        }
        Ok(Self {
            http: builder.build()?,
            api_url,
            config,
        })
    }

    /// Each segment is percent-encoded on its own, so a namespace can never
    /// add path segments or a query to the request.
    fn collection_url(&self, kind: ResourceKind, namespace: &str) -> Result<Url, KubeError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| KubeError::InvalidUrl(self.config.api_url.clone()))?
            .pop_if_empty()
            .extend(kind.collection_segments(namespace));
        Ok(url)
    }

    /// Service-account tokens are rotated on disk, so the file is read per request.
    async fn bearer_token(&self) -> Result<Option<String>, KubeError> {
        match tokio::fs::read_to_string(&self.config.token_path).await {
            Ok(token) => Ok(Some(token.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(KubeError::Io {
                path: self.config.token_path.clone(),
                source,
            }),
        }
    }
}

#[async_trait]
impl ResourceLister for KubeRestClient {
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<KubeResource>, KubeError> {
        let url = self.collection_url(kind, namespace)?;
        let mut request = self.http.get(url.clone());
        if !label_selector.is_empty() {
            request = request.query(&[("labelSelector", label_selector)]);
        }
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        debug!(%url, %kind, label_selector, "Listing Kubernetes resources.");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KubeError::Api { status, body });
        }

        let list: ObjectList = response.json().await?;
        Ok(list
            .items
            .into_iter()
            .map(|object| KubeResource {
                kind,
                name: object.metadata.name,
                namespace: object.metadata.namespace,
            })
            .collect())
    }
}
