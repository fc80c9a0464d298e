//! The resource hierarchy an alerting route is scoped to.
//!
//! Every alert, status and history route exists once per scope. The scope
//! decides which resource type the call targets and which path parameters
//! narrow it down; both are packed into the opaque `resource_search` JSON the
//! alert-manager's custom endpoints interpret.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Missing path parameter `{0}`")]
    MissingPathParam(&'static str),
    #[error("Path parameter `{param}` is not a valid name: {value}")]
    InvalidPathParam { param: &'static str, value: String },
    #[error("rs_filter_param is not a JSON object: {0}")]
    InvalidFilterParam(String),
    #[error("Resource filter targets {key}={actual}, but the request path is scoped to {key}={expected}")]
    UriMismatch {
        key: &'static str,
        expected: String,
        actual: String,
    },
}

/// Kubernetes object names such as namespaces are DNS-1123 labels: at most 63
/// lowercase alphanumerics or `-`, starting and ending alphanumeric.
pub fn is_dns1123_label(value: &str) -> bool {
    let bytes = value.as_bytes();
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= 63
                && alnum(first)
                && alnum(last)
                && bytes.iter().all(|b| alnum(b) || *b == b'-')
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceScope {
    Cluster,
    Nodes,
    Workspaces,
    Workspace,
    Namespaces,
    Namespace,
    Workloads,
    NamespacePods,
    NamespacePodContainers,
    NodePods,
    NodePodContainers,
}

/// (path parameter, resource_search key)
type PathKey = (&'static str, &'static str);

const WORKSPACE: PathKey = ("workspace", "ws_name");
const NAMESPACE: PathKey = ("namespace", "ns_name");
const NODE: PathKey = ("node", "node_id");
const POD: PathKey = ("pod", "pod_name");

impl ResourceScope {
    pub const ALL: [ResourceScope; 11] = [
        ResourceScope::Cluster,
        ResourceScope::Nodes,
        ResourceScope::Workspaces,
        ResourceScope::Workspace,
        ResourceScope::Namespaces,
        ResourceScope::Namespace,
        ResourceScope::Workloads,
        ResourceScope::NamespacePods,
        ResourceScope::NamespacePodContainers,
        ResourceScope::NodePods,
        ResourceScope::NodePodContainers,
    ];

    pub fn path_prefix(&self) -> &'static str {
        match self {
            Self::Cluster => "/clusters",
            Self::Nodes => "/nodes",
            Self::Workspaces => "/workspaces",
            Self::Workspace => "/workspaces/{workspace}",
            Self::Namespaces => "/namespaces",
            Self::Namespace => "/namespaces/{namespace}",
            Self::Workloads => "/namespaces/{namespace}/workloads",
            Self::NamespacePods => "/namespaces/{namespace}/pods",
            Self::NamespacePodContainers => "/namespaces/{namespace}/pods/{pod}/containers",
            Self::NodePods => "/nodes/{node}/pods",
            Self::NodePodContainers => "/nodes/{node}/pods/{pod}/containers",
        }
    }

    pub fn rs_type_name(&self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Nodes => "node",
            Self::Workspaces | Self::Workspace => "workspace",
            Self::Namespaces | Self::Namespace => "namespace",
            Self::Workloads => "workload",
            Self::NamespacePods | Self::NodePods => "pod",
            Self::NamespacePodContainers | Self::NodePodContainers => "container",
        }
    }

    fn path_keys(&self) -> &'static [PathKey] {
        match self {
            Self::Cluster | Self::Nodes | Self::Workspaces | Self::Namespaces => &[],
            Self::Workspace => &[WORKSPACE],
            Self::Namespace | Self::Workloads | Self::NamespacePods => &[NAMESPACE],
            Self::NamespacePodContainers => &[NAMESPACE, POD],
            Self::NodePods => &[NODE],
            Self::NodePodContainers => &[NODE, POD],
        }
    }

    fn search_map(
        &self,
        path_params: &HashMap<String, String>,
    ) -> Result<BTreeMap<&'static str, String>, ScopeError> {
        let mut map = BTreeMap::new();
        map.insert("rs_type_name", self.rs_type_name().to_string());
        for &(param, key) in self.path_keys() {
            let value = path_params
                .get(param)
                .filter(|value| !value.is_empty())
                .ok_or(ScopeError::MissingPathParam(param))?;
            map.insert(key, value.clone());
        }
        Ok(map)
    }

    /// JSON-encoded filter naming the hierarchy level and its path parameters,
    /// e.g. `{"ns_name":"demo","pod_name":"web-0","rs_type_name":"container"}`.
    pub fn resource_search(
        &self,
        path_params: &HashMap<String, String>,
    ) -> Result<String, ScopeError> {
        let map = self.search_map(path_params)?;
        // A map of strings always serializes.
        Ok(serde_json::to_string(&map).unwrap_or_default())
    }

    /// Checks that a resource filter does not reach outside the request path:
    /// every hierarchy key the filter names must equal the path parameter.
    pub fn check_filter_uri(
        &self,
        path_params: &HashMap<String, String>,
        rs_filter_param: &str,
    ) -> Result<(), ScopeError> {
        if rs_filter_param.trim().is_empty() {
            return Ok(());
        }
        let value: serde_json::Value = serde_json::from_str(rs_filter_param)
            .map_err(|e| ScopeError::InvalidFilterParam(e.to_string()))?;
        let filter = value
            .as_object()
            .ok_or_else(|| ScopeError::InvalidFilterParam(rs_filter_param.to_string()))?;

        let expected = self.search_map(path_params)?;
        for &(_, key) in self.path_keys() {
            let Some(actual) = filter.get(key) else {
                continue;
            };
            let actual = match actual {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let wanted = &expected[key];
            if &actual != wanted {
                return Err(ScopeError::UriMismatch {
                    key,
                    expected: wanted.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }
}
