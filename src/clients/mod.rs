pub mod alert_manager;
#[cfg(test)]
pub mod fake;
pub mod kubernetes;

pub use alert_manager::{AlertManagerApi, ClientError, GrpcAlertManager};
pub use kubernetes::{KubeClientConfig, KubeError, KubeRestClient, ResourceKind, ResourceLister};
