use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    routing::get,
};

use crate::alerting::{ResourceScope, service};
use crate::web::{
    AppError, AppState, models::alert_models::ResourceList, models::query_models::ResourceQuery,
};

/// Kubernetes objects selectable by node and workload alerts.
pub fn create_resource_router() -> Router<Arc<AppState>> {
    [ResourceScope::Nodes, ResourceScope::Workloads]
        .into_iter()
        .fold(Router::new(), |router, scope| {
            router.merge(
                Router::new()
                    .route(
                        &format!("{}/resource", scope.path_prefix()),
                        get(describe_resources_handler),
                    )
                    .route_layer(Extension(scope)),
            )
        })
}

async fn describe_resources_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(scope): Extension<ResourceScope>,
    Path(path_params): Path<HashMap<String, String>>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<ResourceList>, AppError> {
    let list = service::describe_resources(
        app_state.resource_lister.as_deref(),
        scope,
        &path_params,
        &query,
    )
    .await?;
    Ok(Json(list))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};

    use crate::clients::fake::FakeAlertManager;
    use crate::web::testing::{router_with, send};

    #[tokio::test]
    async fn test_resources_without_kubernetes() {
        let (status, json) = send(
            router_with(Arc::new(FakeAlertManager::new())),
            Method::GET,
            "/kapis/alerting.kubesphere.io/v1alpha2/nodes/resource",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn test_unknown_kind_is_bad_request() {
        let (status, _) = send(
            router_with(Arc::new(FakeAlertManager::new())),
            Method::GET,
            "/kapis/alerting.kubesphere.io/v1alpha2/namespaces/demo/workloads/resource?kind=cronjob",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_namespace_must_be_a_label() {
        for namespace in [
            "..%2F..%2Fapi%2Fv1%2Fnamespaces%2Fkube-system%2Fsecrets%3F",
            "demo%3Fwatch=true",
            "..",
        ] {
            let (status, json) = send(
                router_with(Arc::new(FakeAlertManager::new())),
                Method::GET,
                &format!(
                    "/kapis/alerting.kubesphere.io/v1alpha2/namespaces/{namespace}/workloads/resource?kind=deployment"
                ),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{namespace}");
            assert!(json["error"].as_str().unwrap().contains("namespace"));
        }
    }
}
