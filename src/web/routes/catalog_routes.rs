use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::web::{
    AppError, AppState,
    models::alert_models::{MetricList, ResourceTypeList, RuleList},
    models::query_models::{MetricQuery, ResourceTypeQuery, RuleQuery},
};

/// Read-only views of the resource types, metrics and rules known to the
/// alert-manager.
pub fn create_catalog_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/resource_type", get(describe_resource_types_handler))
        .route("/metric", get(describe_metrics_handler))
        .route("/rule", get(describe_rules_handler))
}

async fn describe_resource_types_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ResourceTypeQuery>,
) -> Result<Json<ResourceTypeList>, AppError> {
    let list = app_state.alert_service.describe_resource_types(&query).await?;
    Ok(Json(list))
}

async fn describe_metrics_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<MetricQuery>,
) -> Result<Json<MetricList>, AppError> {
    let list = app_state.alert_service.describe_metrics(&query).await?;
    Ok(Json(list))
}

async fn describe_rules_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<RuleQuery>,
) -> Result<Json<RuleList>, AppError> {
    let list = app_state.alert_service.describe_rules(&query).await?;
    Ok(Json(list))
}
