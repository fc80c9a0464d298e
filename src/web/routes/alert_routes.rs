use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State, rejection::JsonRejection},
    routing::{get, patch},
};

use crate::alerting::ResourceScope;
use crate::utils::params::split_list;
use crate::web::{
    AppError, AppState,
    models::alert_models::{
        AlertDetailList, AlertStatusList, CreateAlertRequest, CreateAlertResponse,
        DeleteAlertsResponse, HistoryDetailList, ModifyAlertRequest, ModifyAlertResponse,
        ModifyPolicyRequest, ModifyPolicyResponse,
    },
    models::query_models::{
        AlertDetailQuery, AlertNameQuery, AlertNamesQuery, AlertStatusQuery, HistoryQuery,
    },
};

/// The alert, alert_status, policy and history routes of every scope.
pub fn create_alert_router() -> Router<Arc<AppState>> {
    ResourceScope::ALL
        .into_iter()
        .fold(Router::new(), |router, scope| router.merge(scoped_router(scope)))
}

fn scoped_router(scope: ResourceScope) -> Router<Arc<AppState>> {
    let prefix = scope.path_prefix();
    Router::new()
        .route(
            &format!("{prefix}/alert"),
            get(describe_alerts_handler)
                .post(create_alert_handler)
                .patch(modify_alert_handler)
                .delete(delete_alerts_handler),
        )
        .route(&format!("{prefix}/alert_status"), get(describe_alert_status_handler))
        .route(&format!("{prefix}/policy"), patch(modify_policy_handler))
        .route(&format!("{prefix}/history"), get(describe_history_handler))
        .route_layer(Extension(scope))
}

async fn describe_alerts_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(scope): Extension<ResourceScope>,
    Path(path_params): Path<HashMap<String, String>>,
    Query(query): Query<AlertDetailQuery>,
) -> Result<Json<AlertDetailList>, AppError> {
    let list = app_state
        .alert_service
        .describe_alert_details(scope, &path_params, &query)
        .await?;
    Ok(Json(list))
}

async fn create_alert_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(scope): Extension<ResourceScope>,
    Path(path_params): Path<HashMap<String, String>>,
    payload: Result<Json<CreateAlertRequest>, JsonRejection>,
) -> Result<Json<CreateAlertResponse>, AppError> {
    let Json(payload) = payload?;
    let created = app_state
        .alert_service
        .create_alert_info(scope, &path_params, payload)
        .await?;
    Ok(Json(created))
}

async fn modify_alert_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(scope): Extension<ResourceScope>,
    Path(path_params): Path<HashMap<String, String>>,
    Query(query): Query<AlertNameQuery>,
    payload: Result<Json<ModifyAlertRequest>, JsonRejection>,
) -> Result<Json<ModifyAlertResponse>, AppError> {
    let Json(payload) = payload?;
    let modified = app_state
        .alert_service
        .modify_alert_by_name(scope, &path_params, &query.alert_name, payload)
        .await?;
    Ok(Json(modified))
}

async fn delete_alerts_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(scope): Extension<ResourceScope>,
    Path(path_params): Path<HashMap<String, String>>,
    Query(query): Query<AlertNamesQuery>,
) -> Result<Json<DeleteAlertsResponse>, AppError> {
    let alert_names = split_list(&query.alert_names);
    let deleted = app_state
        .alert_service
        .delete_alerts_by_name(scope, &path_params, &alert_names)
        .await?;
    Ok(Json(deleted))
}

async fn describe_alert_status_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(scope): Extension<ResourceScope>,
    Path(path_params): Path<HashMap<String, String>>,
    Query(query): Query<AlertStatusQuery>,
) -> Result<Json<AlertStatusList>, AppError> {
    let list = app_state
        .alert_service
        .describe_alert_status(scope, &path_params, &query)
        .await?;
    Ok(Json(list))
}

async fn modify_policy_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(scope): Extension<ResourceScope>,
    Path(path_params): Path<HashMap<String, String>>,
    Query(query): Query<AlertNameQuery>,
    payload: Result<Json<ModifyPolicyRequest>, JsonRejection>,
) -> Result<Json<ModifyPolicyResponse>, AppError> {
    let Json(payload) = payload?;
    let modified = app_state
        .alert_service
        .modify_policy_by_alert(scope, &path_params, &query.alert_name, payload)
        .await?;
    Ok(Json(modified))
}

async fn describe_history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(scope): Extension<ResourceScope>,
    Path(path_params): Path<HashMap<String, String>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryDetailList>, AppError> {
    let list = app_state
        .alert_service
        .describe_history_detail(scope, &path_params, &query)
        .await?;
    Ok(Json(list))
}
