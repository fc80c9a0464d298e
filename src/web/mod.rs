use std::sync::Arc;

use axum::{Router, http::Method, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::alerting::service::AlertService;
use crate::clients::{AlertManagerApi, ResourceLister};
use crate::version::{API_GROUP, API_VERSION};
use crate::web::routes::*;

pub mod error;
pub mod models;
pub mod routes;
#[cfg(test)]
pub(crate) mod testing;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub alert_service: Arc<AlertService>,
    /// Absent when the gateway runs outside a cluster without an API server URL.
    pub resource_lister: Option<Arc<dyn ResourceLister>>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn api_base_path() -> String {
    format!("/kapis/{API_GROUP}/{API_VERSION}")
}

pub fn create_axum_router(
    alert_manager: Arc<dyn AlertManagerApi>,
    resource_lister: Option<Arc<dyn ResourceLister>>,
) -> Router {
    let app_state = Arc::new(AppState {
        alert_service: Arc::new(AlertService::new(alert_manager)),
        resource_lister,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let api = Router::new()
        .merge(catalog_routes::create_catalog_router())
        .merge(comment_routes::create_comment_router())
        .merge(alert_routes::create_alert_router())
        .merge(resource_routes::create_resource_router());

    Router::new()
        .route("/healthz", get(health_check_handler))
        .nest(&api_base_path(), api)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
