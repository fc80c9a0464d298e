use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::get,
};

use crate::web::{
    AppError, AppState,
    models::alert_models::{CommentList, CreateCommentRequest, CreateCommentResponse},
    models::query_models::CommentQuery,
};

pub fn create_comment_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/comment",
        get(describe_comments_handler).post(create_comment_handler),
    )
}

async fn describe_comments_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<CommentQuery>,
) -> Result<Json<CommentList>, AppError> {
    let list = app_state.alert_service.describe_comments(&query).await?;
    Ok(Json(list))
}

async fn create_comment_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<Json<CreateCommentResponse>, AppError> {
    let Json(payload) = payload?;
    let created = app_state.alert_service.create_comment(payload).await?;
    Ok(Json(created))
}
