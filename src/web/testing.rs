use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use tower::ServiceExt;

use crate::clients::fake::FakeAlertManager;

pub fn router_with(fake: Arc<FakeAlertManager>) -> Router {
    super::create_axum_router(fake, None)
}

/// Sends one request and returns the status with the body parsed as JSON
/// (`Null` when the body is not JSON).
pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/merge-patch+json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (
        status,
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null),
    )
}

#[tokio::test]
async fn test_health_check() {
    let router = router_with(Arc::new(FakeAlertManager::new()));
    let response = router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_catalog_and_comments() {
    let fake = Arc::new(FakeAlertManager::new());
    let base = "/kapis/alerting.kubesphere.io/v1alpha2";

    let (status, json) = send(
        router_with(fake.clone()),
        Method::GET,
        &format!("{base}/resource_type?rs_type_names=pod,node"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);

    let (status, json) = send(router_with(fake.clone()), Method::GET, &format!("{base}/metric"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["metric_set"][0]["metric_name"], "cpu_utilisation");

    let (status, json) = send(
        router_with(fake.clone()),
        Method::POST,
        &format!("{base}/comment"),
        Some(serde_json::json!({"addresser": "admin", "content": "ack", "history_id": "hs-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["comment_id"], "cm-new");

    let (status, _) = send(router_with(fake.clone()), Method::GET, &format!("{base}/rule?disables=true"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        fake.calls(),
        vec!["DescribeResourceTypes", "DescribeMetrics", "CreateComment", "DescribeRules"]
    );
}
