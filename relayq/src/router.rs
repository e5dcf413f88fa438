//! HTTP router wiring the queue engine's handlers

use std::sync::Arc;

use axum::{
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use relayq_engine::{handlers, QueueEngine};

/// Build the application router around a shared engine.
pub fn create_router(engine: Arc<QueueEngine>) -> Router {
    Router::new()
        // Admin surface under a reserved prefix so it cannot collide with
        // ordinary keys
        .route("/_relayq/health", get(health_check))
        .route("/_relayq/stats/{*key}", get(handlers::handle_stats))
        // Every other path names a queue key, the bare root being the empty key
        .route("/", any(handlers::handle_root))
        .route("/{*key}", any(handlers::handle_key))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "running" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(Arc::new(QueueEngine::new()))
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get_round_trips() {
        let app = app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/jobs?v=build")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_string(response).await, r#"{"queued":1}"#);

        let response = app
            .oneshot(Request::builder().uri("/jobs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "build");
    }

    #[tokio::test]
    async fn test_url_encoded_values_are_decoded() {
        let app = app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/jobs?v=hello%20world")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(Request::builder().uri("/jobs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "hello world");
    }

    #[tokio::test]
    async fn test_keys_may_contain_slashes() {
        let app = app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/tenant/42/jobs?v=x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // A sibling path is a different key
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/tenant/43/jobs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tenant/42/jobs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "x");
    }

    #[tokio::test]
    async fn test_get_miss_returns_not_found() {
        let response = app()
            .oneshot(Request::builder().uri("/empty").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_without_value_is_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/jobs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_to_root_is_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/?v=x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_is_method_not_allowed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs?v=x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/_relayq/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("running"));
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let engine = Arc::new(QueueEngine::new());
        engine.enqueue("jobs", "a".into());
        let app = create_router(engine);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/_relayq/stats/jobs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"depth":1,"waiting":0}"#);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let response = app()
            .oneshot(Request::builder().uri("/jobs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
