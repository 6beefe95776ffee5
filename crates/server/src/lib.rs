pub mod doc;
pub mod dtos;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use axum::{
    Router,
    routing::{get, post},
};
use routes::{course, health, instance};
use state::AppState;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

pub use error::ApiError;

/// Builds the `/api` router over the given store
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/openapi.json", get(doc::openapi))
        .route(
            "/courses",
            get(course::list_courses).post(course::create_course),
        )
        .route(
            "/courses/{course_id}",
            get(course::get_course).delete(course::delete_course),
        )
        .route(
            "/courses/{course_id}/instances",
            get(course::list_course_instances),
        )
        .route("/instances", post(instance::create_instance))
        .route("/instances/{year}", get(instance::list_by_year))
        .route("/instances/{year}/{semester}", get(instance::list_by_term))
        .route(
            "/instances/{year}/{semester}/{course_id}",
            get(instance::get_instance).delete(instance::delete_instance),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
}

/// Serves the app on an already bound listener until the task is dropped
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(AppState::new())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_and_fetch_course() {
        let state = AppState::new();
        let course = json!({
            "title": "Intro to Computing",
            "courseId": "CS 101",
            "description": "Basics of programming.",
            "prerequisites": []
        });

        let (status, body) = call(app(state.clone()), post_json("/api/courses", course.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["courseId"], json!("CS 101"));

        let (status, body) = call(app(state.clone()), post_json("/api/courses", course)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], json!("Course CS 101 already exists"));

        let request = Request::get("/api/courses/CS%20101").body(Body::empty()).unwrap();
        let (status, body) = call(app(state), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], json!("Intro to Computing"));
    }

    #[tokio::test]
    async fn test_invalid_course_is_bad_request() {
        let course = json!({
            "title": "Tiny",
            "courseId": "CS101",
            "description": "Basics of programming."
        });

        let (status, body) = call(app(AppState::new()), post_json("/api/courses", course)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("at least 5 characters"));
    }

    #[tokio::test]
    async fn test_instance_for_unknown_course_is_bad_request() {
        let instance = json!({ "courseId": "CS101", "year": 2024, "semester": 1 });

        let (status, body) = call(app(AppState::new()), post_json("/api/instances", instance)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("Course CS101 does not exist"));
    }

    #[tokio::test]
    async fn test_missing_instance_is_not_found() {
        let request = Request::get("/api/instances/2024/1/CS101")
            .body(Body::empty())
            .unwrap();

        let (status, body) = call(app(AppState::new()), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], json!("Course instance not found"));
    }

    #[tokio::test]
    async fn test_openapi_lists_paths() {
        let request = Request::get("/api/openapi.json").body(Body::empty()).unwrap();

        let (status, body) = call(app(AppState::new()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/courses/{course_id}"].is_object());
    }
}
