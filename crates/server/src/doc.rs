use crate::routes::{course, health, instance};
use axum::Json;
use utoipa::OpenApi;

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        course::list_courses,
        course::get_course,
        course::create_course,
        course::delete_course,
        course::list_course_instances,
        instance::list_by_year,
        instance::list_by_term,
        instance::get_instance,
        instance::create_instance,
        instance::delete_instance
    ),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Courses", description = "Course catalog endpoints"),
        (name = "Instances", description = "Course offerings per term"),
    ),
    info(
        title = "Course Catalog API",
        version = "1.0.0",
        description = "Courses and their offerings by year and semester",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
