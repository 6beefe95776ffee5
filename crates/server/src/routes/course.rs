use super::{path_course_id, reject_body};
use crate::{
    dtos::{MessageResponse, instance::InstanceResponse},
    error::ApiError,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use log::info;
use models::{Course, CourseForm};

/// List every course
#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "All courses", body = [Course])
    ),
    tag = "Courses"
)]
pub async fn list_courses(State(state): State<AppState>) -> Json<Vec<Course>> {
    Json(state.read().await.courses().to_vec())
}

/// Get a course by its code
#[utoipa::path(
    get,
    path = "/api/courses/{course_id}",
    params(
        ("course_id" = String, Path, description = "Course code, e.g. CS 101")
    ),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Course>, ApiError> {
    let course_id = path_course_id(&course_id);

    state
        .read()
        .await
        .course(&course_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Course {course_id} not found")))
}

/// Create a course
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseForm,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid course", body = crate::dtos::ErrorResponse),
        (status = 409, description = "Course already exists", body = crate::dtos::ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    payload: Result<Json<CourseForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let Json(form) = payload.map_err(reject_body)?;
    let new_course = form.into_new_course()?;

    let course = state.write().await.insert_course(new_course)?;
    info!("Created course {}", course.course_id);

    Ok((StatusCode::CREATED, Json(course)))
}

/// Delete a course that no other course depends on
#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}",
    params(
        ("course_id" = String, Path, description = "Course code")
    ),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 404, description = "Course not found", body = crate::dtos::ErrorResponse),
        (status = 409, description = "Course is a prerequisite of another course", body = crate::dtos::ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let course_id = path_course_id(&course_id);

    let course = state.write().await.remove_course(&course_id)?;
    info!("Deleted course {}", course.course_id);

    Ok(Json(MessageResponse::new(format!(
        "Course {} deleted",
        course.course_id
    ))))
}

/// List every offering of one course
#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/instances",
    params(
        ("course_id" = String, Path, description = "Course code")
    ),
    responses(
        (status = 200, description = "Offerings of the course", body = [InstanceResponse])
    ),
    tag = "Courses"
)]
pub async fn list_course_instances(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Json<Vec<InstanceResponse>> {
    let course_id = path_course_id(&course_id);
    let store = state.read().await;
    let course = store.course(&course_id);

    Json(
        store
            .instances_of(&course_id)
            .into_iter()
            .map(|instance| InstanceResponse::new(instance, course))
            .collect(),
    )
}
