use super::{parse_semester, parse_year, path_course_id, reject_body};
use crate::{
    dtos::{MessageResponse, instance::InstanceResponse},
    error::ApiError,
    state::{AppState, Store, find_course},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use log::info;
use models::{InstanceForm, InstanceKey, NewInstance};

fn respond(store: &Store, instances: Vec<&NewInstance>) -> Json<Vec<InstanceResponse>> {
    Json(
        instances
            .into_iter()
            .map(|i| InstanceResponse::new(i, find_course(store.courses(), &i.course_id)))
            .collect(),
    )
}

fn instance_key(year: u16, semester: u8, course_id: &str) -> Result<InstanceKey, ApiError> {
    Ok(InstanceKey::new(
        parse_year(year)?,
        parse_semester(semester)?,
        path_course_id(course_id),
    ))
}

/// List offerings in a year
#[utoipa::path(
    get,
    path = "/api/instances/{year}",
    params(
        ("year" = u16, Path, description = "Academic year")
    ),
    responses(
        (status = 200, description = "Offerings in the year", body = [InstanceResponse]),
        (status = 400, description = "Invalid year", body = crate::dtos::ErrorResponse)
    ),
    tag = "Instances"
)]
pub async fn list_by_year(
    State(state): State<AppState>,
    Path(year): Path<u16>,
) -> Result<Json<Vec<InstanceResponse>>, ApiError> {
    let year = parse_year(year)?;
    let store = state.read().await;

    Ok(respond(&store, store.instances_in(year, None)))
}

/// List offerings in a term
#[utoipa::path(
    get,
    path = "/api/instances/{year}/{semester}",
    params(
        ("year" = u16, Path, description = "Academic year"),
        ("semester" = u8, Path, description = "Semester number, 1 or 2")
    ),
    responses(
        (status = 200, description = "Offerings in the term", body = [InstanceResponse]),
        (status = 400, description = "Invalid year or semester", body = crate::dtos::ErrorResponse)
    ),
    tag = "Instances"
)]
pub async fn list_by_term(
    State(state): State<AppState>,
    Path((year, semester)): Path<(u16, u8)>,
) -> Result<Json<Vec<InstanceResponse>>, ApiError> {
    let year = parse_year(year)?;
    let semester = parse_semester(semester)?;
    let store = state.read().await;

    Ok(respond(&store, store.instances_in(year, Some(semester))))
}

/// Get one offering
#[utoipa::path(
    get,
    path = "/api/instances/{year}/{semester}/{course_id}",
    params(
        ("year" = u16, Path, description = "Academic year"),
        ("semester" = u8, Path, description = "Semester number, 1 or 2"),
        ("course_id" = String, Path, description = "Course code")
    ),
    responses(
        (status = 200, description = "Offering found", body = InstanceResponse),
        (status = 404, description = "Offering not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Instances"
)]
pub async fn get_instance(
    State(state): State<AppState>,
    Path((year, semester, course_id)): Path<(u16, u8, String)>,
) -> Result<Json<InstanceResponse>, ApiError> {
    let key = instance_key(year, semester, &course_id)?;
    let store = state.read().await;

    let instance = store
        .instance(&key)
        .ok_or_else(|| ApiError::not_found("Course instance not found"))?;

    Ok(Json(InstanceResponse::new(
        instance,
        find_course(store.courses(), &instance.course_id),
    )))
}

/// Schedule an existing course in a term
#[utoipa::path(
    post,
    path = "/api/instances",
    request_body = NewInstance,
    responses(
        (status = 201, description = "Offering created", body = InstanceResponse),
        (status = 400, description = "Invalid offering or unknown course", body = crate::dtos::ErrorResponse),
        (status = 409, description = "Offering already exists", body = crate::dtos::ErrorResponse)
    ),
    tag = "Instances"
)]
pub async fn create_instance(
    State(state): State<AppState>,
    payload: Result<Json<NewInstance>, JsonRejection>,
) -> Result<(StatusCode, Json<InstanceResponse>), ApiError> {
    let Json(payload) = payload.map_err(reject_body)?;
    let new_instance = InstanceForm::from(&payload).into_new_instance()?;

    let mut store = state.write().await;
    let instance = store.insert_instance(new_instance)?;
    info!("Created course instance {}", instance.key());

    let response = InstanceResponse::new(&instance, find_course(store.courses(), &instance.course_id));
    Ok((StatusCode::CREATED, Json(response)))
}

/// Remove an offering
#[utoipa::path(
    delete,
    path = "/api/instances/{year}/{semester}/{course_id}",
    params(
        ("year" = u16, Path, description = "Academic year"),
        ("semester" = u8, Path, description = "Semester number, 1 or 2"),
        ("course_id" = String, Path, description = "Course code")
    ),
    responses(
        (status = 200, description = "Offering deleted", body = MessageResponse),
        (status = 404, description = "Offering not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Instances"
)]
pub async fn delete_instance(
    State(state): State<AppState>,
    Path((year, semester, course_id)): Path<(u16, u8, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let key = instance_key(year, semester, &course_id)?;

    let instance = state.write().await.remove_instance(&key)?;
    info!("Deleted course instance {}", instance.key());

    Ok(Json(MessageResponse::new("Course instance deleted")))
}
