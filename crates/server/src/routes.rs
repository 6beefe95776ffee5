pub mod course;
pub mod health;
pub mod instance;

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use models::{CourseId, Semester, Year};

/// Maps a body that failed to parse into the `{message}` error shape
pub(crate) fn reject_body(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

pub(crate) fn parse_semester(semester: u8) -> Result<Semester, ApiError> {
    Semester::try_from(semester).map_err(|e| ApiError::bad_request(e.to_string()))
}

pub(crate) fn parse_year(year: u16) -> Result<Year, ApiError> {
    let year = Year(year);
    if year.in_range() {
        Ok(year)
    } else {
        Err(ApiError::bad_request(format!(
            "Year must be between {} and {}",
            Year::MIN,
            Year::MAX
        )))
    }
}

pub(crate) fn path_course_id(course_id: &str) -> CourseId {
    CourseId::canonical(course_id)
}
