use models::{CourseId, FormErrors};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub const NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";
pub const GENERIC_ERROR: &str = "An unexpected error occurred. Please try again.";
pub const SERVER_ERROR: &str = "Server error. Please try again later.";
pub const NOT_FOUND: &str = "Resource not found.";
pub const COURSE_NOT_FOUND: &str = "Course not found.";
pub const INSTANCE_NOT_FOUND: &str = "Course instance not found.";
pub const COURSE_EXISTS: &str = "A course with this ID already exists.";
pub const PREREQUISITE_CONFLICT: &str =
    "Cannot delete course: it is a prerequisite for other courses.";
pub const INSTANCE_EXISTS: &str = "Course instance already exists for this year and semester.";

/// Broad origin of a failure, used to pick how it is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local rule violation, no request was made
    Validation,
    /// HTTP 409 or a failed local prerequisite-in-use check
    Conflict,
    /// HTTP 404
    NotFound,
    /// HTTP 400
    BadRequest,
    /// HTTP 5xx
    Server,
    /// The request never got a response
    Transport,
    /// Any other status, or a response that could not be read
    Other,
}

/// Everything a catalog operation can fail with
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(FormErrors),

    #[error("Cannot delete course {course_id}: it is a prerequisite for {}", join_ids(.dependents))]
    PrerequisiteInUse {
        course_id: CourseId,
        dependents: Vec<CourseId>,
    },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message} (status {status})")]
    Server { status: u16, message: String },

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

fn join_ids(ids: &[CourseId]) -> String {
    ids.iter()
        .map(CourseId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error body sent by the catalog service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Picks the most specific message out of a failed response body
///
/// A JSON `message` field wins, then the raw text. A JSON body without a usable
/// message yields `None` so the caller falls back to its generic message.
fn body_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.filter(|m| !m.trim().is_empty()),
        Err(_) => Some(body.to_string()),
    }
}

impl ServiceError {
    /// Builds the error for a non-2xx response
    ///
    /// # Arguments
    /// * `status` - The response status
    /// * `body` - The response body text, possibly empty
    /// * `fallback` - Message used when the body carries none
    pub fn from_response(status: StatusCode, body: &str, fallback: String) -> Self {
        let message = body_message(body).unwrap_or(fallback);

        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest { message },
            StatusCode::NOT_FOUND => Self::NotFound { message },
            StatusCode::CONFLICT => Self::Conflict { message },
            s if s.is_server_error() => Self::Server {
                status: s.as_u16(),
                message,
            },
            s => Self::Http {
                status: s.as_u16(),
                message,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::PrerequisiteInUse { .. } | Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Server { .. } => ErrorKind::Server,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Http { .. } | Self::Decode(_) => ErrorKind::Other,
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Conflict { .. } => Some(409),
            Self::NotFound { .. } => Some(404),
            Self::BadRequest { .. } => Some(400),
            Self::Server { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Per-field messages for a local validation failure
    pub fn form_errors(&self) -> Option<&FormErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// The single message to show the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::PrerequisiteInUse { .. } => PREREQUISITE_CONFLICT.to_string(),
            Self::Conflict { message }
            | Self::NotFound { message }
            | Self::BadRequest { message }
            | Self::Http { message, .. } => message.clone(),
            Self::Server { .. } => SERVER_ERROR.to_string(),
            Self::Transport(_) => NETWORK_ERROR.to_string(),
            Self::Decode(_) => GENERIC_ERROR.to_string(),
        }
    }
}

impl From<FormErrors> for ServiceError {
    fn from(errors: FormErrors) -> Self {
        Self::Validation(errors)
    }
}
