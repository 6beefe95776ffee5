use models::{Course, CourseId, NewInstance, Semester, Year};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An offering with its course embedded, as returned by every instance endpoint
///
/// `course` is null when the course has since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanceResponse {
    pub course_id: CourseId,
    pub year: Year,
    #[schema(value_type = u8)]
    pub semester: Semester,
    pub course: Option<Course>,
}

impl InstanceResponse {
    pub fn new(instance: &NewInstance, course: Option<&Course>) -> Self {
        Self {
            course_id: instance.course_id.clone(),
            year: instance.year,
            semester: instance.semester,
            course: course.cloned(),
        }
    }
}
