use crate::{
    course::CourseId,
    term::{Semester, Term, Year},
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Composite identity of an offering: unique per (year, semester, course id)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceKey {
    pub year: Year,
    pub semester: Semester,
    pub course_id: CourseId,
}

impl InstanceKey {
    pub fn new(year: Year, semester: Semester, course_id: impl Into<CourseId>) -> Self {
        Self {
            year,
            semester,
            course_id: course_id.into(),
        }
    }

    pub fn term(&self) -> Term {
        Term::new(self.year, self.semester)
    }
}

impl Display for InstanceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.course_id, self.term())
    }
}

/// Canonical flat view of an offering
///
/// `title`, `description` and `prerequisites` are copied from whatever course data the
/// service embedded in the payload. They are display fallbacks only; the current course
/// record is joined in at read time by the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CourseInstance {
    pub course_id: CourseId,
    pub year: Year,
    #[cfg_attr(feature = "openapi", schema(value_type = u8))]
    pub semester: Semester,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub prerequisites: Vec<CourseId>,
}

impl CourseInstance {
    pub fn key(&self) -> InstanceKey {
        InstanceKey::new(self.year, self.semester, self.course_id.clone())
    }

    pub fn term(&self) -> Term {
        Term::new(self.year, self.semester)
    }

    pub fn is_in(&self, year: Year, semester: Semester) -> bool {
        self.year == year && self.semester == semester
    }
}

impl<'de> Deserialize<'de> for CourseInstance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawInstance::deserialize(deserializer).map(normalize_instance)
    }
}

/// Request body for creating an offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewInstance {
    pub course_id: CourseId,
    pub year: Year,
    #[cfg_attr(feature = "openapi", schema(value_type = u8))]
    pub semester: Semester,
}

impl NewInstance {
    pub fn key(&self) -> InstanceKey {
        InstanceKey::new(self.year, self.semester, self.course_id.clone())
    }
}

/// Instance payload with course fields placed directly on the instance
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatInstance {
    #[serde(default)]
    pub course_id: Option<CourseId>,
    pub year: Year,
    pub semester: Semester,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prerequisites: Option<Vec<CourseId>>,
}

/// Course object embedded under `course` by the alternate server shape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedCourse {
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prerequisites: Option<Vec<CourseId>>,
}

/// Instance payload carrying a nested `course` object
///
/// Top-level course fields may still be present; the nested ones take precedence.
#[derive(Debug, Clone, Deserialize)]
pub struct NestedInstance {
    #[serde(flatten)]
    pub instance: FlatInstance,
    pub course: EmbeddedCourse,
}

/// An instance payload exactly as received from the service
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawInstance {
    Nested(NestedInstance),
    Flat(FlatInstance),
}

impl From<CourseInstance> for RawInstance {
    fn from(instance: CourseInstance) -> Self {
        RawInstance::Flat(FlatInstance {
            course_id: Some(instance.course_id),
            year: instance.year,
            semester: instance.semester,
            title: instance.title,
            description: instance.description,
            prerequisites: Some(instance.prerequisites),
        })
    }
}

impl From<RawInstance> for CourseInstance {
    fn from(raw: RawInstance) -> Self {
        normalize_instance(raw)
    }
}

/// Picks the nested string when it carries text, otherwise the top-level one
fn prefer_text(nested: Option<String>, top: Option<String>) -> Option<String> {
    nested.filter(|s| !s.is_empty()).or(top)
}

/// Resolves either payload shape into the canonical [`CourseInstance`]
///
/// Nested `course.*` fields win over top-level fields of the same name. Missing
/// prerequisites become an empty list, and a missing course id becomes an empty id.
/// Normalizing an already canonical record returns it unchanged.
///
/// # Arguments
/// * `raw` - The payload as decoded from the wire
///
/// # Returns
/// The canonical flat record
pub fn normalize_instance(raw: RawInstance) -> CourseInstance {
    let (top, course) = match raw {
        RawInstance::Flat(flat) => (flat, EmbeddedCourse::default()),
        RawInstance::Nested(nested) => (nested.instance, nested.course),
    };

    let course_id = course
        .course_id
        .filter(|id| !id.is_blank())
        .or(top.course_id)
        .unwrap_or_default();

    CourseInstance {
        course_id,
        year: top.year,
        semester: top.semester,
        title: prefer_text(course.title, top.title),
        description: prefer_text(course.description, top.description),
        prerequisites: course
            .prerequisites
            .or(top.prerequisites)
            .unwrap_or_default(),
    }
}
