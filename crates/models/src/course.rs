use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Deref,
};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// A course code such as `"CS 101"` or `"MATH1001"`
///
/// Lookups compare ids exactly; use [`CourseId::canonical`] to bring user input
/// into the stored form first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    /// Wraps a string as-is
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Uppercases the id and collapses every whitespace run into a single space
    ///
    /// # Arguments
    /// * `raw` - The id as typed by the user
    ///
    /// # Returns
    /// The canonical [`CourseId`], e.g. `"  cs   101 "` becomes `"CS 101"`
    pub fn canonical(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        Self(WHITESPACE.replace_all(&upper, " ").into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Deref for CourseId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for CourseId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CourseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CourseId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CourseId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for CourseId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CourseId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for CourseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Represents a catalog entry as returned by the catalog service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Course code (e.g., "CS 101")
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    /// Direct prerequisites, in the order they were entered
    #[serde(default)]
    pub prerequisites: Vec<CourseId>,
}

impl Course {
    pub fn has_prerequisites(&self) -> bool {
        !self.prerequisites.is_empty()
    }

    /// Whether `course_id` is listed as a direct prerequisite of this course
    pub fn requires(&self, course_id: &str) -> bool {
        self.prerequisites.iter().any(|p| p.as_str() == course_id)
    }
}

/// Request body for creating a course
///
/// Built from a validated [`CourseForm`](crate::validation::CourseForm), so the id is
/// already canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    pub course_id: CourseId,
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<CourseId>,
}

impl From<NewCourse> for Course {
    fn from(new: NewCourse) -> Self {
        Self {
            course_id: new.course_id,
            title: new.title,
            description: new.description,
            prerequisites: new.prerequisites,
        }
    }
}
