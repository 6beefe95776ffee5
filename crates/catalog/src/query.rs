//! Search, filter and sort helpers used while rendering course and offering lists.
//!
//! Every function borrows its input and returns a new `Vec` of references, so the
//! loaded data is never reordered or copied.

use crate::index::CatalogIndex;
use models::{Course, CourseId, CourseInstance, Semester, Year};
use std::cmp::Ordering;

/// Title shown for an offering whose course is no longer in the catalog
pub const TITLE_NOT_FOUND: &str = "Title not found";

/// Compares two strings the way a user-facing sorted list expects
///
/// Letters compare case-insensitively first; strings that differ only in case put the
/// lowercase form first.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .find(|(x, y)| x != y)
                .map_or(Ordering::Equal, |(x, y)| {
                    y.is_lowercase().cmp(&x.is_lowercase())
                })
        })
        .then_with(|| a.cmp(b))
}

/// Case-insensitive substring search over id, title and description
///
/// # Arguments
/// * `courses` - The courses to search
/// * `term` - The search text; a blank term matches everything
///
/// # Returns
/// The matching courses in their original order
pub fn filter_courses_by_search<'a, I>(courses: I, term: &str) -> Vec<&'a Course>
where
    I: IntoIterator<Item = &'a Course>,
{
    let term = term.trim();
    if term.is_empty() {
        return courses.into_iter().collect();
    }

    let needle = term.to_lowercase();
    courses
        .into_iter()
        .filter(|course| {
            course.course_id.to_lowercase().contains(&needle)
                || course.title.to_lowercase().contains(&needle)
                || course.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Sorts courses by id in ascending order (stable)
pub fn sort_courses_by_code<'a, I>(courses: I) -> Vec<&'a Course>
where
    I: IntoIterator<Item = &'a Course>,
{
    let mut sorted: Vec<&Course> = courses.into_iter().collect();
    sorted.sort_by(|a, b| locale_cmp(&a.course_id, &b.course_id));
    sorted
}

/// Sorts offerings newest first: year descending, then semester descending (stable)
pub fn sort_instances_by_year_semester<'a, I>(instances: I) -> Vec<&'a CourseInstance>
where
    I: IntoIterator<Item = &'a CourseInstance>,
{
    let mut sorted: Vec<&CourseInstance> = instances.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then_with(|| b.semester.cmp(&a.semester))
    });
    sorted
}

/// Keeps the offerings of exactly one year and semester
pub fn filter_instances_by_year_semester<'a, I>(
    instances: I,
    year: Year,
    semester: Semester,
) -> Vec<&'a CourseInstance>
where
    I: IntoIterator<Item = &'a CourseInstance>,
{
    instances
        .into_iter()
        .filter(|instance| instance.is_in(year, semester))
        .collect()
}

/// An offering joined with the current record of its course
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceRow<'a> {
    pub instance: &'a CourseInstance,
    /// `None` when the course is not (or no longer) in the catalog
    pub course: Option<&'a Course>,
}

impl<'a> InstanceRow<'a> {
    pub fn course_id(&self) -> &'a CourseId {
        &self.instance.course_id
    }

    /// The catalog title, then the title embedded in the payload, then a placeholder
    pub fn title(&self) -> &'a str {
        self.course
            .map(|course| course.title.as_str())
            .or(self.instance.title.as_deref())
            .unwrap_or(TITLE_NOT_FOUND)
    }

    pub fn description(&self) -> Option<&'a str> {
        self.course
            .map(|course| course.description.as_str())
            .or(self.instance.description.as_deref())
    }

    pub fn prerequisites(&self) -> &'a [CourseId] {
        match self.course {
            Some(course) => &course.prerequisites,
            None => &self.instance.prerequisites,
        }
    }

    pub fn is_orphaned(&self) -> bool {
        self.course.is_none()
    }
}

/// Joins each offering against the catalog at read time
///
/// # Arguments
/// * `instances` - Offerings to display
/// * `index` - The currently loaded catalog
///
/// # Returns
/// One row per offering, in input order
pub fn instance_rows<'a, I>(instances: I, index: &'a CatalogIndex) -> Vec<InstanceRow<'a>>
where
    I: IntoIterator<Item = &'a CourseInstance>,
{
    instances
        .into_iter()
        .map(|instance| InstanceRow {
            instance,
            course: index.get_course_by_id(&instance.course_id),
        })
        .collect()
}
