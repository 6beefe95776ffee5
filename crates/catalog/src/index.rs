use log::debug;
use models::{Course, CourseId, NewCourse};
use std::collections::HashSet;

/// Title shown for a prerequisite id that is not in the loaded catalog
pub const UNKNOWN_COURSE_TITLE: &str = "Unknown Course";

/// A direct prerequisite looked up in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedPrerequisite<'a> {
    /// The prerequisite is loaded
    Known(&'a Course),
    /// The id is referenced but not loaded (yet)
    Unknown(&'a CourseId),
}

impl<'a> ResolvedPrerequisite<'a> {
    pub fn course_id(&self) -> &'a CourseId {
        match self {
            Self::Known(course) => &course.course_id,
            Self::Unknown(course_id) => course_id,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            Self::Known(course) => &course.title,
            Self::Unknown(_) => UNKNOWN_COURSE_TITLE,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

/// In-memory view over the courses loaded for the current session
///
/// Courses keep the order the service returned them in. The index is only replaced
/// wholesale after a successful fetch; readers never mutate it.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    courses: Vec<Course>,
}

impl CatalogIndex {
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    /// Swaps in a freshly fetched course list
    pub fn replace(&mut self, courses: Vec<Course>) {
        debug!("Catalog index refreshed with {} courses", courses.len());
        self.courses = courses;
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Finds a loaded course by its exact id
    ///
    /// # Arguments
    /// * `course_id` - The id to look up
    ///
    /// # Returns
    /// `Some(course)` if loaded, `None` otherwise
    pub fn get_course_by_id(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.course_id == *course_id)
    }

    pub fn contains(&self, course_id: &str) -> bool {
        self.get_course_by_id(course_id).is_some()
    }

    /// Title of a loaded course, or the id itself when the course is not loaded
    pub fn course_title<'a>(&'a self, course_id: &'a str) -> &'a str {
        self.get_course_by_id(course_id)
            .map_or(course_id, |course| course.title.as_str())
    }

    /// Whether any other loaded course lists `course_id` as a prerequisite
    ///
    /// This is only a local pre-check. The service may still reject a delete that
    /// passed it, e.g. when another client added a dependent course meanwhile.
    pub fn is_prerequisite_for_others(&self, course_id: &str) -> bool {
        self.courses
            .iter()
            .any(|c| c.course_id != *course_id && c.requires(course_id))
    }

    /// Loaded courses that list `course_id` as a prerequisite, in catalog order
    pub fn dependents_of(&self, course_id: &str) -> Vec<&Course> {
        self.courses
            .iter()
            .filter(|c| c.course_id != *course_id && c.requires(course_id))
            .collect()
    }

    /// Resolves the direct prerequisites of a course
    ///
    /// Only one level is resolved. Ids that are not loaded come back as
    /// [`ResolvedPrerequisite::Unknown`].
    ///
    /// # Arguments
    /// * `course_id` - The course whose prerequisites to resolve
    ///
    /// # Returns
    /// The prerequisites in declaration order, empty if the course is not loaded
    pub fn resolve_prerequisite_chain(&self, course_id: &str) -> Vec<ResolvedPrerequisite<'_>> {
        let Some(course) = self.get_course_by_id(course_id) else {
            return Vec::new();
        };

        course
            .prerequisites
            .iter()
            .map(|id| match self.get_course_by_id(id) {
                Some(prerequisite) => ResolvedPrerequisite::Known(prerequisite),
                None => ResolvedPrerequisite::Unknown(id),
            })
            .collect()
    }

    /// Checks whether creating `course` would close a prerequisite cycle
    ///
    /// Follows prerequisite edges through the loaded courses starting from each of the
    /// new course's prerequisites.
    ///
    /// # Returns
    /// `Some(path)` starting and ending at the new course's id if a cycle would be
    /// formed, `None` otherwise
    pub fn find_prerequisite_cycle<'a>(&'a self, course: &'a NewCourse) -> Option<Vec<CourseId>> {
        let target = course.course_id.as_str();
        let mut visited = HashSet::new();

        for prerequisite in &course.prerequisites {
            let mut path = vec![course.course_id.clone()];
            if self.path_to(prerequisite, target, &mut visited, &mut path) {
                return Some(path);
            }
        }

        None
    }

    /// Depth-first search along prerequisite edges, recording the path taken
    fn path_to<'a>(
        &'a self,
        from: &'a CourseId,
        target: &str,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<CourseId>,
    ) -> bool {
        path.push(from.clone());
        if from.as_str() == target {
            return true;
        }

        if visited.insert(from.as_str())
            && let Some(course) = self.get_course_by_id(from)
        {
            for next in &course.prerequisites {
                if self.path_to(next, target, visited, path) {
                    return true;
                }
            }
        }

        path.pop();
        false
    }
}

impl From<Vec<Course>> for CatalogIndex {
    fn from(courses: Vec<Course>) -> Self {
        Self::new(courses)
    }
}
