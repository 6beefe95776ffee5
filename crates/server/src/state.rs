use crate::error::ApiError;
use models::{Course, CourseId, InstanceKey, NewCourse, NewInstance, Semester, Year};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory course and offering tables
///
/// Courses keep insertion order, which is the order list responses use.
#[derive(Debug, Default)]
pub struct Store {
    courses: Vec<Course>,
    instances: Vec<NewInstance>,
}

impl Store {
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.course_id == *course_id)
    }

    /// Adds a course, rejecting a duplicate id
    pub fn insert_course(&mut self, course: NewCourse) -> Result<Course, ApiError> {
        if self.course(&course.course_id).is_some() {
            return Err(ApiError::conflict(format!(
                "Course {} already exists",
                course.course_id
            )));
        }

        let course = Course::from(course);
        self.courses.push(course.clone());
        Ok(course)
    }

    /// Removes a course unless another course lists it as a prerequisite
    ///
    /// Offerings of the course are kept and become orphaned.
    pub fn remove_course(&mut self, course_id: &str) -> Result<Course, ApiError> {
        let position = self
            .courses
            .iter()
            .position(|c| c.course_id == *course_id)
            .ok_or_else(|| ApiError::not_found(format!("Course {course_id} not found")))?;

        let dependents: Vec<&str> = self
            .courses
            .iter()
            .filter(|c| c.course_id != *course_id && c.requires(course_id))
            .map(|c| c.course_id.as_str())
            .collect();

        if !dependents.is_empty() {
            return Err(ApiError::conflict(format!(
                "Course {course_id} is a prerequisite for {}",
                dependents.join(", ")
            )));
        }

        Ok(self.courses.remove(position))
    }

    pub fn instances(&self) -> impl Iterator<Item = &NewInstance> {
        self.instances.iter()
    }

    pub fn instance(&self, key: &InstanceKey) -> Option<&NewInstance> {
        self.instances.iter().find(|i| i.key() == *key)
    }

    pub fn instances_in(&self, year: Year, semester: Option<Semester>) -> Vec<&NewInstance> {
        self.instances
            .iter()
            .filter(|i| i.year == year && semester.is_none_or(|s| i.semester == s))
            .collect()
    }

    pub fn instances_of(&self, course_id: &str) -> Vec<&NewInstance> {
        self.instances
            .iter()
            .filter(|i| i.course_id == *course_id)
            .collect()
    }

    /// Adds an offering of an existing course, rejecting duplicate tuples
    pub fn insert_instance(&mut self, instance: NewInstance) -> Result<NewInstance, ApiError> {
        if self.course(&instance.course_id).is_none() {
            return Err(ApiError::bad_request(format!(
                "Course {} does not exist",
                instance.course_id
            )));
        }

        if self.instance(&instance.key()).is_some() {
            return Err(ApiError::conflict(format!(
                "Course instance already exists for {}",
                instance.key()
            )));
        }

        self.instances.push(instance.clone());
        Ok(instance)
    }

    pub fn remove_instance(&mut self, key: &InstanceKey) -> Result<NewInstance, ApiError> {
        let position = self
            .instances
            .iter()
            .position(|i| i.key() == *key)
            .ok_or_else(|| ApiError::not_found("Course instance not found"))?;

        Ok(self.instances.remove(position))
    }
}

/// Shared handle to the store, cloned into every handler
#[derive(Debug, Clone, Default)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given courses already stored
    pub fn with_courses(courses: Vec<Course>) -> Self {
        let store = Store {
            courses,
            instances: Vec::new(),
        };

        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().await
    }
}

/// Looks up `course_id` among the stored courses, for nesting into offering responses
pub fn find_course<'a>(courses: &'a [Course], course_id: &CourseId) -> Option<&'a Course> {
    courses.iter().find(|c| c.course_id == *course_id)
}
