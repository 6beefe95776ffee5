use crate::{client::CatalogClient, error::ServiceError};
use catalog::{
    CatalogIndex, InstanceRow,
    query::{self, instance_rows},
};
use log::{info, warn};
use models::{
    Course, CourseForm, CourseId, CourseInstance, Field, FormErrors, InstanceForm, InstanceKey,
    NewInstance, Term,
};

/// One user's working view of the catalog
///
/// Owns the loaded courses and the offerings of the selected term. Both are replaced
/// only after a successful fetch, and every write awaits its request before reloading,
/// so the view always reflects the last completed fetch. Dropping the session ends it.
#[derive(Debug)]
pub struct CatalogSession {
    client: CatalogClient,
    index: CatalogIndex,
    term: Term,
    instances: Vec<CourseInstance>,
}

impl CatalogSession {
    /// Loads the course list and the offerings of `term`
    pub async fn start(client: CatalogClient, term: Term) -> Result<Self, ServiceError> {
        let (courses, instances) = futures::try_join!(
            client.list_courses(),
            client.list_instances(term.year, term.semester)
        )?;

        info!(
            "Catalog session started with {} courses and {} offerings for {term}",
            courses.len(),
            instances.len()
        );

        Ok(Self {
            client,
            index: CatalogIndex::new(courses),
            term,
            instances,
        })
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn term(&self) -> Term {
        self.term
    }

    pub fn instances(&self) -> &[CourseInstance] {
        &self.instances
    }

    /// Offerings of the selected term joined with the catalog, newest first
    pub fn instance_rows(&self) -> Vec<InstanceRow<'_>> {
        instance_rows(
            query::sort_instances_by_year_semester(&self.instances),
            &self.index,
        )
    }

    pub async fn refresh_courses(&mut self) -> Result<(), ServiceError> {
        let courses = self.client.list_courses().await?;
        self.index.replace(courses);
        Ok(())
    }

    /// Switches to another term and loads its offerings
    ///
    /// On failure the previous term and offerings are kept.
    pub async fn select_term(&mut self, term: Term) -> Result<(), ServiceError> {
        let instances = self.client.list_instances(term.year, term.semester).await?;
        self.term = term;
        self.instances = instances;
        Ok(())
    }

    async fn reload_instances(&mut self) -> Result<(), ServiceError> {
        self.select_term(self.term).await
    }

    /// Validates the form, creates the course and reloads the catalog
    ///
    /// Prerequisite lists that would close a cycle through loaded courses are rejected
    /// locally, like any other validation failure. The returned course is the one the
    /// service echoed, else the reloaded record, else the submitted one.
    pub async fn create_course(
        &mut self,
        form: &CourseForm,
    ) -> Result<WriteOutcome<Course>, ServiceError> {
        let new_course = form.into_new_course()?;

        if let Some(cycle) = self.index.find_prerequisite_cycle(&new_course) {
            let path: Vec<&str> = cycle.iter().map(CourseId::as_str).collect();
            return Err(ServiceError::Validation(FormErrors::single(
                Field::Prerequisites,
                format!("Prerequisites would create a cycle: {}", path.join(" -> ")),
            )));
        }

        let echoed = self.client.create_course(&new_course).await?;
        info!("Created course {}", new_course.course_id);

        let refreshed = note_refresh(
            self.refresh_courses().await,
            format_args!("Course list not refreshed after creating {}", new_course.course_id),
        );

        let course = echoed
            .or_else(|| self.index.get_course_by_id(&new_course.course_id).cloned())
            .unwrap_or_else(|| Course::from(new_course));

        Ok(WriteOutcome::new(course, refreshed))
    }

    /// Deletes a course unless another loaded course still requires it
    ///
    /// The local check only covers loaded courses; a conflict reported by the service
    /// comes back as [`ServiceError::Conflict`] and leaves the session unchanged.
    pub async fn delete_course(&mut self, course_id: &str) -> Result<WriteOutcome<()>, ServiceError> {
        let dependents: Vec<CourseId> = self
            .index
            .dependents_of(course_id)
            .into_iter()
            .map(|course| course.course_id.clone())
            .collect();

        if !dependents.is_empty() {
            return Err(ServiceError::PrerequisiteInUse {
                course_id: CourseId::new(course_id),
                dependents,
            });
        }

        self.client.delete_course(course_id).await?;
        info!("Deleted course {course_id}");

        let refreshed = note_refresh(
            self.refresh_courses().await,
            format_args!("Course list not refreshed after deleting {course_id}"),
        );

        Ok(WriteOutcome::new((), refreshed))
    }

    /// Validates the form, creates the offering and reloads the selected term
    pub async fn create_instance(
        &mut self,
        form: &InstanceForm,
    ) -> Result<WriteOutcome<CourseInstance>, ServiceError> {
        let new_instance = form.into_new_instance()?;
        let key = new_instance.key();

        let echoed = self.client.create_instance(&new_instance).await?;
        info!("Created offering {key}");

        let refreshed = note_refresh(
            self.reload_instances().await,
            format_args!("Offerings not refreshed after creating {key}"),
        );

        let instance = echoed
            .or_else(|| self.instances.iter().find(|i| i.key() == key).cloned())
            .unwrap_or_else(|| self.submitted_instance(new_instance));

        Ok(WriteOutcome::new(instance, refreshed))
    }

    pub async fn delete_instance(
        &mut self,
        key: &InstanceKey,
    ) -> Result<WriteOutcome<()>, ServiceError> {
        self.client.delete_instance(key).await?;
        info!("Deleted offering {key}");

        let refreshed = note_refresh(
            self.reload_instances().await,
            format_args!("Offerings not refreshed after deleting {key}"),
        );

        Ok(WriteOutcome::new((), refreshed))
    }

    /// Builds the offering record from the request, with course fields from the index
    fn submitted_instance(&self, instance: NewInstance) -> CourseInstance {
        let course = self.index.get_course_by_id(&instance.course_id);

        CourseInstance {
            title: course.map(|c| c.title.clone()),
            description: course.map(|c| c.description.clone()),
            prerequisites: course.map(|c| c.prerequisites.clone()).unwrap_or_default(),
            course_id: instance.course_id,
            year: instance.year,
            semester: instance.semester,
        }
    }
}

/// A write the service accepted
///
/// `refreshed` is false when reloading the view afterwards failed, so the loaded
/// courses or offerings may not include the write yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome<T> {
    pub value: T,
    pub refreshed: bool,
}

impl<T> WriteOutcome<T> {
    pub fn new(value: T, refreshed: bool) -> Self {
        Self { value, refreshed }
    }

    pub fn is_stale(&self) -> bool {
        !self.refreshed
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

fn note_refresh(result: Result<(), ServiceError>, context: std::fmt::Arguments<'_>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("{context}: {e}");
            false
        }
    }
}
