use crate::{
    config::{ClientConfig, ConfigError},
    error::{
        COURSE_EXISTS, COURSE_NOT_FOUND, INSTANCE_EXISTS, INSTANCE_NOT_FOUND, NOT_FOUND,
        PREREQUISITE_CONFLICT, ServiceError,
    },
};
use log::{debug, warn};
use models::{
    Course, CourseInstance, InstanceKey, NewCourse, NewInstance, RawInstance, Semester, Year,
    normalize_instance,
};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Catalog operations, used to pick a fallback message when a failure carries none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    ListCourses,
    GetCourse,
    CreateCourse,
    DeleteCourse,
    ListInstances,
    GetInstance,
    CreateInstance,
    DeleteInstance,
    ListCourseInstances,
}

impl Operation {
    fn fallback_message(self, status: StatusCode) -> String {
        let message = match (self, status) {
            (
                Self::GetCourse | Self::DeleteCourse | Self::ListCourseInstances,
                StatusCode::NOT_FOUND,
            ) => COURSE_NOT_FOUND,
            (Self::GetInstance | Self::DeleteInstance, StatusCode::NOT_FOUND) => {
                INSTANCE_NOT_FOUND
            }
            (_, StatusCode::NOT_FOUND) => NOT_FOUND,
            (Self::CreateCourse, StatusCode::CONFLICT) => COURSE_EXISTS,
            (Self::DeleteCourse, StatusCode::CONFLICT) => PREREQUISITE_CONFLICT,
            (Self::CreateInstance, StatusCode::CONFLICT) => INSTANCE_EXISTS,
            _ => return format!("HTTP error! status: {}", status.as_u16()),
        };

        message.to_string()
    }
}

/// The single point of contact with the catalog service
///
/// Every call returns the decoded success payload or a [`ServiceError`]. Instance
/// payloads are normalized before they are returned.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let base_url = config.parse_base_url()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Builds a client from `CATALOG_API_URL` / `CATALOG_API_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(&ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn instance_endpoint(&self, year: Year, semester: Semester, course_id: &str) -> Url {
        self.endpoint(&[
            "instances",
            &year.to_string(),
            &semester.number().to_string(),
            course_id,
        ])
    }

    /// Sends a request and returns the body of a 2xx response
    ///
    /// # Arguments
    /// * `operation` - Which catalog operation this is
    /// * `request` - The prepared request
    ///
    /// # Returns
    /// The response text, or the failure mapped to a [`ServiceError`]
    async fn send(&self, operation: Operation, request: RequestBuilder) -> Result<String, ServiceError> {
        let response = request.send().await.map_err(|e| {
            warn!("{operation:?} failed before a response arrived: {e}");
            ServiceError::Transport(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(ServiceError::Transport)?;

        if status.is_success() {
            debug!("{operation:?} succeeded with {status}");
            return Ok(body);
        }

        let error =
            ServiceError::from_response(status, &body, operation.fallback_message(status));
        warn!("{operation:?} failed with {status}: {error}");
        Err(error)
    }

    /// Sends a request and decodes the JSON body of a 2xx response
    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let body = self.send(operation, request).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("{operation:?} returned an unreadable body: {e}");
            ServiceError::Decode(e)
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{method} {url}");
        self.http.request(method, url)
    }

    /// Fetches every course, in the order the service returns them
    pub async fn list_courses(&self) -> Result<Vec<Course>, ServiceError> {
        let url = self.endpoint(&["courses"]);
        self.fetch(Operation::ListCourses, self.request(Method::GET, url))
            .await
    }

    pub async fn get_course(&self, course_id: &str) -> Result<Course, ServiceError> {
        let url = self.endpoint(&["courses", course_id]);
        self.fetch(Operation::GetCourse, self.request(Method::GET, url))
            .await
    }

    /// Creates a course; a duplicate id fails with a conflict or bad request
    ///
    /// Any 2xx counts as created. The stored record is returned only when the service
    /// echoes it back in the body.
    pub async fn create_course(&self, course: &NewCourse) -> Result<Option<Course>, ServiceError> {
        let url = self.endpoint(&["courses"]);
        let body = self
            .send(
                Operation::CreateCourse,
                self.request(Method::POST, url).json(course),
            )
            .await?;

        Ok(echoed(&body).filter(|created: &Course| !created.course_id.is_blank()))
    }

    /// Deletes a course; fails with a conflict while other courses still require it
    pub async fn delete_course(&self, course_id: &str) -> Result<(), ServiceError> {
        let url = self.endpoint(&["courses", course_id]);
        self.send(Operation::DeleteCourse, self.request(Method::DELETE, url))
            .await
            .map(|_| ())
    }

    /// Fetches all offerings of one year and semester
    pub async fn list_instances(
        &self,
        year: Year,
        semester: Semester,
    ) -> Result<Vec<CourseInstance>, ServiceError> {
        let url = self.endpoint(&["instances", &year.to_string(), &semester.number().to_string()]);
        self.fetch_instances(Operation::ListInstances, url).await
    }

    /// Fetches all offerings of one year, across both semesters
    pub async fn list_instances_by_year(&self, year: Year) -> Result<Vec<CourseInstance>, ServiceError> {
        let url = self.endpoint(&["instances", &year.to_string()]);
        self.fetch_instances(Operation::ListInstances, url).await
    }

    /// Fetches every offering of one course
    pub async fn list_course_instances(
        &self,
        course_id: &str,
    ) -> Result<Vec<CourseInstance>, ServiceError> {
        let url = self.endpoint(&["courses", course_id, "instances"]);
        self.fetch_instances(Operation::ListCourseInstances, url)
            .await
    }

    async fn fetch_instances(
        &self,
        operation: Operation,
        url: Url,
    ) -> Result<Vec<CourseInstance>, ServiceError> {
        let raw: Vec<RawInstance> = self.fetch(operation, self.request(Method::GET, url)).await?;
        Ok(raw.into_iter().map(normalize_instance).collect())
    }

    pub async fn get_instance(&self, key: &InstanceKey) -> Result<CourseInstance, ServiceError> {
        let url = self.instance_endpoint(key.year, key.semester, &key.course_id);
        let raw: RawInstance = self
            .fetch(Operation::GetInstance, self.request(Method::GET, url))
            .await?;
        Ok(normalize_instance(raw))
    }

    /// Creates an offering; duplicates and unknown courses are rejected by the service
    ///
    /// Like [`Self::create_course`], the offering is returned only when the body carries it.
    pub async fn create_instance(
        &self,
        instance: &NewInstance,
    ) -> Result<Option<CourseInstance>, ServiceError> {
        let url = self.endpoint(&["instances"]);
        let body = self
            .send(
                Operation::CreateInstance,
                self.request(Method::POST, url).json(instance),
            )
            .await?;

        Ok(echoed::<RawInstance>(&body)
            .map(normalize_instance)
            .filter(|created| !created.course_id.is_blank()))
    }

    pub async fn delete_instance(&self, key: &InstanceKey) -> Result<(), ServiceError> {
        let url = self.instance_endpoint(key.year, key.semester, &key.course_id);
        self.send(Operation::DeleteInstance, self.request(Method::DELETE, url))
            .await
            .map(|_| ())
    }

    /// Whether the service answers its health check; never fails
    pub async fn health(&self) -> bool {
        let url = self.endpoint(&["health"]);
        match self.request(Method::GET, url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Health check failed: {e}");
                false
            }
        }
    }
}

/// Decodes the body of a successful write when it holds the written record
fn echoed<T: DeserializeOwned>(body: &str) -> Option<T> {
    match serde_json::from_str(body) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Write response carries no record: {e}");
            None
        }
    }
}
