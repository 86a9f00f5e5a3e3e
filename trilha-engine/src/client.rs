//! Backend REST collaborator
//!
//! [`CourseApi`] is the engine's only outward seam: the workflow is generic
//! over it, so tests run against an in-memory implementation and production
//! uses [`HttpCourseApi`]. Payloads are validated here, at the boundary, so
//! the core only ever sees well-formed domain types.

use std::time::Duration;

use trilha_common::api::types::{
    CompleteLessonRequest, CompleteLessonResponse, CourseDto, EnrollRequest, EnrollmentDto,
    LessonProgressDto,
};
use trilha_common::config::ClientConfig;
use trilha_common::models::{
    CompletionRecord, Course, CourseId, Enrollment, EnrollmentId, UserId,
};
use trilha_common::{Error, Result};

const USER_AGENT: &str = concat!("trilha/", env!("CARGO_PKG_VERSION"));

/// The backend operations the engine consumes.
///
/// No retry and no caching here: transport failures surface unchanged so the
/// caller can decide on retry/backoff and rollback.
#[allow(async_fn_in_trait)]
pub trait CourseApi {
    /// Fetch the full course hierarchy in one batched request; nested
    /// modules/lessons may arrive unsorted.
    async fn fetch_course(&self, course_id: CourseId) -> Result<Course>;

    /// Fetch the enrollment for (course, learner), if one exists
    async fn fetch_enrollment(
        &self,
        course_id: CourseId,
        user_id: UserId,
    ) -> Result<Option<Enrollment>>;

    /// Fetch all completed-lesson records for an enrollment
    async fn fetch_completions(&self, enrollment_id: EnrollmentId)
        -> Result<Vec<CompletionRecord>>;

    /// Create an enrollment; a backend conflict surfaces as `AlreadyEnrolled`
    async fn create_enrollment(&self, course_id: CourseId, user_id: UserId) -> Result<Enrollment>;

    /// Mark a lesson complete; the response carries authoritative progress
    /// and status for reconciliation
    async fn complete_lesson(
        &self,
        enrollment_id: EnrollmentId,
        request: CompleteLessonRequest,
    ) -> Result<CompleteLessonResponse>;

    /// Download the completion certificate as an opaque artifact
    async fn download_certificate(&self, enrollment_id: EnrollmentId) -> Result<Vec<u8>>;
}

/// reqwest-backed [`CourseApi`] implementation
pub struct HttpCourseApi {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpCourseApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Convenience constructor with the default endpoint and timeout
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(&ClientConfig {
            api_url: base_url.into(),
            timeout: Duration::from_secs(trilha_common::config::DEFAULT_TIMEOUT_SECS),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success HTTP status onto the error taxonomy
    async fn status_error(response: reqwest::Response, context: &str) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            404 => Error::NotFound(context.to_string()),
            409 => Error::AlreadyEnrolled,
            401 | 403 => Error::NotPermitted(context.to_string()),
            code => Error::Transport(format!("{context}: HTTP {code}: {body}")),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response, context).await);
        }
        response
            .json()
            .await
            .map_err(|e| Error::InvalidPayload(format!("{context}: {e}")))
    }
}

impl CourseApi for HttpCourseApi {
    async fn fetch_course(&self, course_id: CourseId) -> Result<Course> {
        let dto: CourseDto = self
            .get_json(&format!("/courses/{course_id}"), "fetch course")
            .await?;
        Course::try_from(dto)
    }

    async fn fetch_enrollment(
        &self,
        course_id: CourseId,
        user_id: UserId,
    ) -> Result<Option<Enrollment>> {
        let url = self.url(&format!("/courses/{course_id}/enrollments/{user_id}"));
        tracing::debug!(url = %url, "GET");

        let response = self.http_client.get(&url).send().await?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::status_error(response, "fetch enrollment").await);
        }
        let dto: EnrollmentDto = response
            .json()
            .await
            .map_err(|e| Error::InvalidPayload(format!("fetch enrollment: {e}")))?;
        Ok(Some(Enrollment::try_from(dto)?))
    }

    async fn fetch_completions(
        &self,
        enrollment_id: EnrollmentId,
    ) -> Result<Vec<CompletionRecord>> {
        let dtos: Vec<LessonProgressDto> = self
            .get_json(
                &format!("/enrollments/{enrollment_id}/progress"),
                "fetch completions",
            )
            .await?;
        Ok(dtos.into_iter().map(CompletionRecord::from).collect())
    }

    async fn create_enrollment(&self, course_id: CourseId, user_id: UserId) -> Result<Enrollment> {
        let url = self.url("/enrollments");
        tracing::debug!(url = %url, course_id = %course_id, user_id = %user_id, "POST");

        let response = self
            .http_client
            .post(&url)
            .json(&EnrollRequest { course_id, user_id })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response, "create enrollment").await);
        }
        let dto: EnrollmentDto = response
            .json()
            .await
            .map_err(|e| Error::InvalidPayload(format!("create enrollment: {e}")))?;
        let enrollment = Enrollment::try_from(dto)?;

        tracing::info!(
            enrollment_id = %enrollment.id,
            course_id = %course_id,
            user_id = %user_id,
            "Enrollment created"
        );
        Ok(enrollment)
    }

    async fn complete_lesson(
        &self,
        enrollment_id: EnrollmentId,
        request: CompleteLessonRequest,
    ) -> Result<CompleteLessonResponse> {
        let url = self.url(&format!("/enrollments/{enrollment_id}/completions"));
        tracing::debug!(url = %url, lesson_id = %request.lesson_id, "POST");

        let response = self.http_client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response, "complete lesson").await);
        }
        let body: CompleteLessonResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidPayload(format!("complete lesson: {e}")))?;
        body.validate()?;

        tracing::info!(
            enrollment_id = %enrollment_id,
            lesson_id = %body.completed_lesson,
            progress = body.overall_progress,
            status = %body.enrollment_status,
            "Lesson completion recorded"
        );
        Ok(body)
    }

    async fn download_certificate(&self, enrollment_id: EnrollmentId) -> Result<Vec<u8>> {
        let url = self.url(&format!("/enrollments/{enrollment_id}/certificate"));
        tracing::debug!(url = %url, "GET certificate");

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response, "download certificate").await);
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
