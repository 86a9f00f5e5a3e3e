//! Wire request/response types for the backend REST API
//!
//! These are the only payload shapes the engine reads or writes. Everything
//! else the backend sends on these endpoints (titles, descriptions, pricing,
//! instructor metadata) belongs to the UI layer and is deliberately absent
//! here; serde ignores unknown fields on deserialization.
//!
//! Each response DTO converts into its domain model via `TryFrom`, and the
//! conversion is where payloads are validated. Malformed data is rejected at
//! this boundary so nothing duck-typed reaches the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::{
    CompletionRecord, Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, Lesson,
    LessonId, Module, ModuleId, UserId,
};

// ========================================
// Hierarchy payloads
// ========================================

/// Lesson as delivered by the backend (order may be unsorted)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDto {
    pub id: LessonId,
    pub module_id: ModuleId,
    pub order: i64,
}

/// Module with nested lessons
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDto {
    pub id: ModuleId,
    pub course_id: CourseId,
    pub order: i64,
    #[serde(default)]
    pub lessons: Vec<LessonDto>,
}

/// Course with nested modules, fetched in a single batched request
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: CourseId,
    #[serde(default)]
    pub modules: Vec<ModuleDto>,
}

/// Validate a wire `order` value: positive integer, fits in u32
fn validate_order(order: i64, context: &str) -> Result<u32, Error> {
    if order >= 1 {
        u32::try_from(order)
            .map_err(|_| Error::InvalidPayload(format!("{context}: order {order} out of range")))
    } else {
        Err(Error::InvalidPayload(format!(
            "{context}: order must be a positive integer, got {order}"
        )))
    }
}

impl TryFrom<LessonDto> for Lesson {
    type Error = Error;

    fn try_from(dto: LessonDto) -> Result<Self, Error> {
        Ok(Lesson {
            id: dto.id,
            module_id: dto.module_id,
            order: validate_order(dto.order, &format!("lesson {}", dto.id))?,
        })
    }
}

impl TryFrom<ModuleDto> for Module {
    type Error = Error;

    fn try_from(dto: ModuleDto) -> Result<Self, Error> {
        let order = validate_order(dto.order, &format!("module {}", dto.id))?;
        let lessons = dto
            .lessons
            .into_iter()
            .map(Lesson::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Module {
            id: dto.id,
            course_id: dto.course_id,
            order,
            lessons,
        })
    }
}

impl TryFrom<CourseDto> for Course {
    type Error = Error;

    fn try_from(dto: CourseDto) -> Result<Self, Error> {
        let modules = dto
            .modules
            .into_iter()
            .map(Module::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Course {
            id: dto.id,
            modules,
        })
    }
}

// ========================================
// Enrollment payloads
// ========================================

/// Enrollment as delivered by the backend
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDto {
    pub id: EnrollmentId,
    pub course_id: CourseId,
    pub user_id: UserId,
    pub status: EnrollmentStatus,
    pub progress: f64,
}

impl TryFrom<EnrollmentDto> for Enrollment {
    type Error = Error;

    fn try_from(dto: EnrollmentDto) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&dto.progress) || dto.progress.is_nan() {
            return Err(Error::InvalidPayload(format!(
                "enrollment {}: progress {} outside [0, 1]",
                dto.id, dto.progress
            )));
        }
        Ok(Enrollment {
            id: dto.id,
            course_id: dto.course_id,
            user_id: dto.user_id,
            status: dto.status,
            progress: dto.progress,
        })
    }
}

/// One completed-lesson record for an enrollment
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgressDto {
    pub lesson_id: LessonId,
    pub completion_date: DateTime<Utc>,
}

impl From<LessonProgressDto> for CompletionRecord {
    fn from(dto: LessonProgressDto) -> Self {
        CompletionRecord {
            lesson_id: dto.lesson_id,
            completed_at: dto.completion_date,
        }
    }
}

/// Request body for creating an enrollment
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: CourseId,
    pub user_id: UserId,
}

// ========================================
// Lesson completion payloads
// ========================================

/// Request body for marking a lesson complete
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonRequest {
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub lesson_id: LessonId,
}

/// Backend response to a lesson completion
///
/// `overall_progress` and `enrollment_status` are authoritative; the
/// workflow reconciles its local enrollment state from them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonResponse {
    pub completed_lesson: LessonId,
    pub overall_progress: f64,
    pub enrollment_status: EnrollmentStatus,
}

impl CompleteLessonResponse {
    /// Boundary validation mirroring the enrollment conversion
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.overall_progress) || self.overall_progress.is_nan() {
            return Err(Error::InvalidPayload(format!(
                "completion response: progress {} outside [0, 1]",
                self.overall_progress
            )));
        }
        Ok(())
    }
}

// ========================================
// Tests
// ========================================
