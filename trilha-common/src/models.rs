//! Domain models for the course progression engine
//!
//! These are validated in-memory snapshots, produced from the wire DTOs in
//! [`crate::api::types`]. Hierarchy entities are read-only once loaded;
//! `Enrollment` is mutated only by the enrollment workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(
    /// Backend-assigned course identifier
    CourseId
);
id_newtype!(
    /// Backend-assigned module identifier
    ModuleId
);
id_newtype!(
    /// Backend-assigned lesson identifier
    LessonId
);
id_newtype!(
    /// Backend-assigned enrollment identifier
    EnrollmentId
);
id_newtype!(
    /// Backend-assigned user identifier
    UserId
);

/// A single lesson within a module
///
/// `order` is a positive integer, unique within the owning module. The
/// engine sorts lessons by it; the backend is not required to deliver them
/// pre-sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: LessonId,
    pub module_id: ModuleId,
    pub order: u32,
}

/// A module within a course, carrying its (possibly unsorted) lessons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: ModuleId,
    pub course_id: CourseId,
    pub order: u32,
    pub lessons: Vec<Lesson>,
}

/// A course hierarchy snapshot: modules with nested lessons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub modules: Vec<Module>,
}

/// Enrollment status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    InProgress,
    Completed,
    Canceled,
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentStatus::InProgress => write!(f, "IN_PROGRESS"),
            EnrollmentStatus::Completed => write!(f, "COMPLETED"),
            EnrollmentStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// The record linking one learner to one course
///
/// `progress` is a fraction in `[0.0, 1.0]` and is monotonically
/// non-decreasing over the life of the enrollment (completions only add).
/// Status transitions to `Completed` when progress reaches 1.0; `Canceled`
/// is terminal and set only through an external action.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub course_id: CourseId,
    pub user_id: UserId,
    pub status: EnrollmentStatus,
    pub progress: f64,
}

impl Enrollment {
    /// Whether this enrollment still accepts lesson completions
    pub fn is_active(&self) -> bool {
        matches!(self.status, EnrollmentStatus::InProgress)
    }
}

/// One completed lesson within an enrollment. Append-only: a lesson, once
/// completed, is never un-completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub lesson_id: LessonId,
    pub completed_at: DateTime<Utc>,
}

/// Principal role, from the platform's auth layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Instructor,
}

/// The learner principal, passed explicitly into the engine.
///
/// The engine never reads ambient session state; whoever constructs the
/// workflow supplies the current user id and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Learner {
    pub id: UserId,
    pub role: Role,
}

impl Learner {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_student(&self) -> bool {
        matches!(self.role, Role::Student)
    }
}
