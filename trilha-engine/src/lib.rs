//! # Trilha Progression Engine
//!
//! Course progression and access-control logic for the Trilha e-learning
//! platform:
//! - Canonical course outline (modules and lessons sorted by order)
//! - Completion ledger per enrollment
//! - Sequential lesson unlocking
//! - Progress aggregation and certificate eligibility
//! - Enrollment workflow against the backend REST API

pub mod access;
pub mod certificate;
pub mod client;
pub mod hierarchy;
pub mod ledger;
pub mod progress;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testutil;

pub use access::{allows, evaluate, AccessDecision};
pub use certificate::certificate_eligible;
pub use client::{CourseApi, HttpCourseApi};
pub use hierarchy::CourseOutline;
pub use ledger::CompletionLedger;
pub use progress::{course_progress, Progress};
pub use workflow::EnrollmentWorkflow;
