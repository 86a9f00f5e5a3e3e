//! Enrollment workflow
//!
//! The only component with side effects: it loads the hierarchy and ledger,
//! reacts to "mark lesson complete", and keeps derived state fresh. Reads
//! are pure and synchronous against the last-known-good snapshot; writes go
//! through the backend collaborator and are applied only from its response.
//!
//! Writes for one enrollment must be serialized. `complete_lesson` takes
//! `&mut self`, so the borrow checker already forbids a second in-flight
//! completion for the same workflow; there is nothing to lock.

use trilha_common::api::types::CompleteLessonRequest;
use trilha_common::models::{
    CourseId, Enrollment, EnrollmentStatus, Learner, LessonId,
};
use trilha_common::{Error, Result};

use crate::access::{self, AccessDecision};
use crate::certificate::certificate_eligible;
use crate::client::CourseApi;
use crate::hierarchy::CourseOutline;
use crate::ledger::CompletionLedger;
use crate::progress::{course_progress, Progress};

/// Per-course workflow state for one learner
///
/// `NOT_ENROLLED → ENROLLED(IN_PROGRESS) → ENROLLED(COMPLETED)`; `CANCELED`
/// is set externally and observed here as a terminal state.
#[derive(Debug)]
pub struct EnrollmentWorkflow<C: CourseApi> {
    api: C,
    learner: Learner,
    outline: CourseOutline,
    enrollment: Option<Enrollment>,
    ledger: CompletionLedger,
}

impl<C: CourseApi> EnrollmentWorkflow<C> {
    /// Load hierarchy and enrollment state for (course, learner).
    ///
    /// The hierarchy and enrollment are fetched concurrently; completion
    /// records follow once the enrollment is known. An inconsistent
    /// hierarchy fails the load, so nothing becomes accessible.
    pub async fn load(api: C, course_id: CourseId, learner: Learner) -> Result<Self> {
        let (course, enrollment) = tokio::join!(
            api.fetch_course(course_id),
            api.fetch_enrollment(course_id, learner.id),
        );
        let outline = CourseOutline::build(course?)?;
        let enrollment = enrollment?;

        let ledger = match &enrollment {
            Some(enrollment) => {
                let records = api.fetch_completions(enrollment.id).await?;
                let ledger = CompletionLedger::from_records(&records);
                // The backend must not report completions for lessons outside
                // this course; warn if it does (the aggregator and evaluator
                // ignore them regardless).
                for record in &records {
                    if !outline.contains_lesson(record.lesson_id) {
                        tracing::warn!(
                            lesson_id = %record.lesson_id,
                            course_id = %course_id,
                            "Completion record for lesson outside course"
                        );
                    }
                }
                ledger
            }
            None => CompletionLedger::new(),
        };

        tracing::debug!(
            course_id = %course_id,
            user_id = %learner.id,
            enrolled = enrollment.is_some(),
            completed = ledger.len(),
            total = outline.total_lessons(),
            "Workflow loaded"
        );

        Ok(Self {
            api,
            learner,
            outline,
            enrollment,
            ledger,
        })
    }

    // ========================================
    // Pure reads
    // ========================================

    pub fn outline(&self) -> &CourseOutline {
        &self.outline
    }

    pub fn ledger(&self) -> &CompletionLedger {
        &self.ledger
    }

    pub fn enrollment(&self) -> Option<&Enrollment> {
        self.enrollment.as_ref()
    }

    pub fn is_enrolled(&self) -> bool {
        self.enrollment.is_some()
    }

    /// Access decision for a lesson, against the current snapshot
    pub fn access(&self, lesson_id: LessonId) -> AccessDecision {
        access::evaluate(&self.outline, self.enrolled_ledger(), lesson_id)
    }

    pub fn can_access(&self, lesson_id: LessonId) -> bool {
        self.access(lesson_id).is_granted()
    }

    /// Aggregate course progress, recomputed from the current snapshot
    pub fn progress(&self) -> Progress {
        course_progress(&self.outline, &self.ledger)
    }

    pub fn certificate_eligible(&self) -> bool {
        self.enrollment
            .as_ref()
            .is_some_and(certificate_eligible)
    }

    fn enrolled_ledger(&self) -> Option<&CompletionLedger> {
        self.enrollment.as_ref().map(|_| &self.ledger)
    }

    // ========================================
    // Writes
    // ========================================

    /// Enroll the learner in the course.
    ///
    /// Fails fast locally when the caller is not a student or an enrollment
    /// is already loaded; the backend's conflict answer maps to the same
    /// `AlreadyEnrolled`. Local state is unchanged on any failure.
    pub async fn enroll(&mut self) -> Result<&Enrollment> {
        if !self.learner.is_student() {
            return Err(Error::NotPermitted(
                "only students can enroll in a course".to_string(),
            ));
        }
        if self.enrollment.is_some() {
            return Err(Error::AlreadyEnrolled);
        }

        let enrollment = self
            .api
            .create_enrollment(self.outline.course_id(), self.learner.id)
            .await?;

        tracing::info!(
            enrollment_id = %enrollment.id,
            course_id = %enrollment.course_id,
            "NOT_ENROLLED -> ENROLLED(IN_PROGRESS)"
        );
        Ok(self.enrollment.insert(enrollment))
    }

    /// Mark a lesson complete.
    ///
    /// Requires an enrollment and an access grant, both checked locally
    /// before any network call. Re-completing an already-completed lesson is
    /// a no-op success with no network call. On transport failure the
    /// tentative ledger mark is rolled back and the retryable error is
    /// surfaced unchanged.
    pub async fn complete_lesson(&mut self, lesson_id: LessonId) -> Result<Progress> {
        let Some(enrollment) = &self.enrollment else {
            return Err(Error::NotEnrolled);
        };

        // Idempotent re-completion, resolved before the status/access gates
        if self.ledger.is_completed(lesson_id) {
            return Ok(self.progress());
        }

        if enrollment.status == EnrollmentStatus::Canceled {
            return Err(Error::NotPermitted(
                "enrollment has been canceled".to_string(),
            ));
        }

        match access::evaluate(&self.outline, Some(&self.ledger), lesson_id) {
            AccessDecision::Granted => {}
            AccessDecision::UnknownLesson => {
                return Err(Error::NotFound(format!(
                    "lesson {lesson_id} is not part of course {}",
                    self.outline.course_id()
                )));
            }
            AccessDecision::Locked | AccessDecision::NotEnrolled => {
                return Err(Error::LessonLocked);
            }
        }

        let module_id = self
            .outline
            .module_of(lesson_id)
            .map(|m| m.id)
            .ok_or_else(|| Error::NotFound(format!("lesson {lesson_id} has no module")))?;
        let request = CompleteLessonRequest {
            course_id: self.outline.course_id(),
            module_id,
            lesson_id,
        };
        let enrollment_id = enrollment.id;

        // Tentative transition: optimistic mark, rolled back if the write
        // does not reach the backend.
        self.ledger.mark_completed(lesson_id);

        let response = match self.api.complete_lesson(enrollment_id, request).await {
            Ok(response) => response,
            Err(err) => {
                self.ledger.retract(lesson_id);
                tracing::warn!(
                    lesson_id = %lesson_id,
                    error = %err,
                    "Lesson completion rolled back"
                );
                return Err(err);
            }
        };

        // Reconcile from the authoritative response. Progress never moves
        // backwards even if the backend reports a stale value.
        if let Some(enrollment) = &mut self.enrollment {
            let was_completed = enrollment.status == EnrollmentStatus::Completed;
            enrollment.progress = enrollment.progress.max(response.overall_progress);
            enrollment.status = response.enrollment_status;
            if response.overall_progress >= 1.0 {
                enrollment.status = EnrollmentStatus::Completed;
            }
            if !was_completed && enrollment.status == EnrollmentStatus::Completed {
                tracing::info!(
                    enrollment_id = %enrollment.id,
                    "ENROLLED(IN_PROGRESS) -> ENROLLED(COMPLETED)"
                );
            }
        }

        Ok(self.progress())
    }

    /// Download the completion certificate.
    ///
    /// Only issued when certificate eligibility holds; ineligible calls fail
    /// fast locally with no network round-trip.
    pub async fn download_certificate(&self) -> Result<Vec<u8>> {
        let Some(enrollment) = &self.enrollment else {
            return Err(Error::NotEnrolled);
        };
        if !certificate_eligible(enrollment) {
            return Err(Error::NotFound(
                "certificate not available until the course is completed".to_string(),
            ));
        }
        self.api.download_certificate(enrollment.id).await
    }
}
