//! Sequential lesson unlocking
//!
//! A lesson is reachable iff every lesson strictly before it in the total
//! (module order, lesson order) order is completed. The one exception is the
//! first lesson of the first module, which is previewable without an
//! enrollment. Once enrolled, every lesson is gated by the sequential rule —
//! the preview exemption does not persist (the first lesson has no
//! predecessors, so it stays accessible anyway).
//!
//! Pure and deterministic: no I/O, no ambient state. Callers evaluate
//! against the last-known-good outline and ledger snapshot.

use trilha_common::models::LessonId;

use crate::hierarchy::CourseOutline;
use crate::ledger::CompletionLedger;

/// Outcome of an access evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The learner may open the lesson
    Granted,
    /// No enrollment, and the lesson is not the previewable first lesson
    NotEnrolled,
    /// Enrolled, but a strictly-prior lesson is not yet completed
    Locked,
    /// The lesson does not belong to this course's outline
    UnknownLesson,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

/// Decide whether a learner may currently open `lesson_id`.
///
/// `ledger` is `None` when the learner has no enrollment for this course.
pub fn evaluate(
    outline: &CourseOutline,
    ledger: Option<&CompletionLedger>,
    lesson_id: LessonId,
) -> AccessDecision {
    let Some((module_pos, lesson_pos)) = outline.locate(lesson_id) else {
        return AccessDecision::UnknownLesson;
    };

    let Some(ledger) = ledger else {
        // Pre-enrollment: only the first lesson of the first module is open
        return if outline.first_lesson() == Some(lesson_id) {
            AccessDecision::Granted
        } else {
            AccessDecision::NotEnrolled
        };
    };

    // Modules strictly before the target's must be fully completed. An empty
    // module is vacuously complete and does not block.
    for module in &outline.modules()[..module_pos] {
        if !module.lessons.iter().all(|l| ledger.is_completed(l.id)) {
            return AccessDecision::Locked;
        }
    }

    // Within the target's module, every lesson with a strictly smaller order
    // must be completed. The target itself need not be: completion happens
    // only after the lesson is viewed.
    let target_module = &outline.modules()[module_pos];
    for lesson in &target_module.lessons[..lesson_pos] {
        if !ledger.is_completed(lesson.id) {
            return AccessDecision::Locked;
        }
    }

    // Modules after the target's are not examined.
    AccessDecision::Granted
}

/// Convenience collapse of [`evaluate`] to a bool
pub fn allows(
    outline: &CourseOutline,
    ledger: Option<&CompletionLedger>,
    lesson_id: LessonId,
) -> bool {
    evaluate(outline, ledger, lesson_id).is_granted()
}
