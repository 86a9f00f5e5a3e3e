//! Course progress aggregation

use crate::hierarchy::CourseOutline;
use crate::ledger::CompletionLedger;

/// Aggregate progress over a course
///
/// `fraction` keeps full precision for eligibility checks; `percent` is the
/// nearest-whole-percent rendering for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub fraction: f64,
    pub percent: u8,
}

impl Progress {
    pub const ZERO: Progress = Progress {
        fraction: 0.0,
        percent: 0,
    };

    pub fn is_complete(&self) -> bool {
        self.fraction >= 1.0
    }
}

/// Compute completed/total across the entire course.
///
/// An empty course has progress 0, never NaN. Ledger entries for lessons
/// outside the outline do not count: a foreign completion record cannot
/// inflate progress.
pub fn course_progress(outline: &CourseOutline, ledger: &CompletionLedger) -> Progress {
    let total = outline.total_lessons();
    if total == 0 {
        return Progress::ZERO;
    }

    let completed = outline
        .lessons()
        .filter(|l| ledger.is_completed(l.id))
        .count();

    let fraction = completed as f64 / total as f64;
    Progress {
        fraction,
        percent: (fraction * 100.0).round() as u8,
    }
}
