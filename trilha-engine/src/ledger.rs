//! Completion ledger for one enrollment

use std::collections::HashSet;

use trilha_common::models::{CompletionRecord, LessonId};

/// The set of lesson identifiers completed within one enrollment.
///
/// Derived from the backend's append-only completion records; locally a
/// lesson is only ever added, never removed. The single exception is
/// [`retract`](Self::retract), which reverts a tentative mark after a
/// transport failure so local state never runs ahead of the backend.
#[derive(Debug, Clone, Default)]
pub struct CompletionLedger {
    completed: HashSet<LessonId>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the ledger from fetched completion records
    pub fn from_records(records: &[CompletionRecord]) -> Self {
        Self {
            completed: records.iter().map(|r| r.lesson_id).collect(),
        }
    }

    pub fn is_completed(&self, lesson_id: LessonId) -> bool {
        self.completed.contains(&lesson_id)
    }

    /// Mark a lesson completed. Idempotent: marking an already-completed
    /// lesson is a no-op, never an error. Returns whether the mark was
    /// newly inserted.
    pub fn mark_completed(&mut self, lesson_id: LessonId) -> bool {
        self.completed.insert(lesson_id)
    }

    /// Revert a tentative mark. Only the enrollment workflow calls this,
    /// and only for a mark it inserted itself in the same operation.
    pub(crate) fn retract(&mut self, lesson_id: LessonId) {
        self.completed.remove(&lesson_id);
    }

    /// Read-only view for the progress aggregator
    pub fn snapshot(&self) -> &HashSet<LessonId> {
        &self.completed
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_mark_completed_is_idempotent() {
        let mut ledger = CompletionLedger::new();

        assert!(ledger.mark_completed(LessonId(1)));
        let once = ledger.snapshot().clone();

        assert!(!ledger.mark_completed(LessonId(1)));
        assert_eq!(ledger.snapshot(), &once);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_from_records() {
        let records = vec![
            CompletionRecord {
                lesson_id: LessonId(1),
                completed_at: Utc::now(),
            },
            CompletionRecord {
                lesson_id: LessonId(3),
                completed_at: Utc::now(),
            },
        ];
        let ledger = CompletionLedger::from_records(&records);

        assert!(ledger.is_completed(LessonId(1)));
        assert!(!ledger.is_completed(LessonId(2)));
        assert!(ledger.is_completed(LessonId(3)));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_retract_reverts_tentative_mark() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_completed(LessonId(5));
        ledger.retract(LessonId(5));

        assert!(!ledger.is_completed(LessonId(5)));
        assert!(ledger.is_empty());
    }
}
