//! End-to-end workflow tests against an in-memory backend
//!
//! The mock counts backend calls so the local fail-fast paths (locked
//! lessons, re-completion, ineligible certificate) can assert that no
//! network request was issued.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use trilha_common::api::types::{CompleteLessonRequest, CompleteLessonResponse};
use trilha_common::models::{
    CompletionRecord, Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, Learner,
    Lesson, LessonId, Module, ModuleId, Role, UserId,
};
use trilha_common::{Error, Result};
use trilha_engine::{AccessDecision, CourseApi, EnrollmentWorkflow};

// ========================================
// Test fixtures
// ========================================

fn lesson(id: i64, module_id: i64, order: u32) -> Lesson {
    Lesson {
        id: LessonId(id),
        module_id: ModuleId(module_id),
        order,
    }
}

fn module(id: i64, order: u32, lessons: Vec<Lesson>) -> Module {
    Module {
        id: ModuleId(id),
        course_id: CourseId(1),
        order,
        lessons,
    }
}

fn course(modules: Vec<Module>) -> Course {
    Course {
        id: CourseId(1),
        modules,
    }
}

/// One module (order 1) with two lessons (orders 1, 2)
fn single_module_course() -> Course {
    course(vec![module(
        10,
        1,
        vec![lesson(101, 10, 1), lesson(102, 10, 2)],
    )])
}

/// Two modules with one lesson each
fn two_module_course() -> Course {
    course(vec![
        module(10, 1, vec![lesson(101, 10, 1)]),
        module(20, 2, vec![lesson(201, 20, 1)]),
    ])
}

fn student() -> Learner {
    Learner::new(UserId(7), Role::Student)
}

// ========================================
// Mock backend
// ========================================

#[derive(Debug, Default)]
struct MockState {
    enrollment: Mutex<Option<Enrollment>>,
    completions: Mutex<Vec<CompletionRecord>>,
    enroll_calls: AtomicUsize,
    complete_calls: AtomicUsize,
    certificate_calls: AtomicUsize,
    fail_next_complete: AtomicBool,
}

#[derive(Debug, Clone)]
struct MockApi {
    course: Course,
    state: Arc<MockState>,
}

impl MockApi {
    fn new(course: Course) -> Self {
        Self {
            course,
            state: Arc::new(MockState::default()),
        }
    }

    /// Pre-seed an existing enrollment, as if the learner enrolled earlier
    fn with_enrollment(self, status: EnrollmentStatus, progress: f64) -> Self {
        *self.state.enrollment.lock().unwrap() = Some(Enrollment {
            id: EnrollmentId(500),
            course_id: self.course.id,
            user_id: UserId(7),
            status,
            progress,
        });
        self
    }

    fn total_lessons(&self) -> usize {
        self.course.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

impl CourseApi for MockApi {
    async fn fetch_course(&self, _course_id: CourseId) -> Result<Course> {
        Ok(self.course.clone())
    }

    async fn fetch_enrollment(
        &self,
        _course_id: CourseId,
        _user_id: UserId,
    ) -> Result<Option<Enrollment>> {
        Ok(self.state.enrollment.lock().unwrap().clone())
    }

    async fn fetch_completions(
        &self,
        _enrollment_id: EnrollmentId,
    ) -> Result<Vec<CompletionRecord>> {
        Ok(self.state.completions.lock().unwrap().clone())
    }

    async fn create_enrollment(&self, course_id: CourseId, user_id: UserId) -> Result<Enrollment> {
        self.state.enroll_calls.fetch_add(1, Ordering::SeqCst);

        let mut enrollment = self.state.enrollment.lock().unwrap();
        if enrollment.is_some() {
            // Backend answers 409 when an active enrollment exists
            return Err(Error::AlreadyEnrolled);
        }
        let created = Enrollment {
            id: EnrollmentId(500),
            course_id,
            user_id,
            status: EnrollmentStatus::InProgress,
            progress: 0.0,
        };
        *enrollment = Some(created.clone());
        Ok(created)
    }

    async fn complete_lesson(
        &self,
        _enrollment_id: EnrollmentId,
        request: CompleteLessonRequest,
    ) -> Result<CompleteLessonResponse> {
        self.state.complete_calls.fetch_add(1, Ordering::SeqCst);

        if self.state.fail_next_complete.swap(false, Ordering::SeqCst) {
            return Err(Error::Transport("connection reset".to_string()));
        }

        let mut completions = self.state.completions.lock().unwrap();
        if !completions.iter().any(|r| r.lesson_id == request.lesson_id) {
            completions.push(CompletionRecord {
                lesson_id: request.lesson_id,
                completed_at: Utc::now(),
            });
        }
        let progress = completions.len() as f64 / self.total_lessons() as f64;
        let status = if progress >= 1.0 {
            EnrollmentStatus::Completed
        } else {
            EnrollmentStatus::InProgress
        };

        if let Some(enrollment) = self.state.enrollment.lock().unwrap().as_mut() {
            enrollment.progress = progress;
            enrollment.status = status;
        }

        Ok(CompleteLessonResponse {
            completed_lesson: request.lesson_id,
            overall_progress: progress,
            enrollment_status: status,
        })
    }

    async fn download_certificate(&self, _enrollment_id: EnrollmentId) -> Result<Vec<u8>> {
        self.state.certificate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(b"%PDF-1.7 certificate".to_vec())
    }
}

// ========================================
// Scenarios
// ========================================

#[tokio::test]
async fn test_full_course_lifecycle() {
    let api = MockApi::new(single_module_course());
    let state = api.state.clone();
    let mut workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();

    // Not enrolled: lesson 1 previewable, lesson 2 denied
    assert!(workflow.can_access(LessonId(101)));
    assert_eq!(workflow.access(LessonId(102)), AccessDecision::NotEnrolled);

    workflow.enroll().await.unwrap();
    assert!(workflow.is_enrolled());
    assert_eq!(
        workflow.enrollment().unwrap().status,
        EnrollmentStatus::InProgress
    );

    // Complete lesson 1: lesson 2 unlocks, progress 50%
    let progress = workflow.complete_lesson(LessonId(101)).await.unwrap();
    assert_eq!(progress.percent, 50);
    assert!(workflow.can_access(LessonId(102)));
    assert!(!workflow.certificate_eligible());

    // Complete lesson 2: 100%, status flips, certificate unlocks
    let progress = workflow.complete_lesson(LessonId(102)).await.unwrap();
    assert_eq!(progress.percent, 100);
    assert_eq!(
        workflow.enrollment().unwrap().status,
        EnrollmentStatus::Completed
    );
    assert!(workflow.certificate_eligible());

    let artifact = workflow.download_certificate().await.unwrap();
    assert!(!artifact.is_empty());
    assert_eq!(state.certificate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_locked_lesson_fails_without_network_call() {
    let api = MockApi::new(two_module_course());
    let state = api.state.clone();
    let mut workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();
    workflow.enroll().await.unwrap();

    // Module 2's lesson is locked until module 1 is fully complete
    let err = workflow.complete_lesson(LessonId(201)).await.unwrap_err();
    assert!(matches!(err, Error::LessonLocked));
    assert_eq!(state.complete_calls.load(Ordering::SeqCst), 0);

    // Completing module 1's lesson unlocks module 2's
    workflow.complete_lesson(LessonId(101)).await.unwrap();
    assert!(workflow.can_access(LessonId(201)));
    let progress = workflow.complete_lesson(LessonId(201)).await.unwrap();
    assert_eq!(progress.percent, 100);
}

#[tokio::test]
async fn test_re_enroll_locally_rejected_with_state_unchanged() {
    let api = MockApi::new(single_module_course()).with_enrollment(EnrollmentStatus::InProgress, 0.0);
    let state = api.state.clone();
    let mut workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();

    let before = workflow.enrollment().cloned();
    let err = workflow.enroll().await.unwrap_err();
    assert!(matches!(err, Error::AlreadyEnrolled));
    assert_eq!(workflow.enrollment().cloned(), before);
    // Rejected before reaching the backend
    assert_eq!(state.enroll_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_backend_conflict_surfaces_as_already_enrolled() {
    // The backend has an enrollment this client never saw (e.g. created in
    // another session after our load).
    let api = MockApi::new(single_module_course());
    let state = api.state.clone();
    let mut workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();
    *state.enrollment.lock().unwrap() = Some(Enrollment {
        id: EnrollmentId(999),
        course_id: CourseId(1),
        user_id: UserId(7),
        status: EnrollmentStatus::InProgress,
        progress: 0.0,
    });

    let err = workflow.enroll().await.unwrap_err();
    assert!(matches!(err, Error::AlreadyEnrolled));
    assert!(!workflow.is_enrolled());
}

#[tokio::test]
async fn test_instructor_cannot_enroll() {
    let api = MockApi::new(single_module_course());
    let state = api.state.clone();
    let mut workflow =
        EnrollmentWorkflow::load(api, CourseId(1), Learner::new(UserId(9), Role::Instructor))
            .await
            .unwrap();

    let err = workflow.enroll().await.unwrap_err();
    assert!(matches!(err, Error::NotPermitted(_)));
    assert_eq!(state.enroll_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_complete_requires_enrollment() {
    let api = MockApi::new(single_module_course());
    let state = api.state.clone();
    let mut workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();

    let err = workflow.complete_lesson(LessonId(101)).await.unwrap_err();
    assert!(matches!(err, Error::NotEnrolled));
    assert_eq!(state.complete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_re_completion_is_noop_success_without_network() {
    let api = MockApi::new(single_module_course());
    let state = api.state.clone();
    let mut workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();
    workflow.enroll().await.unwrap();

    let first = workflow.complete_lesson(LessonId(101)).await.unwrap();
    let again = workflow.complete_lesson(LessonId(101)).await.unwrap();

    assert_eq!(first, again);
    assert_eq!(state.complete_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transport_failure_rolls_back_tentative_mark() {
    let api = MockApi::new(single_module_course());
    let state = api.state.clone();
    let mut workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();
    workflow.enroll().await.unwrap();

    state.fail_next_complete.store(true, Ordering::SeqCst);
    let err = workflow.complete_lesson(LessonId(101)).await.unwrap_err();
    assert!(err.is_retryable());

    // Local state untouched: nothing completed, progress still zero
    assert!(!workflow.ledger().is_completed(LessonId(101)));
    assert_eq!(workflow.progress().percent, 0);

    // The caller may retry; the same call now succeeds
    let progress = workflow.complete_lesson(LessonId(101)).await.unwrap();
    assert_eq!(progress.percent, 50);
}

#[tokio::test]
async fn test_canceled_enrollment_rejects_completion() {
    let api = MockApi::new(single_module_course()).with_enrollment(EnrollmentStatus::Canceled, 0.5);
    let state = api.state.clone();
    let mut workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();

    let err = workflow.complete_lesson(LessonId(101)).await.unwrap_err();
    assert!(matches!(err, Error::NotPermitted(_)));
    assert_eq!(state.complete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_completed_enrollment_alone_is_not_certificate_eligible() {
    // Stale record: status says completed but progress never reached 1.0
    let api =
        MockApi::new(single_module_course()).with_enrollment(EnrollmentStatus::Completed, 0.5);
    let state = api.state.clone();
    let workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();

    assert!(!workflow.certificate_eligible());
    let err = workflow.download_certificate().await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(state.certificate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_completions_restore_from_backend_records() {
    let api = MockApi::new(single_module_course()).with_enrollment(EnrollmentStatus::InProgress, 0.5);
    api.state.completions.lock().unwrap().push(CompletionRecord {
        lesson_id: LessonId(101),
        completed_at: Utc::now(),
    });

    let workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();

    assert!(workflow.ledger().is_completed(LessonId(101)));
    assert_eq!(workflow.progress().percent, 50);
    assert!(workflow.can_access(LessonId(102)));
}

#[tokio::test]
async fn test_unsorted_hierarchy_is_canonicalized_on_load() {
    // Backend delivers modules and lessons out of order
    let api = MockApi::new(course(vec![
        module(20, 2, vec![lesson(201, 20, 1)]),
        module(10, 1, vec![lesson(102, 10, 2), lesson(101, 10, 1)]),
    ]));
    let workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();

    // Preview applies to the lesson that sorts first, not the one listed first
    assert!(workflow.can_access(LessonId(101)));
    assert_eq!(workflow.access(LessonId(201)), AccessDecision::NotEnrolled);
}

#[tokio::test]
async fn test_duplicate_order_fails_load_conservatively() {
    let api = MockApi::new(course(vec![
        module(10, 1, vec![lesson(101, 10, 1)]),
        module(20, 1, vec![lesson(201, 20, 1)]),
    ]));

    let err = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InconsistentHierarchy(_)));
}

#[tokio::test]
async fn test_unknown_lesson_completion_is_not_found() {
    let api = MockApi::new(single_module_course());
    let state = api.state.clone();
    let mut workflow = EnrollmentWorkflow::load(api, CourseId(1), student())
        .await
        .unwrap();
    workflow.enroll().await.unwrap();

    let err = workflow.complete_lesson(LessonId(999)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(state.complete_calls.load(Ordering::SeqCst), 0);
}
