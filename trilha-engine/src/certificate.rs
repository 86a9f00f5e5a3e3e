//! Certificate eligibility

use trilha_common::models::{Enrollment, EnrollmentStatus};

/// Eligible iff the backend reports the enrollment completed AND progress
/// reached 1.0. Requiring both guards against a stale or partially-synced
/// enrollment record; status alone or progress alone is never enough.
pub fn certificate_eligible(enrollment: &Enrollment) -> bool {
    enrollment.status == EnrollmentStatus::Completed && enrollment.progress >= 1.0
}
