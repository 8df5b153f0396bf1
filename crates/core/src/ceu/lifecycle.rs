//! Quiz gate and the per-module certification state machine.
//!
//! A user's progress through one module moves strictly forward:
//!
//! ```text
//! NotStarted -> QuizPassed -> Evaluated -> CertificateIssued -> RidSubmitted
//!                                                 |                  |
//!                                                 +----> Revoked <---+
//! ```
//!
//! The state is never stored directly. It is derived from the progress
//! record and the linked certificate by [`derive_state`].

use serde::Serialize;

use crate::ceu::CertificateStatus;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Progress status strings (user_module_progress.status)
// ---------------------------------------------------------------------------

pub const PROGRESS_IN_PROGRESS: &str = "in_progress";
pub const PROGRESS_QUIZ_FAILED: &str = "quiz_failed";
pub const PROGRESS_QUIZ_PASSED: &str = "quiz_passed";
pub const PROGRESS_EVALUATED: &str = "evaluated";

/// Default quiz pass mark when a module does not configure one.
pub const DEFAULT_PASSING_SCORE: i32 = 80;

/// Quiz scores are percentages.
pub const MAX_QUIZ_SCORE: i32 = 100;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    NotStarted,
    QuizPassed,
    Evaluated,
    CertificateIssued,
    RidSubmitted,
    Revoked,
}

impl LifecycleState {
    fn rank(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::QuizPassed => 1,
            Self::Evaluated => 2,
            Self::CertificateIssued => 3,
            Self::RidSubmitted => 4,
            Self::Revoked => 5,
        }
    }

    /// Whether moving from `self` to `next` is a legal forward transition.
    ///
    /// Each step advances exactly one stage. `Revoked` branches off an
    /// issued certificate (submitted or not) and nothing leaves it.
    pub fn can_advance_to(self, next: LifecycleState) -> bool {
        match (self, next) {
            (Self::Revoked, _) => false,
            (Self::CertificateIssued | Self::RidSubmitted, Self::Revoked) => true,
            (_, Self::Revoked) => false,
            (from, to) => to.rank() == from.rank() + 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::QuizPassed => "QUIZ_PASSED",
            Self::Evaluated => "EVALUATED",
            Self::CertificateIssued => "CERTIFICATE_ISSUED",
            Self::RidSubmitted => "RID_SUBMITTED",
            Self::Revoked => "REVOKED",
        }
    }
}

/// The progress facts the state machine needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressSnapshot {
    pub quiz_passed: bool,
    pub evaluation_completed: bool,
}

/// The certificate facts the state machine needs.
#[derive(Debug, Clone, Copy)]
pub struct CertificateSnapshot {
    pub status: CertificateStatus,
    pub rid_submitted: bool,
}

/// Derive the lifecycle position of one (user, module) pair.
///
/// A certificate, when present, dominates the progress record.
pub fn derive_state(
    progress: Option<&ProgressSnapshot>,
    certificate: Option<&CertificateSnapshot>,
) -> LifecycleState {
    if let Some(cert) = certificate {
        return match (cert.status, cert.rid_submitted) {
            (CertificateStatus::Revoked, _) => LifecycleState::Revoked,
            (CertificateStatus::Active, true) => LifecycleState::RidSubmitted,
            (CertificateStatus::Active, false) => LifecycleState::CertificateIssued,
        };
    }

    match progress {
        Some(p) if p.evaluation_completed => LifecycleState::Evaluated,
        Some(p) if p.quiz_passed => LifecycleState::QuizPassed,
        _ => LifecycleState::NotStarted,
    }
}

// ---------------------------------------------------------------------------
// Quiz gate
// ---------------------------------------------------------------------------

/// Validate a raw quiz percentage.
pub fn validate_quiz_score(score: i32) -> Result<(), CoreError> {
    if !(0..=MAX_QUIZ_SCORE).contains(&score) {
        return Err(CoreError::Validation(format!(
            "Quiz score must be between 0 and {MAX_QUIZ_SCORE}, got {score}"
        )));
    }
    Ok(())
}

/// Whether a score meets the module's pass mark.
pub fn quiz_passed(score: i32, passing_score: i32) -> bool {
    score >= passing_score
}

/// Compute the progress status after a quiz attempt.
///
/// A passed quiz is never downgraded by a later failing attempt, and an
/// evaluated record keeps its status.
pub fn next_progress_status(current: &str, passed: bool) -> &'static str {
    match current {
        PROGRESS_EVALUATED => PROGRESS_EVALUATED,
        PROGRESS_QUIZ_PASSED => PROGRESS_QUIZ_PASSED,
        _ if passed => PROGRESS_QUIZ_PASSED,
        _ => PROGRESS_QUIZ_FAILED,
    }
}

/// Gate in front of the evaluation survey: the quiz must be passed first.
pub fn check_evaluation_eligibility(progress: &ProgressSnapshot) -> Result<(), CoreError> {
    if !progress.quiz_passed {
        return Err(CoreError::PreconditionFailed(
            "quiz must be passed before submitting the evaluation".to_string(),
        ));
    }
    Ok(())
}
