//! Certificate numbering and issuance rules.

use chrono::Datelike;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Prefix of every certificate number.
pub const CERTIFICATE_PREFIX: &str = "IR";

/// Width of the zero-padded sequence part of a certificate number.
pub const SEQUENCE_WIDTH: usize = 6;

/// The only action accepted by the issuance endpoint.
pub const ACTION_ISSUE_AFTER_EVALUATION: &str = "issue_certificate_after_evaluation";

/// Message shown when the evaluation was saved but issuance then failed.
pub const PARTIAL_FAILURE_MESSAGE: &str =
    "Evaluation saved, but certificate generation failed. Please contact support.";

/// Format a certificate number, e.g. `IR-2026-000042`.
///
/// The sequence value must come from the database so that numbers are
/// globally unique; this function only renders it.
pub fn format_certificate_number(year: i32, sequence: i64) -> String {
    format!("{CERTIFICATE_PREFIX}-{year}-{sequence:0width$}", width = SEQUENCE_WIDTH)
}

/// Key used to serialize issuance for one (user, module) pair.
pub fn issuance_lock_key(user_id: DbId, module_id: DbId) -> String {
    format!("{user_id}:{module_id}")
}

/// Compute `(issued_at, completed_at)` for a new certificate.
///
/// The completion date is the evaluation submission time. The issue time is
/// `now` but never earlier than the evaluation, so a certificate can never
/// appear to predate its evaluation even under clock skew.
pub fn issuance_timestamps(now: Timestamp, evaluation_submitted_at: Timestamp) -> (Timestamp, Timestamp) {
    (now.max(evaluation_submitted_at), evaluation_submitted_at)
}

/// Year component used in the certificate number.
pub fn certificate_year(issued_at: Timestamp) -> i32 {
    issued_at.year()
}

/// Owner/module facts of a stored evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationOwnership {
    pub user_id: DbId,
    pub module_id: DbId,
}

/// Anything that can report who submitted an evaluation and for which module.
pub trait OwnedEvaluation {
    fn ownership(&self) -> EvaluationOwnership;
}

impl OwnedEvaluation for EvaluationOwnership {
    fn ownership(&self) -> EvaluationOwnership {
        *self
    }
}

/// Enforce "no certificate without evaluation".
///
/// The evaluation must exist and belong to the requesting user and module.
/// Any mismatch is reported the same way as a missing evaluation so callers
/// cannot enumerate other users' evaluation ids.
pub fn require_evaluation<E: OwnedEvaluation>(
    evaluation: Option<E>,
    user_id: DbId,
    module_id: DbId,
) -> Result<E, CoreError> {
    match evaluation {
        Some(e) if e.ownership().user_id == user_id && e.ownership().module_id == module_id => Ok(e),
        _ => Err(CoreError::PreconditionFailed(
            "evaluation required before certificate".to_string(),
        )),
    }
}

/// Validate the issuance request action string.
pub fn validate_issue_action(action: &str) -> Result<(), CoreError> {
    if action != ACTION_ISSUE_AFTER_EVALUATION {
        return Err(CoreError::Validation(format!(
            "Unsupported action '{action}'. Expected '{ACTION_ISSUE_AFTER_EVALUATION}'"
        )));
    }
    Ok(())
}
