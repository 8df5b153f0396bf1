//! RID batch submission model.

use interpret_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `rid_submissions` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RidSubmission {
    pub id: DbId,
    pub submitted_by: DbId,
    pub submitted_at: Timestamp,
    pub certificate_ids: Vec<DbId>,
    pub notes: Option<String>,
}

/// Outcome of an attempted batch submission.
#[derive(Debug)]
pub enum RidBatchOutcome {
    /// Every certificate was marked and the batch row was written.
    Submitted(RidSubmission),
    /// Nothing was written. These ids are unknown, revoked, or were already
    /// part of an earlier batch.
    Ineligible(Vec<DbId>),
}
