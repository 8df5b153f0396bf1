//! CEU evaluation model.

use serde::Serialize;
use sqlx::FromRow;
use interpret_core::ceu::certificate::{EvaluationOwnership, OwnedEvaluation};
use interpret_core::types::{DbId, Timestamp};

/// A row from the `ceu_evaluations` table. Immutable after insert.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Evaluation {
    pub id: DbId,
    pub user_id: DbId,
    pub module_id: DbId,
    pub progress_id: DbId,
    pub objectives_clear: i16,
    pub content_relevant: i16,
    pub applicable_to_work: i16,
    pub presenter_effective: i16,
    pub most_valuable: Option<String>,
    pub suggestions: Option<String>,
    pub submitted_at: Timestamp,
}

impl OwnedEvaluation for Evaluation {
    fn ownership(&self) -> EvaluationOwnership {
        EvaluationOwnership {
            user_id: self.user_id,
            module_id: self.module_id,
        }
    }
}
