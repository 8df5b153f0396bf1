//! Per-user, per-module progress record.

use interpret_core::ceu::lifecycle::{ProgressSnapshot, PROGRESS_EVALUATED, PROGRESS_QUIZ_PASSED};
use serde::Serialize;
use sqlx::FromRow;
use interpret_core::types::{DbId, Timestamp};

/// A row from the `user_module_progress` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ModuleProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub module_id: DbId,
    pub status: String,
    pub quiz_completed: bool,
    pub quiz_score: Option<i32>,
    pub quiz_completed_at: Option<Timestamp>,
    pub evaluation_completed: bool,
    pub evaluation_id: Option<DbId>,
    pub started_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ModuleProgress {
    pub fn quiz_passed(&self) -> bool {
        self.status == PROGRESS_QUIZ_PASSED || self.status == PROGRESS_EVALUATED
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            quiz_passed: self.quiz_passed(),
            evaluation_completed: self.evaluation_completed,
        }
    }
}
