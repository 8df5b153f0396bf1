//! Repository for the `user_module_progress` table.

use interpret_core::ceu::lifecycle::{next_progress_status, PROGRESS_EVALUATED, PROGRESS_IN_PROGRESS};
use interpret_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::progress::ModuleProgress;

/// Column list for progress queries.
const COLUMNS: &str = "id, user_id, module_id, status, quiz_completed, quiz_score, \
    quiz_completed_at, evaluation_completed, evaluation_id, started_at, updated_at";

pub struct ProgressRepo;

impl ProgressRepo {
    /// Find a progress record by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ModuleProgress>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_module_progress WHERE id = $1");
        sqlx::query_as::<_, ModuleProgress>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent progress record for a user and module.
    pub async fn find_latest(
        pool: &PgPool,
        user_id: DbId,
        module_id: DbId,
    ) -> Result<Option<ModuleProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_module_progress
             WHERE user_id = $1 AND module_id = $2
             ORDER BY started_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ModuleProgress>(&query)
            .bind(user_id)
            .bind(module_id)
            .fetch_optional(pool)
            .await
    }

    /// Return the open (not yet evaluated) attempt for a user and module,
    /// creating one if none exists.
    pub async fn start(
        pool: &PgPool,
        user_id: DbId,
        module_id: DbId,
    ) -> Result<(ModuleProgress, bool), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock_key = format!("progress:{user_id}:{module_id}");
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&lock_key)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM user_module_progress
             WHERE user_id = $1 AND module_id = $2 AND NOT evaluation_completed
             ORDER BY started_at DESC
             LIMIT 1"
        );
        let open = sqlx::query_as::<_, ModuleProgress>(&query)
            .bind(user_id)
            .bind(module_id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(existing) = open {
            tx.commit().await?;
            return Ok((existing, false));
        }

        let query = format!(
            "INSERT INTO user_module_progress (user_id, module_id, status)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, ModuleProgress>(&query)
            .bind(user_id)
            .bind(module_id)
            .bind(PROGRESS_IN_PROGRESS)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((created, true))
    }

    /// Store a quiz attempt and advance the status.
    ///
    /// The row is locked while the next status is computed, so concurrent
    /// attempts apply one after another: a passed quiz is never downgraded
    /// and the best score is kept. Returns the updated record and whether
    /// the quiz had already been passed before this attempt.
    pub async fn record_quiz(
        pool: &PgPool,
        id: DbId,
        score: i32,
        passed: bool,
    ) -> Result<Option<(ModuleProgress, bool)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM user_module_progress WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, ModuleProgress>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let was_passed = current.quiz_passed();

        let query = format!(
            "UPDATE user_module_progress SET
                quiz_completed = true,
                quiz_score = GREATEST(COALESCE(quiz_score, 0), $2),
                quiz_completed_at = now(),
                status = $3,
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let progress = sqlx::query_as::<_, ModuleProgress>(&query)
            .bind(id)
            .bind(score)
            .bind(next_progress_status(&current.status, passed))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((progress, was_passed)))
    }

    /// Link an evaluation and flip `evaluation_completed`.
    ///
    /// Takes a connection so it can run inside the evaluation transaction.
    /// Re-running it for the same evaluation is a no-op in effect.
    pub async fn mark_evaluated(
        conn: &mut PgConnection,
        id: DbId,
        evaluation_id: DbId,
    ) -> Result<ModuleProgress, sqlx::Error> {
        let query = format!(
            "UPDATE user_module_progress SET
                evaluation_completed = true,
                evaluation_id = $2,
                status = $3,
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModuleProgress>(&query)
            .bind(id)
            .bind(evaluation_id)
            .bind(PROGRESS_EVALUATED)
            .fetch_one(conn)
            .await
    }
}
