//! Repository for the `ceu_evaluations` table.

use interpret_core::ceu::evaluation::ValidatedEvaluation;
use interpret_core::types::DbId;
use sqlx::PgPool;

use crate::models::evaluation::Evaluation;
use crate::repositories::ProgressRepo;

/// Column list for evaluation queries.
const COLUMNS: &str = "id, user_id, module_id, progress_id, objectives_clear, content_relevant, \
    applicable_to_work, presenter_effective, most_valuable, suggestions, submitted_at";

pub struct EvaluationRepo;

impl EvaluationRepo {
    /// Find an evaluation by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Evaluation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ceu_evaluations WHERE id = $1");
        sqlx::query_as::<_, Evaluation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the evaluation recorded for a progress attempt, if any.
    pub async fn find_by_progress_id(
        pool: &PgPool,
        progress_id: DbId,
    ) -> Result<Option<Evaluation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ceu_evaluations WHERE progress_id = $1");
        sqlx::query_as::<_, Evaluation>(&query)
            .bind(progress_id)
            .fetch_optional(pool)
            .await
    }

    /// Persist an evaluation and mark its progress record as evaluated,
    /// both in one transaction.
    ///
    /// If an evaluation already exists for the progress record, it is kept
    /// as-is and only the progress update is re-applied. Returns the
    /// evaluation and whether it was newly created.
    pub async fn submit(
        pool: &PgPool,
        input: &ValidatedEvaluation,
    ) -> Result<(Evaluation, bool), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO ceu_evaluations
                (user_id, module_id, progress_id, objectives_clear, content_relevant,
                 applicable_to_work, presenter_effective, most_valuable, suggestions)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT ON CONSTRAINT uq_ceu_evaluations_progress DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Evaluation>(&insert)
            .bind(input.user_id)
            .bind(input.module_id)
            .bind(input.progress_id)
            .bind(input.ratings.objectives_clear)
            .bind(input.ratings.content_relevant)
            .bind(input.ratings.applicable_to_work)
            .bind(input.ratings.presenter_effective)
            .bind(&input.most_valuable)
            .bind(&input.suggestions)
            .fetch_optional(&mut *tx)
            .await?;

        let (evaluation, created) = match inserted {
            Some(evaluation) => (evaluation, true),
            None => {
                let select =
                    format!("SELECT {COLUMNS} FROM ceu_evaluations WHERE progress_id = $1");
                let existing = sqlx::query_as::<_, Evaluation>(&select)
                    .bind(input.progress_id)
                    .fetch_one(&mut *tx)
                    .await?;
                (existing, false)
            }
        };

        ProgressRepo::mark_evaluated(&mut *tx, input.progress_id, evaluation.id).await?;

        tx.commit().await?;

        if !created {
            tracing::debug!(
                evaluation_id = %evaluation.id,
                progress_id = %input.progress_id,
                "Evaluation already recorded; progress update re-applied"
            );
        }
        Ok((evaluation, created))
    }
}
