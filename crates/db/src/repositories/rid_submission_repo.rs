//! Repository for the `rid_submissions` table.

use std::collections::BTreeSet;

use interpret_core::ceu::STATUS_ACTIVE;
use interpret_core::types::DbId;
use sqlx::PgPool;

use crate::models::rid_submission::{RidBatchOutcome, RidSubmission};

/// Column list for rid_submissions queries.
const COLUMNS: &str = "id, submitted_by, submitted_at, certificate_ids, notes";

pub struct RidSubmissionRepo;

impl RidSubmissionRepo {
    /// Record a batch submission to RID.
    ///
    /// Sets `rid_submitted_at` on every listed certificate and writes the
    /// batch row in a single transaction. Only active, not yet submitted
    /// certificates qualify; if any listed id does not, the transaction is
    /// rolled back and the offending ids are returned.
    pub async fn create_batch(
        pool: &PgPool,
        submitted_by: DbId,
        certificate_ids: &[DbId],
        notes: Option<&str>,
    ) -> Result<RidBatchOutcome, sqlx::Error> {
        let requested: BTreeSet<DbId> = certificate_ids.iter().copied().collect();
        let ids: Vec<DbId> = requested.iter().copied().collect();

        let mut tx = pool.begin().await?;

        let updated: Vec<(DbId,)> = sqlx::query_as(
            "UPDATE ceu_certificates SET rid_submitted_at = now()
             WHERE id = ANY($1) AND status = $2 AND rid_submitted_at IS NULL
             RETURNING id",
        )
        .bind(&ids)
        .bind(STATUS_ACTIVE)
        .fetch_all(&mut *tx)
        .await?;

        let marked: BTreeSet<DbId> = updated.into_iter().map(|(id,)| id).collect();
        if marked.len() != requested.len() {
            tx.rollback().await?;
            let ineligible = requested.difference(&marked).copied().collect();
            return Ok(RidBatchOutcome::Ineligible(ineligible));
        }

        let query = format!(
            "INSERT INTO rid_submissions (submitted_by, certificate_ids, notes)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let submission = sqlx::query_as::<_, RidSubmission>(&query)
            .bind(submitted_by)
            .bind(&ids)
            .bind(notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RidBatchOutcome::Submitted(submission))
    }

    /// List all batches, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<RidSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rid_submissions ORDER BY submitted_at DESC, id DESC"
        );
        sqlx::query_as::<_, RidSubmission>(&query)
            .fetch_all(pool)
            .await
    }
}
