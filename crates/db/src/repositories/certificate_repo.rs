//! Repository for the `ceu_certificates` table.

use interpret_core::ceu::certificate::{certificate_year, format_certificate_number, issuance_lock_key};
use interpret_core::ceu::{STATUS_ACTIVE, STATUS_REVOKED};
use interpret_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::certificate::{
    Certificate, CertificateExportRow, CertificateWithHolder, NewCertificate,
};

/// Column list for certificate queries.
const COLUMNS: &str = "id, certificate_number, user_id, module_id, evaluation_id, title, \
    description, learning_objectives, ceu_value, rid_category, rid_subcategory, \
    rid_activity_type, sponsor_number, completed_at, issued_at, assessment_score, status, \
    revoked_at, revocation_reason, rid_submitted_at";

/// Same columns qualified with the `c.` alias for joins.
const QUALIFIED_COLUMNS: &str = "c.id, c.certificate_number, c.user_id, c.module_id, \
    c.evaluation_id, c.title, c.description, c.learning_objectives, c.ceu_value, \
    c.rid_category, c.rid_subcategory, c.rid_activity_type, c.sponsor_number, c.completed_at, \
    c.issued_at, c.assessment_score, c.status, c.revoked_at, c.revocation_reason, \
    c.rid_submitted_at";

pub struct CertificateRepo;

impl CertificateRepo {
    /// Find a certificate by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ceu_certificates WHERE id = $1");
        sqlx::query_as::<_, Certificate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the certificate issued for an evaluation, if any.
    pub async fn find_by_evaluation(
        pool: &PgPool,
        evaluation_id: DbId,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ceu_certificates WHERE evaluation_id = $1");
        sqlx::query_as::<_, Certificate>(&query)
            .bind(evaluation_id)
            .fetch_optional(pool)
            .await
    }

    /// Most recently issued certificate for a user and module.
    pub async fn find_latest_for_module(
        pool: &PgPool,
        user_id: DbId,
        module_id: DbId,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ceu_certificates
             WHERE user_id = $1 AND module_id = $2
             ORDER BY issued_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Certificate>(&query)
            .bind(user_id)
            .bind(module_id)
            .fetch_optional(pool)
            .await
    }

    /// All certificates held by a user, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Certificate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ceu_certificates
             WHERE user_id = $1
             ORDER BY issued_at DESC, id DESC"
        );
        sqlx::query_as::<_, Certificate>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Issue a certificate, or return the one already issued for the same
    /// evaluation.
    ///
    /// Issuance for one (user, module) pair is serialized with a
    /// transaction-scoped advisory lock, and `uq_ceu_certificates_evaluation`
    /// backs it up at the constraint level. The certificate number comes
    /// from `ceu_certificate_number_seq`. Returns the certificate and whether
    /// it was newly created.
    pub async fn issue(
        pool: &PgPool,
        input: &NewCertificate,
    ) -> Result<(Certificate, bool), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(issuance_lock_key(input.user_id, input.module_id))
            .execute(&mut *tx)
            .await?;

        let existing_query =
            format!("SELECT {COLUMNS} FROM ceu_certificates WHERE evaluation_id = $1");
        let existing = sqlx::query_as::<_, Certificate>(&existing_query)
            .bind(input.evaluation_id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(existing) = existing {
            tx.commit().await?;
            return Ok((existing, false));
        }

        let (sequence,): (i64,) = sqlx::query_as("SELECT nextval('ceu_certificate_number_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let certificate_number =
            format_certificate_number(certificate_year(input.issued_at), sequence);

        let insert = format!(
            "INSERT INTO ceu_certificates
                (certificate_number, user_id, module_id, evaluation_id, title, description,
                 learning_objectives, ceu_value, rid_category, rid_subcategory,
                 rid_activity_type, sponsor_number, completed_at, issued_at,
                 assessment_score, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {COLUMNS}"
        );
        let certificate = sqlx::query_as::<_, Certificate>(&insert)
            .bind(&certificate_number)
            .bind(input.user_id)
            .bind(input.module_id)
            .bind(input.evaluation_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.learning_objectives)
            .bind(input.ceu_value)
            .bind(&input.rid_category)
            .bind(&input.rid_subcategory)
            .bind(&input.rid_activity_type)
            .bind(&input.sponsor_number)
            .bind(input.completed_at)
            .bind(input.issued_at)
            .bind(input.assessment_score)
            .bind(STATUS_ACTIVE)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((certificate, true))
    }

    /// Revoke an active certificate. Returns `None` when no active
    /// certificate has this ID.
    pub async fn revoke(
        pool: &PgPool,
        id: DbId,
        reason: Option<&str>,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!(
            "UPDATE ceu_certificates SET
                status = $2,
                revoked_at = now(),
                revocation_reason = $3
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Certificate>(&query)
            .bind(id)
            .bind(STATUS_REVOKED)
            .bind(reason)
            .bind(STATUS_ACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Certificate plus holder details for public verification.
    pub async fn find_with_holder(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CertificateWithHolder>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS},
                    COALESCE(p.full_name, '') AS holder_name,
                    p.rid_member_number AS holder_rid_member_number
             FROM ceu_certificates c
             LEFT JOIN profiles p ON p.id = c.user_id
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, CertificateWithHolder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active certificates issued within `[from, to]` (both inclusive),
    /// joined with holder profiles, oldest first.
    ///
    /// Loads the full window without pagination.
    pub async fn list_active_in_window(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<CertificateExportRow>, sqlx::Error> {
        sqlx::query_as::<_, CertificateExportRow>(
            "SELECT c.user_id,
                    COALESCE(p.full_name, '') AS full_name,
                    COALESCE(p.email, '') AS email,
                    p.rid_member_number,
                    c.title,
                    c.ceu_value,
                    c.rid_category,
                    c.rid_subcategory,
                    c.completed_at,
                    c.certificate_number,
                    c.sponsor_number,
                    c.assessment_score
             FROM ceu_certificates c
             LEFT JOIN profiles p ON p.id = c.user_id
             WHERE c.status = $1 AND c.issued_at >= $2 AND c.issued_at <= $3
             ORDER BY c.issued_at ASC, c.certificate_number ASC",
        )
        .bind(STATUS_ACTIVE)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }
}
