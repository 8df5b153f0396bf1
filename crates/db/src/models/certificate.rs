//! CEU certificate model and the joined read models built on it.

use interpret_core::ceu::export::ExportSource;
use interpret_core::ceu::lifecycle::CertificateSnapshot;
use interpret_core::ceu::verification::{CertificateHolder, VerifiedCertificate};
use interpret_core::ceu::CertificateStatus;
use interpret_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `ceu_certificates` table.
///
/// Module fields (`title` through `rid_activity_type`) are a snapshot taken
/// at issuance; later module edits do not change them.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Certificate {
    pub id: DbId,
    pub certificate_number: String,
    pub user_id: DbId,
    pub module_id: DbId,
    pub evaluation_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub learning_objectives: Vec<String>,
    pub ceu_value: f64,
    pub rid_category: String,
    pub rid_subcategory: Option<String>,
    pub rid_activity_type: String,
    pub sponsor_number: String,
    pub completed_at: Timestamp,
    pub issued_at: Timestamp,
    pub assessment_score: Option<i32>,
    pub status: String,
    pub revoked_at: Option<Timestamp>,
    pub revocation_reason: Option<String>,
    pub rid_submitted_at: Option<Timestamp>,
}

impl Certificate {
    /// Parsed status; unknown values are treated as revoked.
    pub fn status(&self) -> CertificateStatus {
        CertificateStatus::from_str_value(&self.status).unwrap_or(CertificateStatus::Revoked)
    }

    pub fn snapshot(&self) -> CertificateSnapshot {
        CertificateSnapshot {
            status: self.status(),
            rid_submitted: self.rid_submitted_at.is_some(),
        }
    }
}

/// Insert DTO for a new certificate. The certificate number is assigned
/// by the repository from the database sequence.
#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub user_id: DbId,
    pub module_id: DbId,
    pub evaluation_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub learning_objectives: Vec<String>,
    pub ceu_value: f64,
    pub rid_category: String,
    pub rid_subcategory: Option<String>,
    pub rid_activity_type: String,
    pub sponsor_number: String,
    pub completed_at: Timestamp,
    pub issued_at: Timestamp,
    pub assessment_score: Option<i32>,
}

/// Certificate joined with the holder's profile for export and reporting.
#[derive(Debug, Clone, FromRow)]
pub struct CertificateExportRow {
    pub user_id: DbId,
    pub full_name: String,
    pub email: String,
    pub rid_member_number: Option<String>,
    pub title: String,
    pub ceu_value: f64,
    pub rid_category: String,
    pub rid_subcategory: Option<String>,
    pub completed_at: Timestamp,
    pub certificate_number: String,
    pub sponsor_number: String,
    pub assessment_score: Option<i32>,
}

impl From<CertificateExportRow> for ExportSource {
    fn from(row: CertificateExportRow) -> Self {
        ExportSource {
            user_id: row.user_id,
            full_name: row.full_name,
            email: row.email,
            rid_member_number: row.rid_member_number,
            title: row.title,
            ceu_value: row.ceu_value,
            rid_category: row.rid_category,
            rid_subcategory: row.rid_subcategory,
            completed_at: row.completed_at,
            certificate_number: row.certificate_number,
            sponsor_number: row.sponsor_number,
            assessment_score: row.assessment_score,
        }
    }
}

/// Certificate joined with holder name and RID number for verification.
#[derive(Debug, Clone, FromRow)]
pub struct CertificateWithHolder {
    #[sqlx(flatten)]
    pub certificate: Certificate,
    pub holder_name: String,
    pub holder_rid_member_number: Option<String>,
}

impl CertificateWithHolder {
    /// Split into the public verification parts plus the sponsor number.
    pub fn into_verification_parts(self) -> (VerifiedCertificate, CertificateHolder, String) {
        let status = self.certificate.status();
        let c = self.certificate;
        let verified = VerifiedCertificate {
            id: c.id,
            certificate_number: c.certificate_number,
            title: c.title,
            description: c.description,
            ceu_value: c.ceu_value,
            rid_category: c.rid_category,
            rid_subcategory: c.rid_subcategory,
            rid_activity_type: c.rid_activity_type,
            completed_at: c.completed_at,
            issued_at: c.issued_at,
            status,
            revoked_at: c.revoked_at,
        };
        let holder = CertificateHolder {
            name: self.holder_name,
            rid_member_number: self.holder_rid_member_number,
        };
        (verified, holder, c.sponsor_number)
    }
}
