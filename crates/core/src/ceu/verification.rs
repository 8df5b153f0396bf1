//! Public certificate verification payload.
//!
//! This payload is linked to by RID and employers, so its shape is part of
//! the public contract. Revoked certificates are reported as revoked, not
//! as missing: an interpreter's audit trail depends on the difference.

use serde::Serialize;

use crate::ceu::{CertificateStatus, ISSUER_NAME};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Active,
    Revoked,
    NotFound,
}

/// Certificate fields exposed to third parties.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedCertificate {
    pub id: DbId,
    pub certificate_number: String,
    pub title: String,
    pub description: Option<String>,
    pub ceu_value: f64,
    pub rid_category: String,
    pub rid_subcategory: Option<String>,
    pub rid_activity_type: String,
    pub completed_at: Timestamp,
    pub issued_at: Timestamp,
    pub status: CertificateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateHolder {
    pub name: String,
    pub rid_member_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationDetails {
    pub verified_at: Timestamp,
    pub verification_url: String,
    pub issuer: &'static str,
    pub sponsor_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub valid: bool,
    pub status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<VerifiedCertificate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<CertificateHolder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationDetails>,
}

impl VerificationResult {
    /// Result for an id that never existed (or could not be parsed).
    pub fn not_found() -> Self {
        Self {
            valid: false,
            status: VerificationStatus::NotFound,
            certificate: None,
            holder: None,
            verification: None,
        }
    }

    /// Build the result for a stored certificate.
    ///
    /// Active certificates carry holder details. Revoked ones keep the
    /// certificate block so the revocation is visible, but drop the holder.
    pub fn from_certificate(
        certificate: VerifiedCertificate,
        holder: CertificateHolder,
        sponsor_number: String,
        public_base_url: &str,
        verified_at: Timestamp,
    ) -> Self {
        let verification = VerificationDetails {
            verified_at,
            verification_url: verification_url(public_base_url, certificate.id),
            issuer: ISSUER_NAME,
            sponsor_number,
        };

        match certificate.status {
            CertificateStatus::Active => Self {
                valid: true,
                status: VerificationStatus::Active,
                certificate: Some(certificate),
                holder: Some(holder),
                verification: Some(verification),
            },
            CertificateStatus::Revoked => Self {
                valid: false,
                status: VerificationStatus::Revoked,
                certificate: Some(certificate),
                holder: None,
                verification: Some(verification),
            },
        }
    }
}

/// Canonical public URL for a certificate.
pub fn verification_url(public_base_url: &str, certificate_id: DbId) -> String {
    format!(
        "{}/verify/{certificate_id}",
        public_base_url.trim_end_matches('/')
    )
}
