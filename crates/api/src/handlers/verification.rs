//! Public certificate verification.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use interpret_core::ceu::verification::VerificationResult;
use interpret_core::types::DbId;
use interpret_db::repositories::CertificateRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/verify-certificate/{id}
///
/// No authentication. A lookup miss (including an id that is not a UUID)
/// is a 200 with `status: "not_found"`, never a 4xx.
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<VerificationResult>> {
    let Ok(certificate_id) = raw_id.trim().parse::<DbId>() else {
        tracing::debug!(raw_id = %raw_id, "Verification requested for malformed id");
        return Ok(Json(VerificationResult::not_found()));
    };

    let Some(row) = CertificateRepo::find_with_holder(&state.pool, certificate_id).await? else {
        tracing::debug!(certificate_id = %certificate_id, "Verification requested for unknown certificate");
        return Ok(Json(VerificationResult::not_found()));
    };

    let (certificate, holder, sponsor_number) = row.into_verification_parts();
    let result = VerificationResult::from_certificate(
        certificate,
        holder,
        sponsor_number,
        &state.config.public_base_url,
        Utc::now(),
    );

    tracing::info!(
        certificate_id = %certificate_id,
        valid = result.valid,
        "Certificate verified",
    );

    Ok(Json(result))
}
