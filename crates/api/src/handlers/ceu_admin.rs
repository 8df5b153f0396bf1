//! Admin CEU endpoints: RID export and reporting, batch submission
//! tracking, revocation, and module definitions.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use interpret_core::ceu::export::{
    build_records, export_filename, export_window, write_csv, ExportFormat, ExportSource,
    RidExportRecord,
};
use interpret_core::ceu::lifecycle::MAX_QUIZ_SCORE;
use interpret_core::ceu::summary::{summarize, CeuSummary};
use interpret_core::ceu::RidCategory;
use interpret_core::error::CoreError;
use interpret_core::types::DbId;
use interpret_db::models::rid_submission::RidBatchOutcome;
use interpret_db::models::skill_module::CreateSkillModule;
use interpret_db::repositories::{CertificateRepo, RidSubmissionRepo, SkillModuleRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub format: ExportFormat,
    pub activity_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportJsonResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count: usize,
    pub records: Vec<RidExportRecord>,
}

/// Body of `POST /admin/ceu-export`, dispatched on `action`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ExportAction {
    Summary {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    MarkSubmitted {
        certificate_ids: Vec<DbId>,
        notes: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub summary: CeuSummary,
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Export and reporting
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/ceu-export?start_date=&end_date=&format=csv|json&activity_number=
///
/// Active certificates issued in the window, in RID batch-upload layout.
pub async fn export_certificates(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let (start, end) = required_window(query.start_date, query.end_date)?;
    let sources = load_window(&state, start, end).await?;
    let records = build_records(&sources, query.activity_number.as_deref());

    tracing::info!(
        admin_id = %admin.user_id,
        %start,
        %end,
        rows = records.len(),
        format = ?query.format,
        "CEU export generated",
    );

    match query.format {
        ExportFormat::Csv => {
            let body = write_csv(&records)?;
            let disposition = format!("attachment; filename=\"{}\"", export_filename(start, end));
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
        ExportFormat::Json => Ok(Json(DataResponse {
            data: ExportJsonResponse {
                start_date: start,
                end_date: end,
                count: records.len(),
                records,
            },
        })
        .into_response()),
    }
}

/// POST /api/v1/admin/ceu-export
///
/// `{"action": "summary", ...}` returns window statistics;
/// `{"action": "mark_submitted", ...}` records a RID batch.
pub async fn export_action(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(action): Json<ExportAction>,
) -> AppResult<Response> {
    match action {
        ExportAction::Summary {
            start_date,
            end_date,
        } => {
            let sources = load_window(&state, start_date, end_date).await?;
            let summary = summarize(&sources);
            Ok(Json(DataResponse {
                data: SummaryResponse {
                    start_date,
                    end_date,
                    summary,
                },
            })
            .into_response())
        }
        ExportAction::MarkSubmitted {
            certificate_ids,
            notes,
        } => {
            if certificate_ids.is_empty() {
                return Err(AppError::Core(CoreError::Validation(
                    "certificate_ids must not be empty".into(),
                )));
            }

            // Allowlisted admins may have no profile yet; the batch row
            // references one.
            admin.ensure_profile(&state).await?;

            let outcome = RidSubmissionRepo::create_batch(
                &state.pool,
                admin.user_id,
                &certificate_ids,
                notes.as_deref(),
            )
            .await?;

            match outcome {
                RidBatchOutcome::Submitted(submission) => {
                    tracing::info!(
                        admin_id = %admin.user_id,
                        submission_id = %submission.id,
                        certificates = submission.certificate_ids.len(),
                        "RID batch recorded",
                    );
                    Ok((StatusCode::CREATED, Json(DataResponse { data: submission }))
                        .into_response())
                }
                RidBatchOutcome::Ineligible(ids) => {
                    let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                    Err(AppError::Core(CoreError::Conflict(format!(
                        "Certificates not eligible for RID submission \
                         (unknown, revoked, or already submitted): {}",
                        ids.join(", ")
                    ))))
                }
            }
        }
    }
}

/// GET /api/v1/admin/rid-submissions
pub async fn list_submissions(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let submissions = RidSubmissionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: submissions }))
}

// ---------------------------------------------------------------------------
// Certificates and modules
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/ceu/certificates/{id}/revoke
pub async fn revoke_certificate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(certificate_id): Path<DbId>,
    Json(input): Json<RevokeRequest>,
) -> AppResult<impl IntoResponse> {
    let reason = input
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let Some(certificate) =
        CertificateRepo::revoke(&state.pool, certificate_id, reason.as_deref()).await?
    else {
        return match CertificateRepo::find_by_id(&state.pool, certificate_id).await? {
            Some(_) => Err(AppError::Core(CoreError::Conflict(format!(
                "Certificate {certificate_id} is already revoked"
            )))),
            None => Err(AppError::Core(CoreError::NotFound {
                entity: "Certificate",
                id: certificate_id,
            })),
        };
    };

    tracing::info!(
        admin_id = %admin.user_id,
        certificate_id = %certificate.id,
        certificate_number = %certificate.certificate_number,
        "Certificate revoked",
    );

    Ok(Json(DataResponse { data: certificate }))
}

/// POST /api/v1/admin/ceu/modules
pub async fn create_module(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateSkillModule>,
) -> AppResult<impl IntoResponse> {
    validate_module(&input)?;

    let module = SkillModuleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        admin_id = %admin.user_id,
        module_id = %module.id,
        title = %module.title,
        "Skill module created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: module })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn required_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), CoreError> {
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(CoreError::Validation(
            "start_date and end_date are required (YYYY-MM-DD)".into(),
        )),
    }
}

async fn load_window(
    state: &AppState,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<ExportSource>> {
    let (from, to) = export_window(start, end)?;
    let rows = CertificateRepo::list_active_in_window(&state.pool, from, to).await?;
    Ok(rows.into_iter().map(ExportSource::from).collect())
}

fn validate_module(input: &CreateSkillModule) -> Result<(), CoreError> {
    if input.title.trim().is_empty() {
        return Err(CoreError::Validation("title must not be empty".into()));
    }
    if input.ceu_value.is_nan() || input.ceu_value <= 0.0 {
        return Err(CoreError::Validation("ceu_value must be positive".into()));
    }
    RidCategory::from_str_value(&input.rid_category).map_err(CoreError::Validation)?;
    if let Some(score) = input.passing_score {
        if !(0..=MAX_QUIZ_SCORE).contains(&score) {
            return Err(CoreError::Validation(format!(
                "passing_score must be between 0 and {MAX_QUIZ_SCORE}"
            )));
        }
    }
    Ok(())
}
