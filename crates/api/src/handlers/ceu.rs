//! Learner-facing CEU workflow: module progress, quiz gate, evaluation, and
//! certificate issuance.
//!
//! Evaluation and issuance are two separate client calls. The evaluation
//! write leaves a durable `evaluation_completed` flag, and both calls are
//! safe to retry.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use interpret_core::ceu::certificate::{issuance_timestamps, require_evaluation, validate_issue_action};
use interpret_core::ceu::evaluation::EvaluationSubmission;
use interpret_core::ceu::lifecycle::{
    check_evaluation_eligibility, derive_state, quiz_passed, validate_quiz_score, LifecycleState,
};
use interpret_core::error::CoreError;
use interpret_core::types::DbId;
use interpret_db::models::certificate::{Certificate, NewCertificate};
use interpret_db::models::evaluation::Evaluation;
use interpret_db::models::progress::ModuleProgress;
use interpret_db::models::skill_module::SkillModule;
use interpret_db::repositories::{
    CertificateRepo, EvaluationRepo, ProgressRepo, SkillModuleRepo,
};
use interpret_events::{PlatformEvent, EVENT_CERTIFICATE_ISSUED, EVENT_QUIZ_PASSED};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StartModuleRequest {
    pub module_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct QuizResultRequest {
    pub score: i32,
}

#[derive(Debug, Serialize)]
pub struct QuizResultResponse {
    pub progress: ModuleProgress,
    /// Whether this attempt met the pass mark.
    pub passed: bool,
    pub passing_score: i32,
}

#[derive(Debug, Serialize)]
pub struct LifecycleStatusResponse {
    pub module_id: DbId,
    pub state: LifecycleState,
    pub progress: Option<ModuleProgress>,
    pub certificate: Option<Certificate>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub evaluation: Evaluation,
}

#[derive(Debug, Deserialize)]
pub struct IssueCertificateRequest {
    pub action: String,
    pub module_id: DbId,
    pub evaluation_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct IssueCertificateResponse {
    pub success: bool,
    pub certificate: Certificate,
    /// `true` when this call returned a certificate issued earlier.
    pub already_issued: bool,
}

// ---------------------------------------------------------------------------
// Modules and progress
// ---------------------------------------------------------------------------

/// GET /api/v1/ceu/modules
pub async fn list_modules(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let modules = SkillModuleRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: modules }))
}

/// POST /api/v1/ceu/progress
///
/// Start a module, or return the caller's open attempt. 201 when a new
/// attempt was created.
pub async fn start_module(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartModuleRequest>,
) -> AppResult<impl IntoResponse> {
    let module = find_module(&state, input.module_id).await?;
    if !module.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Module {} is not active",
            module.id
        ))));
    }

    user.ensure_profile(&state).await?;
    let (progress, created) = ProgressRepo::start(&state.pool, user.user_id, module.id).await?;

    if created {
        tracing::info!(
            user_id = %user.user_id,
            module_id = %module.id,
            progress_id = %progress.id,
            "Module started",
        );
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(DataResponse { data: progress })))
}

/// POST /api/v1/ceu/progress/{id}/quiz
///
/// Record a quiz attempt against the caller's progress record.
pub async fn record_quiz_result(
    user: AuthUser,
    State(state): State<AppState>,
    Path(progress_id): Path<DbId>,
    Json(input): Json<QuizResultRequest>,
) -> AppResult<impl IntoResponse> {
    validate_quiz_score(input.score)?;

    let progress = find_own_progress(&state, user.user_id, progress_id).await?;
    let module = find_module(&state, progress.module_id).await?;

    let passed = quiz_passed(input.score, module.passing_score);

    let (progress, was_passed) =
        ProgressRepo::record_quiz(&state.pool, progress.id, input.score, passed)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ModuleProgress",
                id: progress_id,
            }))?;

    tracing::info!(
        user_id = %user.user_id,
        progress_id = %progress.id,
        score = input.score,
        passed,
        "Quiz result recorded",
    );

    if passed && !was_passed {
        state.event_bus.publish(
            PlatformEvent::new(EVENT_QUIZ_PASSED)
                .with_source("progress", progress.id)
                .with_actor(user.user_id)
                .with_payload(serde_json::json!({
                    "module_id": module.id,
                    "module_title": module.title,
                })),
        );
    }

    Ok(Json(DataResponse {
        data: QuizResultResponse {
            progress,
            passed,
            passing_score: module.passing_score,
        },
    }))
}

/// GET /api/v1/ceu/modules/{module_id}/status
///
/// Position of the caller in the certification lifecycle for one module.
pub async fn lifecycle_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(module_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let progress = ProgressRepo::find_latest(&state.pool, user.user_id, module_id).await?;
    let certificate =
        CertificateRepo::find_latest_for_module(&state.pool, user.user_id, module_id).await?;

    let state_now = derive_state(
        progress.as_ref().map(ModuleProgress::snapshot).as_ref(),
        certificate.as_ref().map(Certificate::snapshot).as_ref(),
    );

    Ok(Json(DataResponse {
        data: LifecycleStatusResponse {
            module_id,
            state: state_now,
            progress,
            certificate,
        },
    }))
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// POST /api/v1/ceu/evaluation
///
/// Record the post-quiz evaluation. Returns `{ "evaluation": ... }` with 201
/// on first submission and 200 when the same progress record was already
/// evaluated (the stored evaluation is returned unchanged).
pub async fn submit_evaluation(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<EvaluationSubmission>,
) -> AppResult<impl IntoResponse> {
    if input.user_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot submit an evaluation for another user".into(),
        )));
    }

    let evaluation = input.into_validated()?;

    let progress = ProgressRepo::find_by_id(&state.pool, evaluation.progress_id)
        .await?
        .filter(|p| p.user_id == evaluation.user_id && p.module_id == evaluation.module_id)
        .ok_or_else(|| {
            AppError::Core(CoreError::PreconditionFailed(
                "progress record does not match this user and module".into(),
            ))
        })?;
    check_evaluation_eligibility(&progress.snapshot())?;

    let (stored, created) = EvaluationRepo::submit(&state.pool, &evaluation).await?;

    tracing::info!(
        user_id = %stored.user_id,
        module_id = %stored.module_id,
        evaluation_id = %stored.id,
        created,
        average_rating = evaluation.ratings.average(),
        "Evaluation recorded",
    );

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(EvaluationResponse { evaluation: stored })))
}

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

/// POST /api/v1/ceu/certificate
///
/// Issue the certificate for a completed evaluation. Idempotent per
/// evaluation: a repeat call returns the existing certificate with
/// `already_issued: true`.
pub async fn issue_certificate(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<IssueCertificateRequest>,
) -> AppResult<impl IntoResponse> {
    validate_issue_action(&input.action)?;

    let evaluation = require_evaluation(
        EvaluationRepo::find_by_id(&state.pool, input.evaluation_id).await?,
        user.user_id,
        input.module_id,
    )?;

    let module = find_module(&state, input.module_id).await?;

    let (certificate, created) = write_certificate(&state, &evaluation, &module)
        .await
        .map_err(|e| AppError::CertificateGeneration(e.to_string()))?;

    if created {
        tracing::info!(
            user_id = %user.user_id,
            module_id = %module.id,
            certificate_id = %certificate.id,
            certificate_number = %certificate.certificate_number,
            "Certificate issued",
        );
        state.event_bus.publish(
            PlatformEvent::new(EVENT_CERTIFICATE_ISSUED)
                .with_source("certificate", certificate.id)
                .with_actor(user.user_id)
                .with_payload(serde_json::json!({
                    "certificate_number": certificate.certificate_number,
                    "module_id": module.id,
                })),
        );
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(IssueCertificateResponse {
            success: true,
            certificate,
            already_issued: !created,
        }),
    ))
}

/// GET /api/v1/ceu/certificates
pub async fn list_my_certificates(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let certificates = CertificateRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: certificates }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_module(state: &AppState, module_id: DbId) -> AppResult<SkillModule> {
    SkillModuleRepo::find_by_id(&state.pool, module_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SkillModule",
            id: module_id,
        }))
}

/// Load a progress record owned by `user_id`. Records of other users are
/// reported as missing.
async fn find_own_progress(
    state: &AppState,
    user_id: DbId,
    progress_id: DbId,
) -> AppResult<ModuleProgress> {
    ProgressRepo::find_by_id(&state.pool, progress_id)
        .await?
        .filter(|p| p.user_id == user_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ModuleProgress",
            id: progress_id,
        }))
}

/// Snapshot the module onto a new certificate row (or fetch the existing
/// one for this evaluation).
async fn write_certificate(
    state: &AppState,
    evaluation: &Evaluation,
    module: &SkillModule,
) -> Result<(Certificate, bool), sqlx::Error> {
    let assessment_score = ProgressRepo::find_by_id(&state.pool, evaluation.progress_id)
        .await?
        .and_then(|p| p.quiz_score);

    let (issued_at, completed_at) = issuance_timestamps(Utc::now(), evaluation.submitted_at);

    let new_certificate = NewCertificate {
        user_id: evaluation.user_id,
        module_id: module.id,
        evaluation_id: evaluation.id,
        title: module.title.clone(),
        description: module.description.clone(),
        learning_objectives: module.learning_objectives.clone(),
        ceu_value: module.ceu_value,
        rid_category: module.rid_category.clone(),
        rid_subcategory: module.rid_subcategory.clone(),
        rid_activity_type: module.rid_activity_type.clone(),
        sponsor_number: state.config.sponsor_number.clone(),
        completed_at,
        issued_at,
        assessment_score,
    };

    CertificateRepo::issue(&state.pool, &new_certificate).await
}
