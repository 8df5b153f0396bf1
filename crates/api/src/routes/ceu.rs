//! Learner CEU workflow routes mounted at `/ceu`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ceu;
use crate::state::AppState;

/// ```text
/// GET  /modules                      -> list_modules
/// GET  /modules/{module_id}/status   -> lifecycle_status
/// POST /progress                     -> start_module
/// POST /progress/{id}/quiz           -> record_quiz_result
/// POST /evaluation                   -> submit_evaluation
/// POST /certificate                  -> issue_certificate
/// GET  /certificates                 -> list_my_certificates
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/modules", get(ceu::list_modules))
        .route("/modules/{module_id}/status", get(ceu::lifecycle_status))
        .route("/progress", post(ceu::start_module))
        .route("/progress/{id}/quiz", post(ceu::record_quiz_result))
        .route("/evaluation", post(ceu::submit_evaluation))
        .route("/certificate", post(ceu::issue_certificate))
        .route("/certificates", get(ceu::list_my_certificates))
}
