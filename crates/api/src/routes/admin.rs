//! Admin CEU routes mounted at `/admin`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ceu_admin;
use crate::state::AppState;

/// ```text
/// GET  /ceu-export                     -> export_certificates
/// POST /ceu-export                     -> export_action (summary | mark_submitted)
/// GET  /rid-submissions                -> list_submissions
/// POST /ceu/certificates/{id}/revoke   -> revoke_certificate
/// POST /ceu/modules                    -> create_module
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/ceu-export",
            get(ceu_admin::export_certificates).post(ceu_admin::export_action),
        )
        .route("/rid-submissions", get(ceu_admin::list_submissions))
        .route(
            "/ceu/certificates/{id}/revoke",
            post(ceu_admin::revoke_certificate),
        )
        .route("/ceu/modules", post(ceu_admin::create_module))
}
