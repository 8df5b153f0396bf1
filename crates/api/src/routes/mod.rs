pub mod admin;
pub mod ceu;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers::verification;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ceu/modules                          list active modules (auth)
/// /ceu/modules/{module_id}/status       lifecycle position (auth)
/// /ceu/progress                         start module (auth)
/// /ceu/progress/{id}/quiz               record quiz attempt (auth)
/// /ceu/evaluation                       submit evaluation (auth)
/// /ceu/certificate                      issue certificate (auth)
/// /ceu/certificates                     my certificates (auth)
///
/// /verify-certificate/{id}              public verification
///
/// /admin/ceu-export                     export (GET), summary / mark_submitted (POST)
/// /admin/rid-submissions                RID batch history
/// /admin/ceu/certificates/{id}/revoke   revoke certificate
/// /admin/ceu/modules                    create module definition
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/ceu", ceu::router())
        .nest("/admin", admin::router())
        .route(
            "/verify-certificate/{id}",
            get(verification::verify_certificate),
        )
}
