//! Admin authorization extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use interpret_core::error::CoreError;
use interpret_core::roles::{email_in_allowlist, is_admin};
use interpret_db::repositories::ProfileRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an admin. Rejects with 403 Forbidden otherwise.
///
/// A caller is an admin when their token email is in `ADMIN_EMAILS` or their
/// profile role is `admin` / `super_admin`. The allowlist is checked first
/// and skips the profile lookup.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let email = user.email.as_deref();
        let allowlist = &state.config.admin_emails;

        let role = if email.is_some_and(|e| email_in_allowlist(e, allowlist)) {
            None
        } else {
            ProfileRepo::find_role(&state.pool, user.user_id).await?
        };

        if is_admin(email, role.as_deref(), allowlist) {
            return Ok(RequireAdmin(user));
        }

        tracing::warn!(user_id = %user.user_id, "Admin access denied");
        Err(AppError::Core(CoreError::Forbidden(
            "Admin access required".into(),
        )))
    }
}
