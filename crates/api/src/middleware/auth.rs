//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use interpret_core::error::CoreError;
use interpret_core::types::DbId;

use interpret_db::repositories::ProfileRepo;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's id (from `claims.sub`).
    pub user_id: DbId,
    /// Email claim, if the token carries one.
    pub email: Option<String>,
}

impl AuthUser {
    /// Make sure a `profiles` row exists for this user before writing rows
    /// that reference it. The token email seeds the new row.
    pub async fn ensure_profile(&self, state: &AppState) -> AppResult<()> {
        let email = self.email.as_deref().unwrap_or_default();
        if ProfileRepo::ensure(&state.pool, self.user_id, email).await? {
            tracing::info!(user_id = %self.user_id, "Profile created from token");
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}
