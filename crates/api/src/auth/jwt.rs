//! JWT access-token validation.
//!
//! Tokens are issued by the identity provider and signed with a shared HS256
//! secret. The subject is the user's UUID, which is also the primary key of
//! their `profiles` row.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use interpret_core::types::DbId;

/// JWT claims read from every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: DbId,
    /// Email address, used for the admin allowlist.
    #[serde(default)]
    pub email: Option<String>,
    /// Identity-provider role (usually `"authenticated"`). Not used for
    /// admin decisions; those go through the allowlist and `profiles.role`.
    #[serde(default)]
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for JWT validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to verify tokens.
    pub secret: String,
    /// Lifetime of tokens minted by [`generate_access_token`].
    pub access_token_expiry_mins: i64,
}

/// Default access token expiry in minutes.
pub const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

/// Generate an HS256 access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    email: Option<&str>,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: email.map(str::to_string),
        role: "authenticated".to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Signature and expiry are checked. The `aud` claim is ignored because the
/// identity provider sets it to a fixed value.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256, validates exp
    validation.validate_aud = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
