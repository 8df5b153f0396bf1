//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller identified by a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- an authenticated admin (email allowlist or
//!   profile role).

pub mod auth;
pub mod rbac;
