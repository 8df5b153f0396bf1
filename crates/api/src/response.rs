//! Shared response envelope types for API handlers.
//!
//! Most responses use a `{ "data": ... }` envelope. The CEU workflow
//! endpoints that existing clients already consume (`/ceu/evaluation`,
//! `/ceu/certificate`, `/verify-certificate`) keep their own flat shapes.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
