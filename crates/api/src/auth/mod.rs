//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token validation (and generation, used by tests
//!   and local tooling).

pub mod jwt;
