//! Request handlers.
//!
//! Handlers validate input through `interpret_core`, delegate persistence to
//! the `interpret_db` repositories, and map errors via [`AppError`](crate::error::AppError).

pub mod ceu;
pub mod ceu_admin;
pub mod verification;
