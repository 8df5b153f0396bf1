//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the DTOs its repository accepts.

pub mod certificate;
pub mod evaluation;
pub mod profile;
pub mod progress;
pub mod rid_submission;
pub mod skill_module;
