//! Domain logic for the InterpretReflect CEU service.
//!
//! This crate has no database or HTTP dependencies. Everything here operates
//! on plain values loaded by the caller, so the lifecycle rules, RID export
//! layout, and reporting math can be unit tested in isolation.

pub mod ceu;
pub mod error;
pub mod roles;
pub mod types;
