//! Shared helpers for document field access and reference resolution.

pub mod json;
pub mod lookup;
