//! Shared helpers: label normalization and input guards.

pub mod normalize;
pub mod validation;
