//! Shared types, errors and trait seams

pub mod errors;
pub mod format;
pub mod traits;
pub mod types;
