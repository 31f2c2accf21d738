//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Errors are
//! reserved for malformed input rejected at the boundary (negative or non-finite dimensions,
//! impossible configuration values) and for lookup misses that the caller asked to resolve.
//! Expected degradations during generation or placement are reported through
//! [`crate::events`] instead.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid dimension at '{path}': {field} = {value} (must be finite and >= 0)")]
    InvalidDimension {
        path: String,
        field: &'static str,
        value: f32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown blueprint '{id}' (version {version})")]
    UnknownBlueprint { id: String, version: u32 },
}
