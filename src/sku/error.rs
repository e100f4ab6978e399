//! Errors returned by SKU queries.

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Result type for SKU queries.
pub type SkuResult<T> = Result<T, SkuError>;

/// Failures surfaced by quantity lookups and location resolution.
///
/// Boolean predicates never produce these; they degrade to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkuError {
    /// No capability with this name, or no capability data at all.
    #[error("capability {name} not found")]
    CapabilityNotFound { name: String },

    /// Capability found by name but carries no value.
    #[error("capability {name} has no value")]
    CapabilityValueNil { name: String },

    /// Capability value could not be parsed as the requested number type.
    #[error("capability {name}: failed to parse '{value}': {source}")]
    CapabilityValueParse {
        name: String,
        value: String,
        #[source]
        source: NumberParseError,
    },

    /// The record has no locations field.
    #[error("sku location is unset")]
    LocationUnset,

    /// The locations field is present but empty.
    #[error("sku has no locations")]
    NoLocations,

    /// More than one location; a wrapped SKU describes exactly one.
    #[error("sku has {count} locations, expected exactly one")]
    MultipleLocations { count: usize },
}

/// Underlying numeric parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberParseError {
    #[error(transparent)]
    Int(#[from] ParseIntError),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
}

impl SkuError {
    /// Capability name the error refers to, when there is one.
    pub fn capability(&self) -> Option<&str> {
        match self {
            SkuError::CapabilityNotFound { name }
            | SkuError::CapabilityValueNil { name }
            | SkuError::CapabilityValueParse { name, .. } => Some(name),
            _ => None,
        }
    }
}
