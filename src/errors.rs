// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for inventory operations

use thiserror::Error;

use crate::query::selector::SelectorError;
use crate::store::StoreError;

/// Errors that can occur in inventory operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// A `type` discriminator has no constructor in the registry
    #[error("Resource type not registered: {0}")]
    NotRegistered(String),

    /// A record is missing its discriminator or has the wrong shape
    #[error("Malformed resource record: {0}")]
    MalformedRecord(String),

    /// Kind-specific attributes failed to decode
    #[error("Failed to decode {kind} attributes: {source}")]
    AttributeDecode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// Encoding a resource or snapshot failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Create on a duplicate `(type, id)`
    #[error("Resource already exists: {kind}/{id}")]
    AlreadyExists { kind: String, id: String },

    /// Update or delete on a missing `(type, id)`
    #[error("Resource not found: {kind}/{id}")]
    NotFound { kind: String, id: String },

    /// Unknown operator or wrong number of values
    #[error("Invalid selector: {0}")]
    InvalidSelector(#[from] SelectorError),

    /// The query store has not been initialized (or was wiped)
    #[error("Query store is not initialized")]
    NotInitialized,

    /// Durable store failure
    #[error("Durable store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

impl InventoryError {
    /// True for the "already exists" condition
    pub fn is_already_exists(&self) -> bool {
        matches!(self, InventoryError::AlreadyExists { .. })
    }

    /// True for the "not found" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, InventoryError::NotFound { .. })
    }

    /// True for any selector validation failure
    pub fn is_invalid_selector(&self) -> bool {
        matches!(self, InventoryError::InvalidSelector(_))
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InventoryError::AlreadyExists {
            kind: "VLANPool".to_string(),
            id: "0100000001".to_string(),
        };
        assert_eq!(err.to_string(), "Resource already exists: VLANPool/0100000001");
        assert!(err.is_already_exists());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_selector_error_conversion() {
        let err: InventoryError = SelectorError::InvalidOperator(7).into();
        assert!(err.is_invalid_selector());
    }
}
