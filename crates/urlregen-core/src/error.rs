//! Error types and handling for urlregen-core operations.
//!
//! Errors are split along the lines the regeneration driver cares about:
//!
//! - **Fatal**: storefront or product lookups, URL rewrite deletion, storage and
//!   configuration failures. These abort a run.
//! - **Conflict**: a rewrite whose request path is already taken in the same
//!   storefront. The driver records it and moves on to the next product.
//! - **Advisory**: cache publish failures. The driver logs them and keeps going.
//!
//! ```rust
//! use urlregen_core::Error;
//!
//! let err = Error::UrlConflict {
//!     store_id: 1,
//!     request_path: "blue-shirt.html".to_string(),
//!     message: "already used by product 7".to_string(),
//! };
//! assert!(err.is_conflict());
//! assert_eq!(err.category(), "conflict");
//! ```

use thiserror::Error;

use crate::types::{ProductId, StoreId};

/// The main error type for urlregen-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A storage backend could not read or write its records.
    ///
    /// Covers snapshot files that cannot be loaded or written back, and
    /// rewrite deletions that the backend rejected.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested storefront or product does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A URL rewrite collides with an existing request path in the same store.
    ///
    /// This is the only persistence failure the driver recovers from.
    #[error("URL key for specified store already exists: '{request_path}' in store {store_id} ({message})")]
    UrlConflict {
        /// Store the colliding rewrite belongs to.
        store_id: StoreId,
        /// Request path that is already taken.
        request_path: String,
        /// Backend-specific detail (usually the current owner).
        message: String,
    },

    /// The rewrite generator could not produce rewrites for a product.
    #[error("Generation failed for product {product_id}: {reason}")]
    Generation {
        /// Product the generator was working on.
        product_id: ProductId,
        /// Why generation failed.
        reason: String,
    },

    /// A cache invalidation notification could not be published.
    #[error("Cache publish failed: {0}")]
    CachePublish(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Whether this error is a request-path uniqueness conflict.
    ///
    /// Conflicts are isolated per product: the driver logs them, records them in
    /// the run report and continues with the next product.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::UrlConflict { .. })
    }

    /// Check if the error might be recoverable through retry logic.
    ///
    /// Only interrupted or timed-out I/O and cache publishing qualify. A conflict
    /// is not recoverable by retrying: the same path would collide again.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::CachePublish(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Used as a structured field in log events and by the CLI to choose an
    /// exit code.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::UrlConflict { .. } => "conflict",
            Self::Generation { .. } => "generation",
            Self::CachePublish(_) => "cache",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
