use uuid::Uuid;

use super::{StorageError, TemporalError};

/// Top-level error type for the LoRa store.
/// All subsystem errors convert into this via `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum LoraError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("object not found: {uuid}")]
    NotFound { uuid: Uuid },

    #[error("object already deleted: {uuid}")]
    AlreadyDeleted { uuid: Uuid },

    #[error("concurrent modification of {uuid}: registration {registration_id} is no longer open")]
    ConcurrentModification { uuid: Uuid, registration_id: i64 },

    #[error("idempotency token {token} is being used by a concurrent request")]
    Conflict { token: Uuid },

    #[error("storage timeout during {operation}")]
    StorageTimeout { operation: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("audit write failed for {uuid}: {reason}")]
    AuditWriteFailed { uuid: Uuid, reason: String },

    #[error("temporal error: {0}")]
    TemporalError(#[from] TemporalError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError(String),
}

/// Convenience type alias.
pub type LoraResult<T> = Result<T, LoraError>;

/// Stable error codes for the presentation layer.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_DELETED: &str = "ALREADY_DELETED";
    pub const CONCURRENT_MODIFICATION: &str = "CONCURRENT_MODIFICATION";
    pub const CONFLICT: &str = "CONFLICT";
    pub const STORAGE_TIMEOUT: &str = "STORAGE_TIMEOUT";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const AUDIT_WRITE_FAILED: &str = "AUDIT_WRITE_FAILED";
    pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

impl LoraError {
    /// Error code for structured handling by callers.
    ///
    /// Temporal errors are caller mistakes (bad intervals, regressing
    /// registration time) and share the validation code.
    pub fn code(&self) -> &'static str {
        match self {
            LoraError::ValidationError(_) | LoraError::TemporalError(_) => codes::VALIDATION_ERROR,
            LoraError::NotFound { .. } => codes::NOT_FOUND,
            LoraError::AlreadyDeleted { .. } => codes::ALREADY_DELETED,
            LoraError::ConcurrentModification { .. } => codes::CONCURRENT_MODIFICATION,
            LoraError::Conflict { .. } => codes::CONFLICT,
            LoraError::StorageTimeout { .. } => codes::STORAGE_TIMEOUT,
            LoraError::StorageError(_) => codes::STORAGE_ERROR,
            LoraError::AuditWriteFailed { .. } => codes::AUDIT_WRITE_FAILED,
            LoraError::SerializationError(_) => codes::SERIALIZATION_ERROR,
            LoraError::ConfigError(_) => codes::CONFIG_ERROR,
        }
    }

    /// Whether the caller may retry the same request.
    ///
    /// `Conflict` is deliberately excluded: the caller must look the token up
    /// instead of re-sending the mutation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LoraError::ConcurrentModification { .. } | LoraError::StorageTimeout { .. }
        )
    }
}
