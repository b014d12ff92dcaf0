//! Error taxonomy for the store and the chat engine.
//!
//! Only store failures escape `ChatEngine::handle`. Generator failures are
//! `anyhow` errors that the engine recovers from locally, and missing
//! parameters are reported through `RetrievalStatus`, not as errors.

/// Structured-store errors. A store error means the trusted data could not
/// be read; it is never folded into an empty result.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("read pool error: {message}")]
    Pool { message: String },

    #[error("movie {id} not found")]
    NotFound { id: i64 },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite {
            message: err.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the chat engine to its caller.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("movie data is temporarily unavailable: {0}")]
    DataUnavailable(#[from] StoreError),
}

impl EngineError {
    /// Whether the failure means the trusted movie data could not be read.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, EngineError::DataUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts_to_data_unavailable() {
        let err: EngineError = StoreError::Sqlite {
            message: "disk I/O error".to_string(),
        }
        .into();
        assert!(err.is_data_unavailable());
        assert!(err.to_string().contains("temporarily unavailable"));
        assert!(err.to_string().contains("disk I/O error"));
    }

    #[test]
    fn test_invalid_request_is_not_data_failure() {
        let err = EngineError::InvalidRequest {
            reason: "message must not be empty".to_string(),
        };
        assert!(!err.is_data_unavailable());
    }
}
