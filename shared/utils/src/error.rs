use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BionexaError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Chemical already dispatched: {sample_id}")]
    AlreadyDispatched { sample_id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Artifact write error: {message}")]
    Artifact { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl BionexaError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn already_dispatched(sample_id: impl Into<String>) -> Self {
        Self::AlreadyDispatched {
            sample_id: sample_id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn artifact(message: impl Into<String>) -> Self {
        Self::Artifact {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyDispatched { .. } => "ALREADY_DISPATCHED",
            Self::Conflict { .. } => "CONFLICT",
            Self::Store { .. } => "STORE_FAILURE",
            Self::Artifact { .. } => "ARTIFACT_WRITE_FAILURE",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::AlreadyDispatched { .. } => 409,
            Self::Conflict { .. } => 409,
            Self::Store { .. } => 500,
            Self::Artifact { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }

    /// True for outcomes the caller surfaces as a warning rather than a failure.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::AlreadyDispatched { .. } | Self::NotFound { .. } | Self::Validation { .. }
        )
    }
}

pub type BionexaResult<T> = Result<T, BionexaError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&BionexaError> for ErrorResponse {
    fn from(error: &BionexaError) -> Self {
        Self {
            error: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<sqlx::Error> for BionexaError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::conflict(db.message().to_string())
            }
            sqlx::Error::RowNotFound => Self::not_found("row"),
            _ => Self::store(error.to_string()),
        }
    }
}

impl From<std::io::Error> for BionexaError {
    fn from(error: std::io::Error) -> Self {
        Self::artifact(error.to_string())
    }
}

impl From<csv::Error> for BionexaError {
    fn from(error: csv::Error) -> Self {
        Self::internal(format!("CSV export failed: {}", error))
    }
}

impl From<serde_json::Error> for BionexaError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BionexaError::validation("f", "m").http_status_code(), 400);
        assert_eq!(BionexaError::not_found("x").http_status_code(), 404);
        assert_eq!(BionexaError::already_dispatched("A-B").http_status_code(), 409);
        assert_eq!(BionexaError::store("boom").http_status_code(), 500);
    }

    #[test]
    fn test_already_dispatched_is_warning() {
        let err = BionexaError::already_dispatched("ACE-1-B-1");
        assert!(err.is_warning());
        assert_eq!(err.error_code(), "ALREADY_DISPATCHED");
        assert!(err.to_string().contains("ACE-1-B-1"));
        assert!(!BionexaError::store("disk full").is_warning());
    }

    #[test]
    fn test_error_response_from_error() {
        let err = BionexaError::not_found("chemical NOPE");
        let response = ErrorResponse::from(&err);
        assert_eq!(response.error, "NOT_FOUND");
        assert_eq!(response.message, "Not found: chemical NOPE");
    }
}
