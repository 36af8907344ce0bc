use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors raised while reading or parsing the mount table.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    /// A single mount-table line could not be parsed. Never fatal: the
    /// reader logs it and moves on to the next line.
    #[error("unable to parse mount line {line:?}: {reason}")]
    Parse { line: String, reason: String },
    /// The mount table exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by volume metadata queries against a mount point.
///
/// Both variants describe a transient condition (a share that went stale, a
/// disk that was pulled) and are scoped to the single query that hit them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VolumeError {
    #[error("volume at {path} is unavailable: {reason}")]
    Unavailable { path: String, reason: String },
    #[error("volume at {path} did not respond within {timeout_ms} ms")]
    TimedOut { path: String, timeout_ms: u64 },
}

impl VolumeError {
    pub fn unavailable(path: &Path, reason: impl Into<String>) -> Self {
        VolumeError::Unavailable { path: path.display().to_string(), reason: reason.into() }
    }

    /// The mount point the failed query was aimed at.
    pub fn path(&self) -> &str {
        match self {
            VolumeError::Unavailable { path, .. } | VolumeError::TimedOut { path, .. } => path,
        }
    }
}

/// The primary error type for the HTTP layer.
///
/// This enum consolidates all failures a handler can return and knows how to
/// render itself as a JSON error response.
#[derive(Debug)]
pub enum AppError {
    /// For internal server errors that are not expected to be handled by the client.
    Internal(anyhow::Error),
    /// For when a requested resource is not found.
    NotFound(String),
    /// For when a volume or the mount table is temporarily unavailable.
    ServiceUnavailable(String),
    /// For when a specific field in a request fails validation.
    ValidationError {
        /// The name of the field that failed validation.
        field: String,
        /// A message describing the validation error.
        message: String,
    },
    /// For when the mount table exists but cannot be read.
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::ValidationError { field, message } => {
                write!(f, "Validation error on field '{}': {}", field, message)
            }
            AppError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Internal(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message, details) = match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                let error_id = uuid::Uuid::new_v4();
                tracing::error!("Error ID: {}", error_id);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg, None)
            }
            AppError::ValidationError { field, message } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Validation failed for field '{}'", field),
                Some(json!({ "field": field, "message": message })),
            ),
            AppError::IoError(msg) => {
                tracing::error!("I/O error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO_ERROR",
                    "An I/O error occurred".to_string(),
                    Some(json!({ "details": msg })),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": error_message,
            },
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<VolumeError> for AppError {
    fn from(err: VolumeError) -> Self {
        AppError::ServiceUnavailable(err.to_string())
    }
}

impl From<MountError> for AppError {
    fn from(err: MountError) -> Self {
        match err {
            MountError::Io { path, source } => {
                AppError::IoError(format!("{}: {}", path.display(), source))
            }
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the HTTP layer.
pub type AppResult<T> = Result<T, AppError>;

/// An extension trait for `Option` that provides a convenient way to convert
/// an `Option` to a `Result` with a `NotFound` error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, AppError>`.
    ///
    /// * `entity` - A string describing the entity that was not found.
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(format!("{} not found", entity)))
    }
}

/// Request validation helpers.
pub mod validation {
    use super::*;
    use std::path::Path;

    /// Validates a file path.
    ///
    /// Rejects empty paths, paths with null characters and relative paths,
    /// since mount points are always absolute.
    pub fn validate_path(path: &str) -> AppResult<()> {
        if path.is_empty() {
            return Err(AppError::ValidationError {
                field: "path".to_string(),
                message: "Path cannot be empty".to_string(),
            });
        }

        if path.contains('\0') {
            return Err(AppError::ValidationError {
                field: "path".to_string(),
                message: "Path contains null characters".to_string(),
            });
        }

        if !Path::new(path).is_absolute() {
            return Err(AppError::ValidationError {
                field: "path".to_string(),
                message: "Path must be absolute".to_string(),
            });
        }

        Ok(())
    }
}
