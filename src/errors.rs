use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file type: {path}. Only image files are supported.")]
    InvalidFileType { path: String },

    #[error("File too large: {path}. Maximum size is {limit_mb}MB.")]
    FileTooLarge { path: String, limit_mb: u64 },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Custom result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn file_not_found(path: &str) -> Self {
        Self::FileNotFound {
            path: path.to_string(),
        }
    }

    pub fn invalid_file_type(path: &str) -> Self {
        Self::InvalidFileType {
            path: path.to_string(),
        }
    }

    pub fn file_too_large(path: &str, limit_mb: u64) -> Self {
        Self::FileTooLarge {
            path: path.to_string(),
            limit_mb,
        }
    }

    pub fn api(status: u16, message: &str) -> Self {
        Self::Api {
            status,
            message: message.to_string(),
        }
    }

    pub fn upload_failed(reason: &str) -> Self {
        Self::UploadFailed {
            reason: reason.to_string(),
        }
    }

    /// Errors caused by the local input rather than the remote side.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AppError::FileNotFound { .. }
                | AppError::InvalidFileType { .. }
                | AppError::FileTooLarge { .. }
                | AppError::Validation { .. }
                | AppError::Image(_)
                | AppError::Io(_)
        )
    }

    /// Session expired or token rejected by the API.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Api { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_errors_are_classified() {
        assert!(AppError::file_not_found("a.png").is_local());
        assert!(AppError::validation("title", "empty").is_local());
        assert!(AppError::file_too_large("a.png", 20).is_local());
        assert!(!AppError::api(500, "boom").is_local());
        assert!(!AppError::upload_failed("no id").is_local());
    }

    #[test]
    fn test_unauthorized_statuses() {
        assert!(AppError::api(401, "expired").is_unauthorized());
        assert!(AppError::api(403, "forbidden").is_unauthorized());
        assert!(!AppError::api(404, "missing").is_unauthorized());
        assert!(!AppError::Config("x".to_string()).is_unauthorized());
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::validation("title", "Title cannot be empty");
        assert_eq!(
            err.to_string(),
            "Validation error: title - Title cannot be empty"
        );

        let err = AppError::file_too_large("big.png", 20);
        assert_eq!(err.to_string(), "File too large: big.png. Maximum size is 20MB.");
    }
}
