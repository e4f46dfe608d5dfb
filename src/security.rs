use regex::Regex;
use std::path::Path;

use crate::errors::{AppError, AppResult};

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "bmp"];
pub const MAX_TITLE_CHARS: usize = 100;

pub struct InputValidator;

impl InputValidator {
    pub fn validate_file_path(path: &str) -> AppResult<()> {
        if path.trim().is_empty() {
            return Err(AppError::validation("file_path", "File path cannot be empty"));
        }

        let path_obj = Path::new(path);

        // Ensure it's an image file
        if let Some(extension) = path_obj.extension() {
            let ext = extension.to_string_lossy().to_lowercase();
            if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(AppError::invalid_file_type(path));
            }
        } else {
            return Err(AppError::validation("file_path", "File must have an extension"));
        }

        if !path_obj.exists() {
            return Err(AppError::file_not_found(path));
        }

        if !path_obj.is_file() {
            return Err(AppError::validation("file_path", "Path is not a file"));
        }

        Ok(())
    }

    pub fn validate_image_file(file_path: &str, max_size_mb: u64) -> AppResult<()> {
        Self::validate_file_path(file_path)?;

        let metadata = std::fs::metadata(file_path)?;
        if metadata.len() > max_size_mb * 1024 * 1024 {
            return Err(AppError::file_too_large(file_path, max_size_mb));
        }

        // Header decode only; the server does the real processing
        image::ImageReader::open(file_path)?
            .with_guessed_format()?
            .into_dimensions()?;

        Ok(())
    }

    /// Whitespace counts; the editor submits titles as typed.
    pub fn validate_title(title: &str) -> AppResult<()> {
        if title.is_empty() {
            return Err(AppError::validation("title", "Title cannot be empty"));
        }

        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::validation(
                "title",
                &format!("Title must be at most {} characters", MAX_TITLE_CHARS),
            ));
        }

        Ok(())
    }

    pub fn validate_social_id(social_id: &str) -> AppResult<()> {
        let trimmed = social_id.trim();

        if trimmed.is_empty() {
            return Err(AppError::validation("social_id", "Social id cannot be empty"));
        }

        if trimmed.len() > 128 {
            return Err(AppError::validation("social_id", "Social id too long"));
        }

        let safe_chars = Regex::new(r"^[A-Za-z0-9_\-]+$")?;
        if !safe_chars.is_match(trimmed) {
            return Err(AppError::validation(
                "social_id",
                "Social id contains invalid characters",
            ));
        }

        Ok(())
    }

    pub fn validate_user_id(user_id: i64) -> AppResult<()> {
        if user_id <= 0 {
            return Err(AppError::validation("user_id", "Must be a positive id"));
        }
        Ok(())
    }

    pub fn sanitize_filename(filename: &str) -> AppResult<String> {
        let unsafe_chars = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#)?;
        let sanitized = unsafe_chars.replace_all(filename.trim(), "_");

        // Limit length
        if sanitized.chars().count() > 255 {
            let truncated: String = sanitized.chars().take(252).collect();
            Ok(format!("{}...", truncated))
        } else {
            Ok(sanitized.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsupported_extension() {
        let result = InputValidator::validate_file_path("notes.txt");
        assert!(matches!(result, Err(AppError::InvalidFileType { .. })));
    }

    #[test]
    fn test_rejects_missing_file() {
        let result = InputValidator::validate_file_path("definitely_does_not_exist.png");
        assert!(matches!(result, Err(AppError::FileNotFound { .. })));
    }

    #[test]
    fn test_rejects_extensionless_and_empty() {
        assert!(InputValidator::validate_file_path("").is_err());
        assert!(InputValidator::validate_file_path("README").is_err());
    }

    #[test]
    fn test_rejects_file_that_is_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"not a png at all").unwrap();

        let result = InputValidator::validate_image_file(&path.to_string_lossy(), 20);
        assert!(result.is_err());
    }

    #[test]
    fn test_title_validation() {
        assert!(InputValidator::validate_title("Sunset").is_ok());
        assert!(InputValidator::validate_title(&"a".repeat(100)).is_ok());
        assert!(InputValidator::validate_title(&"한".repeat(100)).is_ok());
        assert!(InputValidator::validate_title("").is_err());

        match InputValidator::validate_title(&"a".repeat(101)) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "title"),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_social_id_validation() {
        assert!(InputValidator::validate_social_id("1234567890").is_ok());
        assert!(InputValidator::validate_social_id("abc_DEF-123").is_ok());
        assert!(InputValidator::validate_social_id("   ").is_err());
        assert!(InputValidator::validate_social_id("id with spaces").is_err());
        assert!(InputValidator::validate_social_id("<script>").is_err());
    }

    #[test]
    fn test_user_id_validation() {
        assert!(InputValidator::validate_user_id(1).is_ok());
        assert!(InputValidator::validate_user_id(0).is_err());
        assert!(InputValidator::validate_user_id(-7).is_err());
    }

    #[test]
    fn test_sanitize_filename() {
        let safe = InputValidator::sanitize_filename("my<art>:v2?.png").unwrap();
        assert_eq!(safe, "my_art__v2_.png");

        let long = "a".repeat(300);
        let safe = InputValidator::sanitize_filename(&long).unwrap();
        assert_eq!(safe.chars().count(), 255);
        assert!(safe.ends_with("..."));
    }
}
