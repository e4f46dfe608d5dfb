use std::path::Path;

use crate::errors::AppResult;
use crate::security::InputValidator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    pub mime_type: String,
}

/// A single image ready to be sent to the image-storage endpoint.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageFile {
    pub fn from_bytes(file_name: &str, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime_type: mime_type_from_extension(file_name).to_string(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Detect MIME type based on file extension
pub fn mime_type_from_extension(file_path: &str) -> &'static str {
    let ext = Path::new(file_path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

pub fn inspect_image(file_path: &str, max_size_mb: u64) -> AppResult<ImageInfo> {
    InputValidator::validate_image_file(file_path, max_size_mb)?;

    let size_bytes = std::fs::metadata(file_path)?.len();

    // Read only the image header for dimensions
    let reader = image::ImageReader::open(file_path)?.with_guessed_format()?;
    let mime_type = reader
        .format()
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|| mime_type_from_extension(file_path).to_string());
    let (width, height) = reader.into_dimensions()?;

    Ok(ImageInfo {
        width,
        height,
        size_bytes,
        mime_type,
    })
}

/// Validate, inspect and read an image from disk.
pub async fn load_image_file(file_path: &str, max_size_mb: u64) -> AppResult<ImageFile> {
    let info = inspect_image(file_path, max_size_mb)?;
    let data = tokio::fs::read(file_path).await?;

    let file_name = Path::new(file_path)
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    log::debug!(
        "Loaded {} ({}x{}, {} bytes, {})",
        file_name,
        info.width,
        info.height,
        info.size_bytes,
        info.mime_type
    );

    Ok(ImageFile {
        file_name: InputValidator::sanitize_filename(&file_name)?,
        mime_type: info.mime_type,
        data,
    })
}
