use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::errors::AppError;
use crate::models::UploadedImage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUpload {
    pub file_name: String,
    pub error: String,
    /// The file itself was unusable (missing, wrong type, too large).
    pub is_local: bool,
}

/// Outcome of one `add_images` batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub total_files: usize,
    pub uploaded: Vec<UploadedImage>,
    pub failed: Vec<FailedUpload>,
    pub truncated: usize,
    pub elapsed_ms: u64,
    #[serde(skip)]
    started_at: Instant,
}

impl BatchReport {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            uploaded: Vec::new(),
            failed: Vec::new(),
            truncated: 0,
            elapsed_ms: 0,
            started_at: Instant::now(),
        }
    }

    pub fn record_success(&mut self, image: UploadedImage) {
        log::info!(
            "Uploaded image {} ({}/{})",
            image.image_id,
            self.processed() + 1,
            self.total_files
        );
        self.uploaded.push(image);
    }

    pub fn record_failure(&mut self, file_name: &str, error: &AppError) {
        log::warn!(
            "Failed to upload {} - {} ({}/{})",
            file_name,
            error,
            self.processed() + 1,
            self.total_files
        );
        self.failed.push(FailedUpload {
            file_name: file_name.to_string(),
            error: error.to_string(),
            is_local: error.is_local(),
        });
    }

    pub fn finish(&mut self, truncated: usize) {
        self.truncated = truncated;
        self.elapsed_ms = self.started_at.elapsed().as_millis() as u64;
    }

    pub fn processed(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}
