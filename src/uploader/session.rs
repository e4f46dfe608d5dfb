use crate::config::{Config, MAX_IMAGES_PER_ARTWORK};
use crate::errors::{AppError, AppResult};
use crate::events::{safe_emit_event, EventSink, OriginView, UiEvent};
use crate::image_processor::{self, ImageFile};
use crate::security::InputValidator;
use crate::models::{
    ArtworkStatus, ImageId, PostAck, PostArtworkRequest, SessionImage, UploadedImage,
};

use super::api_client::ArtworkApi;
use super::preview::PreviewState;
use super::progress_tracker::BatchReport;

/// What the rich-text editor holds after the user clears it.
pub const EMPTY_EDITOR_SENTINEL: &str = "<p><br></p>";

/// First reason a session cannot be submitted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocker {
    MissingTitle,
    TitleTooLong,
    MissingDescription,
    EmptyDescription,
    NoImages,
}

impl SubmitBlocker {
    pub fn field(&self) -> &'static str {
        match self {
            SubmitBlocker::MissingTitle | SubmitBlocker::TitleTooLong => "title",
            SubmitBlocker::MissingDescription | SubmitBlocker::EmptyDescription => "description",
            SubmitBlocker::NoImages => "images",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SubmitBlocker::MissingTitle => "Title cannot be empty",
            SubmitBlocker::TitleTooLong => "Title must be at most 100 characters",
            SubmitBlocker::MissingDescription => "Description cannot be empty",
            SubmitBlocker::EmptyDescription => "Description only contains an empty paragraph",
            SubmitBlocker::NoImages => "At least one image is required",
        }
    }
}

impl From<SubmitBlocker> for AppError {
    fn from(blocker: SubmitBlocker) -> Self {
        AppError::validation(blocker.field(), blocker.message())
    }
}

/// In-progress state of one artwork upload.
///
/// Images are kept as `{id, url}` pairs in display order, which is also the
/// order their ids are submitted in. The session is consumed by [`submit`].
///
/// [`submit`]: UploadSession::submit
#[derive(Debug, Clone)]
pub struct UploadSession {
    session_id: String,
    images: Vec<SessionImage>,
    title: String,
    description: String,
    visibility: ArtworkStatus,
    max_images: usize,
    max_file_size_mb: u64,
    feed_query_key: String,
    preview: PreviewState,
    current: Option<UploadedImage>,
}

impl UploadSession {
    pub fn new(config: &Config) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        log::info!("Opened upload session {}", session_id);

        Self {
            session_id,
            images: Vec::new(),
            title: String::new(),
            description: String::new(),
            visibility: ArtworkStatus::default(),
            max_images: config.max_images.clamp(1, MAX_IMAGES_PER_ARTWORK),
            max_file_size_mb: config.max_file_size_mb,
            feed_query_key: config.feed_query_key.clone(),
            preview: PreviewState::default(),
            current: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn images(&self) -> &[SessionImage] {
        &self.images
    }

    pub fn image_ids(&self) -> Vec<ImageId> {
        self.images.iter().map(|image| image.id).collect()
    }

    pub fn image_urls(&self) -> Vec<&str> {
        self.images.iter().map(|image| image.url.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn max_images(&self) -> usize {
        self.max_images
    }

    /// Whether the "add image" control should be hidden.
    pub fn is_full(&self) -> bool {
        self.images.len() >= self.max_images
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn visibility(&self) -> ArtworkStatus {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: ArtworkStatus) {
        log::debug!("Session {} visibility -> {}", self.session_id, visibility);
        self.visibility = visibility;
    }

    /// Raw response of the most recent successful upload.
    pub fn current(&self) -> Option<&UploadedImage> {
        self.current.as_ref()
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    /// Upload `files` one after another, keeping input order for the ones that succeed.
    pub async fn add_images(&mut self, api: &dyn ArtworkApi, files: Vec<ImageFile>) -> BatchReport {
        let mut report = BatchReport::new(files.len());
        log::info!(
            "Session {}: uploading {} files ({} already attached)",
            self.session_id,
            files.len(),
            self.images.len()
        );

        let mut batch = Vec::with_capacity(files.len());
        for file in &files {
            self.upload_one(api, file, &mut batch, &mut report).await;
        }

        self.finish_batch(batch, &mut report);
        report
    }

    /// Like [`add_images`](Self::add_images), loading each file from disk first.
    /// A file that cannot be loaded counts as a failed upload.
    pub async fn add_image_paths<S: AsRef<str>>(
        &mut self,
        api: &dyn ArtworkApi,
        paths: &[S],
    ) -> BatchReport {
        let mut report = BatchReport::new(paths.len());
        log::info!(
            "Session {}: uploading {} files from disk ({} already attached)",
            self.session_id,
            paths.len(),
            self.images.len()
        );

        let mut batch = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            match image_processor::load_image_file(path, self.max_file_size_mb).await {
                Ok(file) => self.upload_one(api, &file, &mut batch, &mut report).await,
                Err(e) => report.record_failure(path, &e),
            }
        }

        self.finish_batch(batch, &mut report);
        report
    }

    async fn upload_one(
        &mut self,
        api: &dyn ArtworkApi,
        file: &ImageFile,
        batch: &mut Vec<SessionImage>,
        report: &mut BatchReport,
    ) {
        match api.upload_image(file).await {
            Ok(uploaded) => {
                batch.push(SessionImage::from(uploaded.clone()));
                self.current = Some(uploaded.clone());
                report.record_success(uploaded);
            }
            Err(e) => report.record_failure(&file.file_name, &e),
        }
    }

    /// Uploads land in `batch` and only reach the session here, already
    /// truncated. A batch dropped before this point attaches nothing.
    fn finish_batch(&mut self, batch: Vec<SessionImage>, report: &mut BatchReport) {
        let mut images = self.images.clone();
        images.extend(batch);

        let truncated = images.len().saturating_sub(self.max_images);
        if truncated > 0 {
            log::warn!(
                "Session {}: dropping {} images over the limit of {}",
                self.session_id,
                truncated,
                self.max_images
            );
            images.truncate(self.max_images);
        }
        self.images = images;

        report.finish(truncated);
        log::info!(
            "Session {}: batch finished in {}ms, {} uploaded, {} failed, {} attached",
            self.session_id,
            report.elapsed_ms,
            report.uploaded.len(),
            report.failed.len(),
            self.images.len()
        );
    }

    pub fn delete_image(&mut self, index: usize) -> Option<SessionImage> {
        if index >= self.images.len() {
            log::debug!("Ignoring delete of missing image index {}", index);
            return None;
        }

        let removed = self.images.remove(index);
        if self.preview.enlarged_url() == Some(removed.url.as_str()) {
            self.preview.dismiss();
        }
        Some(removed)
    }

    pub fn delete_all(&mut self) {
        self.images.clear();
        self.preview.dismiss();
    }

    /// Move the image at `from` to `to`. `None` means the drag was dropped outside
    /// a valid target. Returns whether the order changed.
    pub fn reorder(&mut self, from: usize, to: Option<usize>) -> bool {
        let Some(to) = to else {
            return false;
        };

        let len = self.images.len();
        if from >= len || to >= len {
            log::debug!("Ignoring reorder {} -> {} on {} images", from, to, len);
            return false;
        }
        if from == to {
            return false;
        }

        let image = self.images.remove(from);
        self.images.insert(to, image);
        true
    }

    pub fn open_preview(&mut self, index: usize) -> bool {
        match self.images.get(index) {
            Some(image) => {
                self.preview.open(image.url.clone());
                true
            }
            None => false,
        }
    }

    pub fn close_preview(&mut self) {
        self.preview.dismiss();
    }

    pub fn submit_blocker(&self) -> Option<SubmitBlocker> {
        if self.title.is_empty() {
            Some(SubmitBlocker::MissingTitle)
        } else if InputValidator::validate_title(&self.title).is_err() {
            Some(SubmitBlocker::TitleTooLong)
        } else if self.description.is_empty() {
            Some(SubmitBlocker::MissingDescription)
        } else if self.description == EMPTY_EDITOR_SENTINEL {
            Some(SubmitBlocker::EmptyDescription)
        } else if self.images.is_empty() {
            Some(SubmitBlocker::NoImages)
        } else {
            None
        }
    }

    pub fn can_submit(&self) -> bool {
        self.submit_blocker().is_none()
    }

    pub fn to_post_request(&self) -> PostArtworkRequest {
        PostArtworkRequest {
            image_ids: self.image_ids(),
            title: self.title.clone(),
            description: self.description.clone(),
            artwork_status: self.visibility,
        }
    }

    /// Create the post. Sends exactly one request when the session is ready and
    /// none otherwise; the session is discarded either way.
    pub async fn submit(
        self,
        api: &dyn ArtworkApi,
        origin: &OriginView,
        sink: &dyn EventSink,
    ) -> AppResult<PostAck> {
        if let Some(blocker) = self.submit_blocker() {
            log::warn!(
                "Session {} not submitted: {}",
                self.session_id,
                blocker.message()
            );
            return Err(blocker.into());
        }

        let request = self.to_post_request();
        log::info!(
            "Session {}: submitting '{}' with {} images as {}",
            self.session_id,
            request.title,
            request.image_ids.len(),
            request.artwork_status
        );

        match api.create_post(&request).await {
            Ok(ack) => {
                safe_emit_event(sink, UiEvent::success("Artwork uploaded! 🎉"));
                if origin.is_home() {
                    safe_emit_event(
                        sink,
                        UiEvent::RefetchQuery {
                            key: self.feed_query_key.clone(),
                        },
                    );
                }
                log::info!("Session {} submitted", self.session_id);
                Ok(ack)
            }
            Err(e) => {
                log::error!("Session {} submission failed: {}", self.session_id, e);
                safe_emit_event(sink, UiEvent::error(&format!("Artwork upload failed: {}", e)));
                Err(e)
            }
        }
    }
}
