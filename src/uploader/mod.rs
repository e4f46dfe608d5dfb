// Uploader module - the artwork upload session and the API it talks to
//
// Images are uploaded one request per file; the post is created once at the end.

pub mod api_client;
pub mod preview;
pub mod progress_tracker;
pub mod session;

pub use api_client::{ArtApiClient, ArtworkApi, AuthApi, UserApi};
pub use preview::PreviewState;
pub use progress_tracker::{BatchReport, FailedUpload};
pub use session::{SubmitBlocker, UploadSession, EMPTY_EDITOR_SENTINEL};
