pub mod auth;
pub mod config;
pub mod errors;
pub mod events;
pub mod image_processor;
pub mod models;
pub mod security;
pub mod uploader;

pub use errors::{AppError, AppResult};
pub use uploader::UploadSession;
