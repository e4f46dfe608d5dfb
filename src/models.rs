use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

pub type ImageId = i64;
pub type ImageUrl = String;

/// Visibility label of an artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtworkStatus {
    #[default]
    Public,
    Selling,
    Free,
}

impl ArtworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtworkStatus::Public => "PUBLIC",
            ArtworkStatus::Selling => "SELLING",
            ArtworkStatus::Free => "FREE",
        }
    }
}

impl fmt::Display for ArtworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtworkStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(ArtworkStatus::Public),
            "SELLING" => Ok(ArtworkStatus::Selling),
            "FREE" => Ok(ArtworkStatus::Free),
            _ => Err(AppError::validation(
                "artwork_status",
                "Must be PUBLIC, SELLING or FREE",
            )),
        }
    }
}

/// Response of the image-storage endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub image_id: ImageId,
    pub image_url: ImageUrl,
}

/// One image of an in-progress session. Id and url always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionImage {
    pub id: ImageId,
    pub url: ImageUrl,
}

impl From<UploadedImage> for SessionImage {
    fn from(image: UploadedImage) -> Self {
        Self {
            id: image.image_id,
            url: image.image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostArtworkRequest {
    pub image_ids: Vec<ImageId>,
    pub title: String,
    pub description: String,
    pub artwork_status: ArtworkStatus,
}

/// Acknowledgment of the post-creation endpoint. The body shape is not fixed,
/// so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAck {
    pub status: u16,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLink {
    pub title: String,
    pub address: String,
    pub link_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: i64,
    pub nickname: String,
    #[serde(default)]
    pub activity_area: String,
    #[serde(default)]
    pub activity_field: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub total_like_count: u64,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub links: Vec<UserLink>,
}

/// Tokens issued by the social-login exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user_role: String,
}
