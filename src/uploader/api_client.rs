use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::auth::SocialProvider;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::image_processor::ImageFile;
use crate::models::{PostAck, PostArtworkRequest, SessionTokens, UploadedImage, UserProfile};
use crate::security::InputValidator;

const IMAGES_PATH: &str = "images";
const ARTWORKS_PATH: &str = "artworks";
const USERS_PATH: &str = "users";
const SOCIAL_LOGIN_PATH: &str = "auth/social";

/// Image storage and post creation.
#[async_trait]
pub trait ArtworkApi: Send + Sync {
    async fn upload_image(&self, file: &ImageFile) -> AppResult<UploadedImage>;

    async fn create_post(&self, request: &PostArtworkRequest) -> AppResult<PostAck>;
}

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn get_user(&self, user_id: i64) -> AppResult<UserProfile>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn exchange_social_id(
        &self,
        social_id: &str,
        provider: SocialProvider,
    ) -> AppResult<SessionTokens>;
}

/// HTTP client for the ArtTokTok API
pub struct ArtApiClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ArtApiClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim().to_string(),
            access_token: None,
        })
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.set_access_token(token);
        self
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token.filter(|t| !t.trim().is_empty());
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, url: &str, response: Response) -> AppResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(url, status.as_u16(), &body));
        }

        log::debug!("Response from {}: {}", url, preview(&body, 300));
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ArtworkApi for ArtApiClient {
    async fn upload_image(&self, file: &ImageFile) -> AppResult<UploadedImage> {
        let url = self.endpoint(IMAGES_PATH);

        let part = multipart::Part::bytes(file.data.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)?;
        let form = multipart::Form::new().part("file", part);

        log::debug!("Uploading {} ({} bytes) to {}", file.file_name, file.size(), url);

        let response = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;

        let uploaded: UploadedImage = self.read_json(&url, response).await?;
        if uploaded.image_url.trim().is_empty() {
            return Err(AppError::upload_failed(&format!(
                "server returned an empty url for {}",
                file.file_name
            )));
        }

        Ok(uploaded)
    }

    async fn create_post(&self, request: &PostArtworkRequest) -> AppResult<PostAck> {
        let url = self.endpoint(ARTWORKS_PATH);

        let response = self
            .authorize(self.client.post(&url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(&url, status.as_u16(), &body));
        }

        let body = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body)
                .unwrap_or_else(|_| serde_json::Value::String(body.clone()))
        };

        Ok(PostAck {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl UserApi for ArtApiClient {
    async fn get_user(&self, user_id: i64) -> AppResult<UserProfile> {
        InputValidator::validate_user_id(user_id)?;

        let url = self.endpoint(&format!("{}/{}", USERS_PATH, user_id));
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.read_json(&url, response).await
    }
}

#[async_trait]
impl AuthApi for ArtApiClient {
    async fn exchange_social_id(
        &self,
        social_id: &str,
        provider: SocialProvider,
    ) -> AppResult<SessionTokens> {
        let url = self.endpoint(SOCIAL_LOGIN_PATH);
        let body = serde_json::json!({
            "socialId": social_id,
            "socialType": provider,
        });

        let response = self.client.post(&url).json(&body).send().await?;

        self.read_json(&url, response).await
    }
}

fn api_error(url: &str, status: u16, body: &str) -> AppError {
    let message = if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        preview(body, 300)
    };
    log::warn!("Request to {} failed with status {}: {}", url, status, message);
    AppError::api(status, &message)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one canned response on a local port and hands back the raw request.
    async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api/", listener.local_addr().unwrap());
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (base_url, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&raw).to_string();
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let head = text[..header_end].to_ascii_lowercase();
            let body_len = raw.len() - (header_end + 4);

            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok());
            match content_length {
                Some(expected) if body_len >= expected => break,
                Some(_) => continue,
                None if head.contains("transfer-encoding: chunked") => {
                    if text.ends_with("0\r\n\r\n") {
                        break;
                    }
                }
                None => break,
            }
        }

        String::from_utf8_lossy(&raw).to_string()
    }

    fn request_body(request: &str) -> serde_json::Value {
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    fn local_client(base_url: String) -> ArtApiClient {
        ArtApiClient {
            client: Client::builder().no_proxy().build().unwrap(),
            base_url,
            access_token: None,
        }
    }

    #[tokio::test]
    async fn test_upload_image_sends_multipart_file_with_bearer() {
        let (base_url, server) =
            serve_once(200, r#"{"imageId": 7, "imageUrl": "https://cdn/7.png"}"#).await;
        let client = local_client(base_url).with_access_token(Some("tok-123".to_string()));

        let file = ImageFile::from_bytes("sunset.png", vec![1, 2, 3, 4]);
        let uploaded = client.upload_image(&file).await.unwrap();
        assert_eq!(uploaded.image_id, 7);
        assert_eq!(uploaded.image_url, "https://cdn/7.png");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/images HTTP/1.1"));
        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("authorization: bearer tok-123"));
        assert!(lower.contains("content-type: multipart/form-data"));
        assert!(request.contains(r#"name="file"; filename="sunset.png""#));
        assert!(lower.contains("content-type: image/png"));
    }

    #[tokio::test]
    async fn test_upload_image_rejects_empty_url() {
        let (base_url, server) = serve_once(200, r#"{"imageId": 7, "imageUrl": ""}"#).await;
        let client = local_client(base_url);

        let result = client
            .upload_image(&ImageFile::from_bytes("a.png", vec![0]))
            .await;
        assert!(matches!(result, Err(AppError::UploadFailed { .. })));

        // no token configured, so no auth header goes out
        let request = server.await.unwrap();
        assert!(!request.to_ascii_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_create_post_sends_camel_case_json() {
        let (base_url, server) = serve_once(201, "").await;
        let client = local_client(base_url).with_access_token(Some("tok".to_string()));

        let request = PostArtworkRequest {
            image_ids: vec![3, 1],
            title: "Sunset".to_string(),
            description: "<p>warm</p>".to_string(),
            artwork_status: crate::models::ArtworkStatus::Selling,
        };
        let ack = client.create_post(&request).await.unwrap();
        assert_eq!(ack.status, 201);
        assert_eq!(ack.body, serde_json::Value::Null);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/artworks HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("authorization: bearer tok"));
        assert_eq!(
            request_body(&raw),
            serde_json::json!({
                "imageIds": [3, 1],
                "title": "Sunset",
                "description": "<p>warm</p>",
                "artworkStatus": "SELLING",
            })
        );
    }

    #[tokio::test]
    async fn test_create_post_error_status_becomes_api_error() {
        let (base_url, server) = serve_once(500, &"x".repeat(1000)).await;
        let client = local_client(base_url);

        let request = PostArtworkRequest {
            image_ids: vec![1],
            title: "t".to_string(),
            description: "d".to_string(),
            artwork_status: crate::models::ArtworkStatus::Public,
        };
        match client.create_post(&request).await {
            Err(AppError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message.chars().count(), 300);
            }
            other => panic!("expected Api error, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_exchange_social_id_body() {
        let (base_url, server) = serve_once(
            200,
            r#"{"accessToken": "a", "refreshToken": "r", "userRole": "USER"}"#,
        )
        .await;
        let client = local_client(base_url);

        let tokens = client
            .exchange_social_id("1234567890", SocialProvider::Kakao)
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "a");
        assert_eq!(tokens.refresh_token, "r");
        assert_eq!(tokens.user_role, "USER");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/auth/social HTTP/1.1"));
        assert_eq!(
            request_body(&raw),
            serde_json::json!({ "socialId": "1234567890", "socialType": "KAKAO" })
        );
    }

    #[tokio::test]
    async fn test_get_user_reads_profile() {
        let (base_url, server) = serve_once(
            200,
            r#"{"userId": 5, "nickname": "mina", "links": [{"title": "site", "address": "https://mina.art", "linkId": 1}]}"#,
        )
        .await;
        let client = local_client(base_url);

        let profile = client.get_user(5).await.unwrap();
        assert_eq!(profile.user_id, 5);
        assert_eq!(profile.nickname, "mina");
        assert_eq!(profile.links.len(), 1);
        assert!(profile.profile_image_url.is_none());

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /api/users/5 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_get_user_rejects_bad_id_without_request() {
        let client = local_client("http://127.0.0.1:9/api/".to_string());
        let result = client.get_user(0).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_join_url_handles_slashes() {
        assert_eq!(
            join_url("https://api.example.com/api/", "/users/1"),
            "https://api.example.com/api/users/1"
        );
        assert_eq!(
            join_url("https://api.example.com/api", "images"),
            "https://api.example.com/api/images"
        );
    }

    #[test]
    fn test_client_endpoints_follow_config() {
        let mut config = Config::default();
        config.api_base_url = "http://localhost:8080/api/".to_string();
        let client = ArtApiClient::new(&config).unwrap();

        assert_eq!(client.endpoint(ARTWORKS_PATH), "http://localhost:8080/api/artworks");
        assert!(!client.has_access_token());
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let client = ArtApiClient::new(&Config::default())
            .unwrap()
            .with_access_token(Some("   ".to_string()));
        assert!(!client.has_access_token());

        let client = client.with_access_token(Some("abc".to_string()));
        assert!(client.has_access_token());
    }

    #[test]
    fn test_api_error_truncates_body() {
        let long_body = "x".repeat(1000);
        match api_error("http://h/images", 500, &long_body) {
            AppError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message.len(), 300);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match api_error("http://h/images", 502, "") {
            AppError::Api { message, .. } => assert_eq!(message, "Unknown error"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
