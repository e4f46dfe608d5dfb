//! Social-login completion.
//!
//! The login state lives in an [`AuthContext`] owned by the caller instead of a
//! global store, so its lifetime is the lifetime of the value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AppResult;
use crate::events::{safe_emit_event, EventSink, UiEvent, ROUTE_HOME};
use crate::models::SessionTokens;
use crate::security::InputValidator;
use crate::uploader::AuthApi;

/// Length of the ids Kakao hands out; used only when no provider tag is present.
const KAKAO_ID_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocialProvider {
    Kakao,
    Naver,
}

impl SocialProvider {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "kakao" => Some(SocialProvider::Kakao),
            "naver" => Some(SocialProvider::Naver),
            _ => None,
        }
    }

    /// Legacy classification by id length.
    pub fn infer_from_social_id(social_id: &str) -> Self {
        if social_id.chars().count() == KAKAO_ID_LEN {
            SocialProvider::Kakao
        } else {
            SocialProvider::Naver
        }
    }

    /// Prefer the tag carried through the login redirect, fall back to the id heuristic.
    pub fn resolve(tag: Option<&str>, social_id: &str) -> Self {
        if let Some(tag) = tag {
            match Self::from_tag(tag) {
                Some(provider) => return provider,
                None => log::warn!("Unknown provider tag '{}', inferring from id", tag),
            }
        } else {
            log::warn!("Login callback carried no provider tag, inferring from id");
        }
        Self::infer_from_social_id(social_id)
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocialProvider::Kakao => f.write_str("KAKAO"),
            SocialProvider::Naver => f.write_str("NAVER"),
        }
    }
}

/// Payload of the provider redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCallback {
    pub social_id: String,
    #[serde(default)]
    pub provider: Option<String>,
}

impl LoginCallback {
    pub fn provider(&self) -> SocialProvider {
        SocialProvider::resolve(self.provider.as_deref(), &self.social_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => ROUTE_HOME,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    tokens: Option<SessionTokens>,
    login_attempted: bool,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.tokens.is_some()
    }

    pub fn login_attempted(&self) -> bool {
        self.login_attempted
    }

    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.access_token.as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.refresh_token.as_str())
    }

    pub fn user_role(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.user_role.as_str())
    }

    pub fn store_tokens(&mut self, tokens: SessionTokens) {
        log::info!("Logged in with role {}", tokens.user_role);
        self.tokens = Some(tokens);
    }

    pub fn logout(&mut self) {
        if self.tokens.take().is_some() {
            log::info!("Logged out");
        }
    }

    pub fn mark_login_attempted(&mut self) {
        self.login_attempted = true;
    }

    /// Drop everything, including the attempted flag.
    pub fn teardown(&mut self) {
        *self = Self::default();
    }
}

async fn exchange(
    api: &dyn AuthApi,
    social_id: &str,
    provider: SocialProvider,
) -> AppResult<SessionTokens> {
    InputValidator::validate_social_id(social_id)?;
    api.exchange_social_id(social_id.trim(), provider).await
}

/// Trade the provider's social id for API tokens.
///
/// Whatever happens, the login is marked as attempted and the caller is sent
/// home; a failed exchange leaves the context logged out.
pub async fn complete_social_login(
    api: &dyn AuthApi,
    ctx: &mut AuthContext,
    callback: &LoginCallback,
    sink: &dyn EventSink,
) -> Route {
    let provider = callback.provider();
    log::info!("Completing {} login", provider);

    match exchange(api, &callback.social_id, provider).await {
        Ok(tokens) => ctx.store_tokens(tokens),
        Err(e) => {
            log::error!("Social login exchange failed: {}", e);
            ctx.logout();
        }
    }

    ctx.mark_login_attempted();

    let route = Route::Home;
    safe_emit_event(
        sink,
        UiEvent::Navigate {
            route: route.path().to_string(),
        },
    );
    route
}
