//! Session resolution through the external identity provider.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::user::SessionIdentity;

/// Cookie set by the web front end for signed-in users.
pub const SESSION_COOKIE: &str = "__session";

/// Resolves a raw session credential into an identity.
///
/// `Ok(None)` means the credential is unknown or expired; errors are reserved
/// for the provider itself misbehaving.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, credential: &str) -> Result<Option<SessionIdentity>, AppError>;
}

/// Pulls the session credential from `Authorization: Bearer` or, failing
/// that, the session cookie.
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves the session on a request, if any credential was sent.
pub async fn resolve_request(
    resolver: &dyn SessionResolver,
    headers: &HeaderMap,
) -> Result<Option<SessionIdentity>, AppError> {
    match extract_credential(headers) {
        Some(credential) => resolver.resolve(&credential).await,
        None => Ok(None),
    }
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

/// HTTP client for the identity provider's session verification endpoint.
#[derive(Clone)]
pub struct IdentityProviderClient {
    client: Client,
    verify_url: String,
    api_key: String,
}

impl IdentityProviderClient {
    pub fn new(base_url: &str, api_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            verify_url: format!("{}/v1/sessions/verify", base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl SessionResolver for IdentityProviderClient {
    async fn resolve(&self, credential: &str) -> Result<Option<SessionIdentity>, AppError> {
        let response = self
            .client
            .post(&self.verify_url)
            .bearer_auth(&self.api_key)
            .json(&VerifyRequest { token: credential })
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
                debug!("Identity provider rejected session credential ({status})");
                Ok(None)
            }
            s if s.is_success() => {
                let identity: SessionIdentity = response.json().await?;
                debug!(user_id = %identity.id, "Session resolved");
                Ok(Some(identity))
            }
            other => {
                let body = response.text().await.unwrap_or_default();
                warn!("Identity provider returned {other}: {body}");
                Err(AppError::IdentityProvider(format!(
                    "verify returned {other}"
                )))
            }
        }
    }
}
