//! Signed Slack request extractors

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::HeaderMap,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use standup_slack::verify_signature;

use crate::response::ApiError;
use crate::state::AppState;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Raw request body whose signature has been verified
#[derive(Debug, Clone)]
pub struct SignedBody(pub Bytes);

#[async_trait]
impl FromRequest<AppState> for SignedBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let timestamp = header_value(req.headers(), TIMESTAMP_HEADER);
        let signature = header_value(req.headers(), SIGNATURE_HEADER);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.to_string()))?;

        verify_signature(
            &state.config().slack.signing_secret,
            &timestamp,
            &body,
            &signature,
            Utc::now().timestamp(),
        )?;

        Ok(Self(body))
    }
}

/// Verified form-encoded body (slash commands)
#[derive(Debug, Clone)]
pub struct SlackForm<T>(pub T);

#[async_trait]
impl<T> FromRequest<AppState> for SlackForm<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let SignedBody(body) = SignedBody::from_request(req, state).await?;
        let value = serde_urlencoded::from_bytes(&body).map_err(|e| ApiError::invalid_body(e.to_string()))?;
        Ok(Self(value))
    }
}

/// Verified JSON body (Events API)
#[derive(Debug, Clone)]
pub struct SlackJson<T>(pub T);

#[async_trait]
impl<T> FromRequest<AppState> for SlackJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let SignedBody(body) = SignedBody::from_request(req, state).await?;
        let value = serde_json::from_slice(&body).map_err(|e| ApiError::invalid_body(e.to_string()))?;
        Ok(Self(value))
    }
}
