//! HTTP client for the Slack Web API.
//!
//! Provides [`SlackClient`], the production [`ChatPlatform`]. It handles bot
//! token authentication, `ok`/`error` envelope decoding, cursor pagination,
//! and a single retry on transient failures (429, 5xx).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use standup_core::{
    ChannelInfo, ChatPlatform, OutgoingMessage, PlatformError, PlatformResult, PostedMessage,
    UserProfile,
};

use crate::types::{
    ConversationInfoResponse, MembersResponse, OpenConversationResponse, PermalinkResponse,
    PostMessageResponse, UserInfoResponse,
};

/// Default Web API base URL
const API_BASE_URL: &str = "https://slack.com/api";

/// Page size for cursor-paginated listings
const PAGE_LIMIT: &str = "200";

/// Longest server-requested back-off honoured before retrying
const MAX_RETRY_WAIT_SECS: u64 = 5;

/// Slack Web API client
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

/// How the method arguments travel
enum Args<'a> {
    Json(&'a Value),
    Query(&'a [(&'a str, &'a str)]),
}

impl SlackClient {
    /// Creates a client authenticated with a bot token (`xoxb-...`)
    pub fn new(bot_token: &str) -> PlatformResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {bot_token}"))
                .map_err(|e| PlatformError::Transport(format!("invalid bot token header value: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PlatformError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            max_retries: 1,
        })
    }

    /// Overrides the base URL (enterprise grid proxies, wiremock)
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the number of retries on transient failures
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn request(&self, method: &str, args: &Args<'_>) -> RequestBuilder {
        let url = format!("{}/{method}", self.base_url);
        match args {
            Args::Json(body) => self.client.post(url).json(body),
            Args::Query(params) => self.client.get(url).query(params),
        }
    }

    /// Call a Web API method and decode its payload
    async fn call<T: DeserializeOwned>(&self, method: &str, args: Args<'_>) -> PlatformResult<T> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            let response = self
                .request(method, &args)
                .send()
                .await
                .map_err(|e| PlatformError::Transport(format!("{method}: {e}")))?;

            let status = response.status();
            debug!(method, status = %status, attempt, "Slack API response received");

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());
                let error = if status == StatusCode::TOO_MANY_REQUESTS {
                    PlatformError::RateLimited { retry_after }
                } else {
                    PlatformError::Api(format!("{method} returned {status}"))
                };

                if attempt < self.max_retries {
                    let wait = retry_after.unwrap_or(1).min(MAX_RETRY_WAIT_SECS);
                    warn!(method, status = %status, wait, "Transient Slack error, will retry");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                    last_error = Some(error);
                    continue;
                }
                return Err(error);
            }

            if !status.is_success() {
                return Err(PlatformError::Api(format!("{method} returned {status}")));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| PlatformError::Transport(format!("{method}: invalid body: {e}")))?;
            return decode(method, body);
        }

        Err(last_error.unwrap_or_else(|| PlatformError::Api(format!("{method} failed after retries"))))
    }
}

/// Check the `ok` flag and decode the method payload
fn decode<T: DeserializeOwned>(method: &str, body: Value) -> PlatformResult<T> {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        let code = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error");
        if code == "ratelimited" {
            return Err(PlatformError::RateLimited { retry_after: None });
        }
        return Err(PlatformError::from_code(code));
    }
    serde_json::from_value(body)
        .map_err(|e| PlatformError::Api(format!("{method}: unexpected payload: {e}")))
}

#[async_trait]
impl ChatPlatform for SlackClient {
    #[instrument(skip(self, message), fields(channel = %message.channel))]
    async fn post_message(&self, message: OutgoingMessage) -> PlatformResult<PostedMessage> {
        let body = serde_json::to_value(&message)
            .map_err(|e| PlatformError::Transport(format!("chat.postMessage: {e}")))?;
        let posted: PostMessageResponse = self.call("chat.postMessage", Args::Json(&body)).await?;
        Ok(PostedMessage {
            channel: posted.channel,
            ts: posted.ts,
        })
    }

    #[instrument(skip(self, text))]
    async fn update_message(&self, channel_id: &str, ts: &str, text: &str) -> PlatformResult<()> {
        let body = json!({ "channel": channel_id, "ts": ts, "text": text });
        let _: Value = self.call("chat.update", Args::Json(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_direct_message(&self, user_id: &str, text: &str) -> PlatformResult<PostedMessage> {
        let body = json!({ "users": user_id });
        let opened: OpenConversationResponse = self.call("conversations.open", Args::Json(&body)).await?;
        self.post_message(OutgoingMessage::new(opened.channel.id, text)).await
    }

    #[instrument(skip(self))]
    async fn get_permalink(&self, channel_id: &str, ts: &str) -> PlatformResult<Option<String>> {
        let params = [("channel", channel_id), ("message_ts", ts)];
        match self
            .call::<PermalinkResponse>("chat.getPermalink", Args::Query(&params))
            .await
        {
            Ok(link) => Ok(Some(link.permalink)),
            Err(e) => {
                debug!(error = %e, "Permalink unavailable");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_channel_info(&self, channel_id: &str) -> PlatformResult<Option<ChannelInfo>> {
        let params = [("channel", channel_id)];
        match self
            .call::<ConversationInfoResponse>("conversations.info", Args::Query(&params))
            .await
        {
            Ok(info) => Ok(Some(info.channel.into())),
            Err(e) if e.is_bot_removed() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn get_channel_members(&self, channel_id: &str) -> PlatformResult<Vec<String>> {
        let mut members = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params = vec![("channel", channel_id), ("limit", PAGE_LIMIT)];
            if let Some(c) = cursor.as_deref() {
                params.push(("cursor", c));
            }
            let page: MembersResponse = self
                .call("conversations.members", Args::Query(&params))
                .await?;
            let next = page.next_cursor().map(String::from);
            members.extend(page.members);

            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        Ok(members)
    }

    #[instrument(skip(self))]
    async fn get_user_info(&self, user_id: &str) -> PlatformResult<UserProfile> {
        let params = [("user", user_id)];
        let info: UserInfoResponse = self.call("users.info", Args::Query(&params)).await?;
        Ok(info.user.into())
    }

    #[instrument(skip(self))]
    async fn add_reaction(&self, channel_id: &str, ts: &str, emoji: &str) -> PlatformResult<()> {
        let body = json!({ "channel": channel_id, "timestamp": ts, "name": emoji });
        match self.call::<Value>("reactions.add", Args::Json(&body)).await {
            Ok(_) => Ok(()),
            Err(PlatformError::Api(code)) if code == "already_reacted" => Ok(()),
            Err(e) => Err(e),
        }
    }
}
