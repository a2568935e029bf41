//! HTTP surface: signature checks, Events API, slash commands, health

use chrono::Utc;
use integration_tests::*;
use serde_json::{json, Value};
use standup_core::StandupStatus;
use standup_slack::compute_signature;

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await;

    let response = server.get("/health").await;
    assert_status(&response, 200);
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let server = TestServer::start().await;

    let response = server.get("/health/ready").await;
    assert_status(&response, 503);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["checks"]["database"], "unhealthy");
}

// ============================================================================
// Request signing
// ============================================================================

#[tokio::test]
async fn test_unsigned_request_is_rejected() {
    let server = TestServer::start().await;

    let response = server
        .post_raw("/slack/events", "application/json", "{}", None, &[])
        .await;
    assert_status(&response, 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_SIGNATURE");
}

#[tokio::test]
async fn test_tampered_body_is_rejected() {
    let server = TestServer::start().await;
    let timestamp = Utc::now().timestamp().to_string();
    let signature = compute_signature(TEST_SIGNING_SECRET, &timestamp, b"{\"a\":1}").unwrap();

    let response = server
        .post_raw(
            "/slack/events",
            "application/json",
            "{\"a\":2}",
            Some((&timestamp, &signature)),
            &[],
        )
        .await;
    assert_status(&response, 401);
}

#[tokio::test]
async fn test_stale_request_is_rejected() {
    let server = TestServer::start().await;
    let body = json!({ "type": "url_verification", "challenge": "abc" }).to_string();
    let timestamp = (Utc::now().timestamp() - 10 * 60).to_string();
    let signature = compute_signature(TEST_SIGNING_SECRET, &timestamp, body.as_bytes()).unwrap();

    let response = server
        .post_raw(
            "/slack/events",
            "application/json",
            &body,
            Some((&timestamp, &signature)),
            &[],
        )
        .await;
    assert_status(&response, 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "STALE_REQUEST");
}

// ============================================================================
// Events API
// ============================================================================

#[tokio::test]
async fn test_url_verification_echoes_challenge() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/slack/events",
            &json!({
                "token": "ignored",
                "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P",
                "type": "url_verification"
            }),
        )
        .await;
    assert_status(&response, 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["challenge"],
        "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"
    );
}

#[tokio::test]
async fn test_malformed_event_body_is_bad_request() {
    let server = TestServer::start().await;

    let response = server
        .post_signed("/slack/events", "application/json", "not json")
        .await;
    assert_status(&response, 400);
}

fn message_event(thread_ts: &str, user: &str, ts: &str) -> Value {
    json!({
        "type": "event_callback",
        "team_id": TEAM_ID,
        "event_id": format!("Ev{ts}"),
        "authorizations": [{ "user_id": BOT_USER_ID, "is_bot": true }],
        "event": {
            "type": "message",
            "channel": CHANNEL_ID,
            "user": user,
            "text": "Reviewed PRs\nRelease notes\nNone",
            "ts": ts,
            "thread_ts": thread_ts
        }
    })
}

#[tokio::test]
async fn test_thread_reply_event_is_ingested() {
    let server = TestServer::start().await;
    let h = &server.harness;
    h.configure_with(&["U1", "U2"]).await;
    let standup = h.start().await.unwrap();
    let thread_ts = standup.thread_ts.clone().unwrap();

    let response = server
        .post_json("/slack/events", &message_event(&thread_ts, "U1", "1700000500.000100"))
        .await;
    assert_status(&response, 200);

    assert!(eventually(|| h.responses.count() == 1).await);
    assert!(
        eventually(|| h
            .teams
            .get(TEAM_ID)
            .and_then(|t| t.bot_user_id)
            .as_deref()
            == Some(BOT_USER_ID))
        .await
    );
}

#[tokio::test]
async fn test_retried_delivery_is_ignored() {
    let server = TestServer::start().await;
    let h = &server.harness;
    h.configure_with(&["U1"]).await;
    let standup = h.start().await.unwrap();
    let thread_ts = standup.thread_ts.clone().unwrap();

    let body = message_event(&thread_ts, "U1", "1700000600.000100").to_string();
    let timestamp = Utc::now().timestamp().to_string();
    let signature = compute_signature(TEST_SIGNING_SECRET, &timestamp, body.as_bytes()).unwrap();
    let response = server
        .post_raw(
            "/slack/events",
            "application/json",
            &body,
            Some((&timestamp, &signature)),
            &[("x-slack-retry-num", "1"), ("x-slack-retry-reason", "http_timeout")],
        )
        .await;
    assert_status(&response, 200);

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert_eq!(h.responses.count(), 0);
    assert_eq!(h.standup(standup.id).status, StandupStatus::Active);
}

#[tokio::test]
async fn test_bot_leaving_channel_disables_it() {
    let server = TestServer::start().await;
    let h = &server.harness;
    h.configure_with(&["U1"]).await;

    let response = server
        .post_json(
            "/slack/events",
            &json!({
                "type": "event_callback",
                "team_id": TEAM_ID,
                "authorizations": [{ "user_id": BOT_USER_ID, "is_bot": true }],
                "event": { "type": "member_left_channel", "user": BOT_USER_ID, "channel": CHANNEL_ID }
            }),
        )
        .await;
    assert_status(&response, 200);

    assert!(eventually(|| h.channel().auto_disabled).await);
}

#[tokio::test]
async fn test_channel_rename_is_tracked() {
    let server = TestServer::start().await;
    let h = &server.harness;
    h.configure_with(&["U1"]).await;

    let response = server
        .post_json(
            "/slack/events",
            &json!({
                "type": "event_callback",
                "team_id": TEAM_ID,
                "event": { "type": "channel_rename", "channel": { "id": CHANNEL_ID, "name": "platform-team" } }
            }),
        )
        .await;
    assert_status(&response, 200);

    assert!(eventually(|| h.channel().channel_name.as_deref() == Some("platform-team")).await);
}

// ============================================================================
// Slash commands
// ============================================================================

#[tokio::test]
async fn test_unknown_command() {
    let server = TestServer::start().await;

    let reply = server.command("/standup-dance", "").await;
    assert_eq!(reply["response_type"], "ephemeral");
    assert_eq!(
        reply["text"],
        "Unknown command `/standup-dance`. Try `/standup-status`."
    );
}

#[tokio::test]
async fn test_status_before_setup() {
    let server = TestServer::start().await;

    let reply = server.command("/standup-status", "").await;
    assert!(reply["text"].as_str().unwrap().contains("/standup-setup"));
}

#[tokio::test]
async fn test_setup_start_and_complete_commands() {
    let server = TestServer::start().await;
    server.harness.platform.set_members(CHANNEL_ID, &["U1", "U2"]);

    let reply = server
        .command("/standup-setup", "time=09:30 days=mon,wed,fri tz=UTC")
        .await;
    let text = reply["text"].as_str().unwrap();
    assert!(text.contains("Standup configured for #eng"));
    assert!(text.contains("Monday, Wednesday, Friday at 09:30 (UTC)"));

    let reply = server.command("/standup-start", "").await;
    assert!(reply["text"]
        .as_str()
        .unwrap()
        .starts_with("🚀 Standup started with 2 participant(s)."));

    let reply = server.command("/standup-start", "").await;
    assert_eq!(reply["text"], "A standup is already running in this channel.");

    let reply = server.command("/standup-complete", "").await;
    assert_eq!(reply["text"], "✅ Standup completed with 0/2 responses (0%).");

    let reply = server.command("/standup-remind", "").await;
    assert_eq!(reply["text"], "No active standup in this channel.");
}

#[tokio::test]
async fn test_invalid_setup_arguments() {
    let server = TestServer::start().await;

    let reply = server.command("/standup-setup", "time=25:00").await;
    assert!(reply["text"].as_str().unwrap().starts_with("⚠️"));
    assert!(server.harness.channels.get(TEAM_ID, CHANNEL_ID).is_none());
}

#[tokio::test]
async fn test_pause_and_resume_commands() {
    let server = TestServer::start().await;
    server.harness.configure_with(&["U1"]).await;

    let reply = server.command("/standup-pause", "").await;
    assert!(reply["text"].as_str().unwrap().starts_with("⏸️"));

    let reply = server.command("/standup-start", "").await;
    assert!(reply["text"].as_str().unwrap().starts_with("Standups are paused"));

    let reply = server.command("/standup-resume", "").await;
    assert!(reply["text"]
        .as_str()
        .unwrap()
        .starts_with("▶️ Scheduled standups resumed. Next run:"));
    assert!(server.harness.channel().is_runnable());
}
