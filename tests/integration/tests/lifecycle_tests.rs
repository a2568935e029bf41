//! Standup creation and cancellation against in-memory storage

use chrono::Duration;
use integration_tests::*;
use standup_core::{ChannelStatus, DomainError, PlatformError, StandupRepository, StandupStatus, Team, UserProfile};
use standup_service::{ChannelService, LifecycleService};

#[tokio::test]
async fn test_start_posts_prompt_and_schedules_first_reminder() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;

    let standup = h.start().await.expect("standup started");

    assert_eq!(standup.status, StandupStatus::Active);
    assert_eq!(standup.expected_participants, vec!["U1", "U2"]);
    assert!(standup.thread_ts.is_some());
    assert_eq!(standup.response_deadline, monday_nine() + Duration::hours(3));
    assert_eq!(standup.next_reminder_at, Some(monday_nine() + Duration::hours(1)));

    let posts = h.platform.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel, CHANNEL_ID);
    assert!(posts[0].thread_ts.is_none());
    assert!(posts[0].text.contains("Daily Standup Started"));
    assert!(posts[0].text.contains("<@U1> <@U2>"));

    let stored = h.standup(standup.id);
    assert_eq!(stored.thread_ts, standup.thread_ts);
    assert_eq!(h.channel().stats.total_standups, 1);
}

#[tokio::test]
async fn test_only_one_active_standup_per_channel() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    h.start().await.expect("first standup");

    let err = h.start().await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::StandupAlreadyActive)));
    assert_eq!(h.standups.all().len(), 1);
}

#[tokio::test]
async fn test_unconfigured_and_paused_channels_are_rejected() {
    let h = Harness::new();
    let err = h.start().await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::ChannelNotConfigured)));

    h.configure_with(&["U1"]).await;
    ChannelService::new(h.ctx())
        .set_channel_status(TEAM_ID, CHANNEL_ID, ChannelStatus::Paused)
        .await
        .unwrap();

    let err = h.start().await.unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::ChannelInactive(ChannelStatus::Paused))
    ));
    assert!(err.is_precondition());
    assert!(h.platform.posts().is_empty());
}

#[tokio::test]
async fn test_member_candidates_exclude_bots_and_the_app() {
    let h = Harness::new();
    h.configure("").await;
    h.teams
        .insert(Team::new(TEAM_ID, monday_nine()).with_bot_user(BOT_USER_ID));
    h.platform.set_members(
        CHANNEL_ID,
        &["U1", "B0INTEGRATION", BOT_USER_ID, "USLACKBOT", "U2", "UGONE", "UHELPER"],
    );
    h.platform.set_profile(UserProfile {
        id: "UGONE".into(),
        deleted: true,
        ..UserProfile::default()
    });
    h.platform.set_bot("UHELPER");

    let standup = h.start().await.expect("standup started");
    assert_eq!(standup.expected_participants, vec!["U1", "U2"]);
    assert_eq!(standup.away.away_count(), 0);
}

#[tokio::test]
async fn test_away_participants_are_excluded_and_reported() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2", "U3"]).await;
    h.platform.set_away("U3", "On vacation until Monday", ":palm_tree:");

    let standup = h.start().await.expect("standup started");

    assert_eq!(standup.expected_participants, vec!["U1", "U2"]);
    assert_eq!(standup.stats.total_expected, 2);
    assert_eq!(standup.away.total_original, 3);
    assert_eq!(standup.away.away_users.len(), 1);
    assert_eq!(standup.away.away_users[0].user_id, "U3");
    assert!(h.platform.posts()[0]
        .text
        .contains("1 team member(s) are currently out of office"));
}

#[tokio::test]
async fn test_everyone_away_skips_with_notice() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    h.platform.set_away("U1", "Vacation", "");
    h.platform.set_away("U2", "", ":airplane:");

    let err = h.start().await.unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::StandupSkippedAllAway { away: 2, total: 2 })
    ));
    assert!(h.standups.all().is_empty());

    let posts = h.platform.posts();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].thread_ts.is_none());
    assert!(posts[0].text.contains("Everyone is currently out of office!"));
}

#[tokio::test]
async fn test_skip_threshold_is_inclusive() {
    let h = Harness::new();
    let ids: Vec<String> = (1..=10).map(|i| format!("U{i}")).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    h.configure_with(&refs).await;
    for id in &ids[..9] {
        h.platform.set_away(id, "Sick", ":face_with_thermometer:");
    }

    let err = h.start().await.unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::StandupSkippedAllAway { away: 9, total: 10 })
    ));
    assert!(h.platform.posts()[0].text.contains("90% of the team"));
}

#[tokio::test]
async fn test_deactivated_explicit_participant_is_away() {
    let h = Harness::new();
    h.configure_with(&["U1", "UOLD"]).await;
    h.platform.set_profile(UserProfile {
        id: "UOLD".into(),
        deleted: true,
        ..UserProfile::default()
    });

    let standup = h.start().await.expect("standup started");
    assert_eq!(standup.expected_participants, vec!["U1"]);
    assert_eq!(standup.away.away_users[0].reason, "Account deactivated");
}

#[tokio::test]
async fn test_no_members_means_no_participants() {
    let h = Harness::new();
    h.configure("").await;
    h.platform.set_members(CHANNEL_ID, &[]);

    let err = h.start().await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::NoParticipants)));
}

#[tokio::test]
async fn test_failed_prompt_rolls_back() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    h.platform
        .fail_posts(Some(PlatformError::Transport("connection reset".into())));

    assert!(h.start().await.is_err());
    assert!(h.standups.all().is_empty());
    assert!(h.channel().is_runnable());
}

#[tokio::test]
async fn test_bot_removed_disables_channel() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    h.platform.fail_posts(Some(PlatformError::from_code("not_in_channel")));

    let err = h.start().await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::BotRemoved(_))));
    assert!(h.standups.all().is_empty());

    let channel = h.channel();
    assert!(channel.auto_disabled);
    assert_eq!(channel.status, ChannelStatus::Disabled);
    assert_eq!(channel.disabled_reason.as_deref(), Some("bot_removed"));

    // Reconfiguring brings it back
    h.platform.fail_posts(None);
    h.configure("time=10:00").await;
    assert!(h.channel().is_runnable());
    assert!(h.start().await.is_ok());
}

#[tokio::test]
async fn test_cancel_posts_notice_once() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    let standup = h.start().await.unwrap();
    let lifecycle = LifecycleService::new(h.ctx());

    assert!(lifecycle
        .cancel_standup(standup.id, ADMIN_ID, "Team offsite")
        .await
        .unwrap());
    assert!(!lifecycle
        .cancel_standup(standup.id, ADMIN_ID, "again")
        .await
        .unwrap());

    let stored = h.standup(standup.id);
    assert_eq!(stored.status, StandupStatus::Cancelled);
    assert_eq!(stored.cancel_reason.as_deref(), Some("Team offsite"));
    assert!(stored.next_reminder_at.is_none());

    let thread = h.platform.thread_posts(standup.thread_ts.as_deref().unwrap());
    assert_eq!(thread.len(), 1);
    assert!(thread[0].text.contains("Standup Cancelled"));
    assert!(lifecycle.active_standup(TEAM_ID, CHANNEL_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_setup_requires_channel_access() {
    let h = Harness::new();
    h.platform.hide_channel(CHANNEL_ID);

    let input = standup_service::ChannelConfigInput::parse_args("participants=U1").unwrap();
    let err = ChannelService::new(h.ctx())
        .configure_channel(TEAM_ID, CHANNEL_ID, ADMIN_ID, input, None)
        .await
        .unwrap_err();

    assert!(matches!(err.as_domain(), Some(DomainError::BotRemoved(_))));
    assert!(h.channels.get(TEAM_ID, CHANNEL_ID).is_none());
}

#[tokio::test]
async fn test_setup_takes_name_from_channel_info() {
    let h = Harness::new();

    let input = standup_service::ChannelConfigInput::parse_args("participants=U1").unwrap();
    let channel = ChannelService::new(h.ctx())
        .configure_channel(TEAM_ID, CHANNEL_ID, ADMIN_ID, input, None)
        .await
        .unwrap();

    assert_eq!(channel.channel_name.as_deref(), Some("channel-c0001"));
}

#[tokio::test]
async fn test_failed_profile_lookup_keeps_explicit_participant() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    h.platform.fail_profile_of("U2");

    let standup = h.start().await.expect("standup started");

    assert_eq!(standup.expected_participants, vec!["U1", "U2"]);
    assert_eq!(standup.away.away_count(), 0);
    assert_eq!(standup.stats.total_expected, 2);
}

#[tokio::test]
async fn test_failed_profile_lookup_keeps_channel_member() {
    let h = Harness::new();
    h.configure("").await;
    h.teams
        .insert(Team::new(TEAM_ID, monday_nine()).with_bot_user(BOT_USER_ID));
    h.platform.set_members(CHANNEL_ID, &["U1", "U2", BOT_USER_ID]);
    h.platform.fail_profile_of("U2");
    h.platform.fail_profile_of(BOT_USER_ID);

    let standup = h.start().await.expect("standup started");

    assert_eq!(standup.expected_participants, vec!["U1", "U2"]);
    assert_eq!(standup.away.away_count(), 0);
}

#[tokio::test]
async fn test_no_first_reminder_past_the_deadline() {
    let h = Harness::new();
    h.configure("participants=U1 timeout=30 interval=30").await;

    let standup = h.start().await.expect("standup started");

    assert!(standup.next_reminder_at.is_none());
    assert_eq!(standup.response_deadline, monday_nine() + Duration::minutes(30));
}

#[tokio::test]
async fn test_stale_write_cannot_reopen_cancelled_standup() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    let standup = h.start().await.unwrap();
    let mut stale = h.standup(standup.id);

    assert!(LifecycleService::new(h.ctx())
        .cancel_standup(standup.id, ADMIN_ID, "Team offsite")
        .await
        .unwrap());

    stale.next_reminder_at = Some(monday_nine() + Duration::minutes(90));
    let saved = h.standups.save(&stale).await.unwrap();

    assert!(!saved);
    let stored = h.standup(standup.id);
    assert_eq!(stored.status, StandupStatus::Cancelled);
    assert!(stored.next_reminder_at.is_none());
    assert!(LifecycleService::new(h.ctx())
        .active_standup(TEAM_ID, CHANNEL_ID)
        .await
        .unwrap()
        .is_none());
}
