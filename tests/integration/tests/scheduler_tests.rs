//! Scheduled starts, expiry sweeps, and retention cleanup

use chrono::{Duration, TimeZone, Utc};
use integration_tests::*;
use standup_core::{ChannelStatus, Response, Standup, StandupStatus, SYSTEM_ACTOR};
use standup_service::{ChannelService, LifecycleService};

fn old_standup(h: &Harness, days_ago: i64, status: StandupStatus) -> Standup {
    let started = monday_nine() - Duration::days(days_ago);
    let mut standup = Standup::new(
        TEAM_ID,
        CHANNEL_ID,
        vec!["Q1".into()],
        vec!["U1".into()],
        SYSTEM_ACTOR,
        false,
        started,
        Duration::hours(3),
    );
    match status {
        StandupStatus::Completed => standup.complete(started + Duration::hours(1)),
        StandupStatus::Cancelled => standup.cancel(ADMIN_ID, "skip", started),
        _ => {}
    }
    let response = Response::new(&standup, "U1", "done", "1.2", "1.1", started);
    h.responses.insert(response);
    h.standups.insert(standup.clone());
    standup
}

#[tokio::test]
async fn test_start_tick_runs_due_channel_once_per_day() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    let scheduler = h.scheduler();

    assert_eq!(scheduler.run_start_tick().await, 1);
    let standups = h.standups.all();
    assert_eq!(standups.len(), 1);
    assert!(!standups[0].is_manual);
    assert_eq!(standups[0].created_by, SYSTEM_ACTOR);

    // Same minute again: already ran today
    assert_eq!(scheduler.run_start_tick().await, 0);

    // Still blocked after the standup is cancelled
    LifecycleService::new(h.ctx())
        .cancel_standup(standups[0].id, ADMIN_ID, "oops")
        .await
        .unwrap();
    assert_eq!(scheduler.run_start_tick().await, 0);

    // Next scheduled day starts again
    h.clock.set(monday_nine() + Duration::days(1));
    assert_eq!(scheduler.run_start_tick().await, 1);
    assert_eq!(h.standups.all().len(), 2);
}

#[tokio::test]
async fn test_start_tick_respects_time_and_weekday() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    let scheduler = h.scheduler();

    h.clock.set(monday_nine() + Duration::minutes(1));
    assert_eq!(scheduler.run_start_tick().await, 0);

    // Saturday 2024-03-09 09:00 UTC
    h.clock.set(Utc.with_ymd_and_hms(2024, 3, 9, 9, 0, 0).unwrap());
    assert_eq!(scheduler.run_start_tick().await, 0);
    assert!(h.standups.all().is_empty());
}

#[tokio::test]
async fn test_start_tick_uses_channel_timezone() {
    let h = Harness::new();
    h.configure("participants=U1 time=10:00 tz=Europe/Berlin days=mon")
        .await;
    let scheduler = h.scheduler();

    // 10:00 in Berlin is 09:00 UTC in March
    assert_eq!(scheduler.run_start_tick().await, 1);
}

#[tokio::test]
async fn test_start_tick_skips_paused_channels() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    ChannelService::new(h.ctx())
        .set_channel_status(TEAM_ID, CHANNEL_ID, ChannelStatus::Paused)
        .await
        .unwrap();

    assert_eq!(h.scheduler().run_start_tick().await, 0);
    assert!(h.platform.posts().is_empty());
}

#[tokio::test]
async fn test_start_tick_posts_away_notice_when_team_is_out() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    h.platform.set_away("U1", "OOO", "");

    assert_eq!(h.scheduler().run_start_tick().await, 0);
    assert!(h.standups.all().is_empty());
    assert!(h.platform.posts()[0].text.contains("Team Out of Office"));
}

#[tokio::test]
async fn test_expiry_tick_completes_overdue_standups() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    let standup = h.start().await.unwrap();
    h.reply(&standup, "U1", "a\nb\nc").await.unwrap();
    let scheduler = h.scheduler();

    h.clock.set(standup.response_deadline);
    assert_eq!(scheduler.run_expiry_tick().await, 0);

    h.clock.advance(Duration::seconds(1));
    assert_eq!(scheduler.run_expiry_tick().await, 1);

    let stored = h.standup(standup.id);
    assert_eq!(stored.status, StandupStatus::Completed);
    assert_eq!(stored.stats.total_responded, 1);
    assert_eq!(stored.response_rate_rounded(), 50);
}

#[tokio::test]
async fn test_cleanup_deletes_only_old_terminal_standups() {
    let h = Harness::new();
    let old_completed = old_standup(&h, 40, StandupStatus::Completed);
    let old_cancelled = old_standup(&h, 31, StandupStatus::Cancelled);
    let old_open = old_standup(&h, 45, StandupStatus::Active);
    let recent = old_standup(&h, 5, StandupStatus::Completed);

    let deleted = h.scheduler().run_cleanup().await.unwrap();
    assert_eq!(deleted, 2);

    let remaining: Vec<_> = h.standups.all().into_iter().map(|s| s.id).collect();
    assert!(!remaining.contains(&old_completed.id));
    assert!(!remaining.contains(&old_cancelled.id));
    assert!(remaining.contains(&old_open.id));
    assert!(remaining.contains(&recent.id));

    assert!(h.responses.for_standup(old_completed.id).is_empty());
    assert_eq!(h.responses.for_standup(recent.id).len(), 1);
    assert_eq!(h.responses.count(), 2);
}
