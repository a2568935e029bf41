//! Reminders for participants who have not answered

use chrono::Duration;
use integration_tests::*;
use standup_core::{ReminderKind, StandupStatus};
use standup_service::{LifecycleService, ReminderService};

#[tokio::test]
async fn test_reminders_reach_only_missing_participants() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2", "U3"]).await;
    let standup = h.start().await.unwrap();
    h.reply(&standup, "U1", "a\nb\nc").await.unwrap();
    h.clock.advance(Duration::hours(1));

    let sent = ReminderService::new(h.ctx())
        .send_reminders(standup.id)
        .await
        .unwrap();
    assert!(sent);

    let thread_ts = standup.thread_ts.as_deref().unwrap();
    let thread = h.platform.thread_posts(thread_ts);
    assert_eq!(thread.len(), 1);
    assert!(thread[0].text.starts_with("⏰ *Standup Reminder*"));
    assert!(thread[0].text.contains("<@U2> <@U3>"));
    assert!(!thread[0].text.contains("<@U1>"));
    assert!(thread[0].text.contains("*2 hour(s) and 0 minute(s)*"));

    let mut dm_users: Vec<String> = h.platform.dms().into_iter().map(|dm| dm.user_id).collect();
    dm_users.sort();
    assert_eq!(dm_users, vec!["U2", "U3"]);
    assert!(h.platform.dms()[0].text.contains("|standup thread>"));

    let stored = h.standup(standup.id);
    assert_eq!(stored.stats.reminders_sent, 3);
    assert_eq!(
        stored
            .reminders
            .iter()
            .filter(|r| r.kind == ReminderKind::Channel)
            .count(),
        1
    );
    assert_eq!(stored.next_reminder_at, Some(monday_nine() + Duration::hours(2)));
}

#[tokio::test]
async fn test_failed_dm_is_not_recorded() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    h.platform.fail_dm_to("U2");
    let standup = h.start().await.unwrap();

    assert!(ReminderService::new(h.ctx())
        .send_reminders(standup.id)
        .await
        .unwrap());

    let stored = h.standup(standup.id);
    let dm_targets: Vec<Option<String>> = stored
        .reminders
        .iter()
        .filter(|r| r.kind == ReminderKind::Dm)
        .map(|r| r.user_id.clone())
        .collect();
    assert_eq!(dm_targets, vec![Some("U1".to_string())]);
    assert_eq!(stored.stats.reminders_sent, 2);
}

#[tokio::test]
async fn test_closed_standup_gets_no_reminders() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    let standup = h.start().await.unwrap();
    LifecycleService::new(h.ctx())
        .cancel_standup(standup.id, ADMIN_ID, "Holiday")
        .await
        .unwrap();
    let posts_before = h.platform.posts().len();

    let sent = ReminderService::new(h.ctx())
        .send_reminders(standup.id)
        .await
        .unwrap();

    assert!(!sent);
    assert_eq!(h.platform.posts().len(), posts_before);
    assert!(h.platform.dms().is_empty());
    assert_eq!(h.standup(standup.id).status, StandupStatus::Cancelled);
}

#[tokio::test]
async fn test_due_reminders_stop_before_deadline() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    let standup = h.start().await.unwrap();
    let scheduler = h.scheduler();

    // Not due yet
    h.clock.advance(Duration::minutes(30));
    assert_eq!(scheduler.run_reminder_tick().await, 0);

    h.clock.set(monday_nine() + Duration::hours(1));
    assert_eq!(scheduler.run_reminder_tick().await, 1);
    assert_eq!(
        h.standup(standup.id).next_reminder_at,
        Some(monday_nine() + Duration::hours(2))
    );

    // The next one would land exactly on the deadline, so none is scheduled
    h.clock.set(monday_nine() + Duration::hours(2));
    assert_eq!(scheduler.run_reminder_tick().await, 1);
    assert_eq!(h.standup(standup.id).next_reminder_at, None);

    h.clock.advance(Duration::minutes(59));
    assert_eq!(scheduler.run_reminder_tick().await, 0);
    assert_eq!(h.standup(standup.id).stats.reminders_sent, 6);
}

#[tokio::test]
async fn test_reminders_disabled_for_channel() {
    let h = Harness::new();
    h.configure("participants=U1,U2 reminders=off").await;
    let standup = h.start().await.unwrap();
    assert!(standup.next_reminder_at.is_none());

    h.clock.advance(Duration::hours(2));
    assert_eq!(h.scheduler().run_reminder_tick().await, 0);
    assert!(h.platform.dms().is_empty());
}
