//! Thread reply ingestion

use chrono::Duration;
use integration_tests::*;
use standup_core::{StandupStatus, Team};
use standup_service::{
    CheckOutcome, CompletionReason, IgnoreReason, IncomingReply, IngestOutcome, LifecycleService,
};

#[tokio::test]
async fn test_first_reply_is_recorded() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    let standup = h.start().await.unwrap();

    let outcome = h
        .reply(&standup, "U1", "Wrote tests\nFixing the importer\nNone")
        .await
        .unwrap();

    match outcome {
        IngestOutcome::Created { completion, .. } => {
            assert!(matches!(completion, CheckOutcome::Waiting { ref missing, .. } if missing == &vec!["U2".to_string()]));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let responses = h.responses.for_standup(standup.id);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].is_complete);
    assert_eq!(responses[0].answers[1], "Fixing the importer");
    assert_eq!(responses[0].username.as_deref(), Some("u1"));
    assert_eq!(responses[0].response_time_ms, Some(0));

    let stored = h.standup(standup.id);
    assert_eq!(stored.actual_participants, vec!["U1"]);
    assert_eq!(stored.stats.total_responded, 1);
    assert!((stored.stats.response_rate - 50.0).abs() < f64::EPSILON);

    let reactions = h.platform.reactions();
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0].emoji, "white_check_mark");
}

#[tokio::test]
async fn test_second_reply_edits_existing_response() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    let standup = h.start().await.unwrap();

    h.reply(&standup, "U1", "one line").await.unwrap();
    h.clock.advance(Duration::minutes(5));
    let outcome = h.reply(&standup, "U1", "a\nb\nc").await.unwrap();

    assert!(matches!(outcome, IngestOutcome::Updated { edit_count: 1, .. }));

    let responses = h.responses.for_standup(standup.id);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].is_edited);
    assert!(responses[0].is_complete);
    assert_eq!(responses[0].answers, vec!["a", "b", "c"]);
    assert_eq!(h.standup(standup.id).actual_participants, vec!["U1"]);
    assert_eq!(h.platform.reactions()[1].emoji, "pencil2");
}

#[tokio::test]
async fn test_incomplete_reply_still_counts() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    let standup = h.start().await.unwrap();

    h.reply(&standup, "U1", "only yesterday").await.unwrap();

    let responses = h.responses.for_standup(standup.id);
    assert!(!responses[0].is_complete);
    assert_eq!(responses[0].answers, vec!["only yesterday", "", ""]);
    assert_eq!(h.standup(standup.id).stats.total_responded, 1);
}

#[tokio::test]
async fn test_last_reply_completes_standup() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    let standup = h.start().await.unwrap();

    h.reply(&standup, "U1", "a\nb\nc").await.unwrap();
    h.clock.advance(Duration::minutes(20));
    let outcome = h.reply(&standup, "U2", "d\ne\nf").await.unwrap();

    assert!(matches!(
        outcome,
        IngestOutcome::Created {
            completion: CheckOutcome::Completed(CompletionReason::AllResponded),
            ..
        }
    ));

    let stored = h.standup(standup.id);
    assert_eq!(stored.status, StandupStatus::Completed);
    assert!(stored.summary_message_ts.is_some());
    assert!(stored.next_reminder_at.is_none());

    let thread = h.platform.thread_posts(standup.thread_ts.as_deref().unwrap());
    assert_eq!(thread.len(), 1);
    assert!(thread[0].text.contains("Standup Completed!"));
    assert!(thread[0].text.contains("*Responses:* 2/2 (100%)"));
}

#[tokio::test]
async fn test_late_reply_completes_expired_standup() {
    let h = Harness::new();
    h.configure_with(&["U1", "U2"]).await;
    let standup = h.start().await.unwrap();

    h.clock.advance(Duration::hours(3) + Duration::minutes(1));
    let outcome = h.reply(&standup, "U1", "a\nb\nc").await.unwrap();

    assert!(matches!(
        outcome,
        IngestOutcome::Created {
            completion: CheckOutcome::Completed(CompletionReason::Expired),
            ..
        }
    ));
    assert_eq!(h.responses.count(), 1);
    assert_eq!(h.standup(standup.id).stats.total_responded, 1);
}

#[tokio::test]
async fn test_messages_that_are_not_responses() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    h.teams
        .insert(Team::new(TEAM_ID, monday_nine()).with_bot_user(BOT_USER_ID));
    let standup = h.start().await.unwrap();
    let thread_ts = standup.thread_ts.clone();

    let base = IncomingReply {
        team_id: TEAM_ID.into(),
        channel_id: CHANNEL_ID.into(),
        user_id: Some("U1".into()),
        text: "a\nb\nc".into(),
        ts: h.next_reply_ts(),
        thread_ts: thread_ts.clone(),
        ..IncomingReply::default()
    };

    let top_level = IncomingReply {
        thread_ts: None,
        ..base.clone()
    };
    let edited = IncomingReply {
        subtype: Some("message_changed".into()),
        ..base.clone()
    };
    let from_integration = IncomingReply {
        bot_id: Some("B1".into()),
        ..base.clone()
    };
    let from_app = IncomingReply {
        user_id: Some(BOT_USER_ID.into()),
        ..base.clone()
    };
    let other_thread = IncomingReply {
        thread_ts: Some("1600000000.000001".into()),
        ..base.clone()
    };
    let outsider = IncomingReply {
        user_id: Some("U9".into()),
        ..base.clone()
    };

    let cases = [
        (top_level, IgnoreReason::NotThreadReply),
        (edited, IgnoreReason::SystemOrBot),
        (from_integration, IgnoreReason::SystemOrBot),
        (from_app, IgnoreReason::FromBot),
        (other_thread, IgnoreReason::UnknownThread),
        (outsider, IgnoreReason::NotExpected),
    ];
    for (reply, reason) in cases {
        assert_eq!(h.ingest(&reply).await.unwrap(), IngestOutcome::Ignored(reason));
    }
    assert_eq!(h.responses.count(), 0);
    assert!(h.platform.reactions().is_empty());
}

#[tokio::test]
async fn test_reply_to_cancelled_standup_is_ignored() {
    let h = Harness::new();
    h.configure_with(&["U1"]).await;
    let standup = h.start().await.unwrap();
    LifecycleService::new(h.ctx())
        .cancel_standup(standup.id, ADMIN_ID, "No standup today")
        .await
        .unwrap();

    let outcome = h.reply(&standup, "U1", "a\nb\nc").await.unwrap();
    assert_eq!(
        outcome,
        IngestOutcome::Ignored(IgnoreReason::StandupNotOpen(StandupStatus::Cancelled))
    );
    assert_eq!(h.responses.count(), 0);
}
