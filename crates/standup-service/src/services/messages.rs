//! Message text builders
//!
//! Pure functions from engine state to the text posted in channels, threads
//! and direct messages. Nothing here talks to the platform.

use chrono::{DateTime, Datelike, Duration, Utc};
use standup_core::{AwayUser, Channel, Mood, Response, Standup, StandupSummary, WEEKDAY_NAMES};

/// Longest text posted in a single message
pub const MAX_MESSAGE_CHARS: usize = 3000;

/// Participants listed individually in a completion message
const MAX_LISTED_PARTICIPANTS: usize = 10;

/// Away users listed individually in a skip notification
const MAX_LISTED_AWAY: usize = 8;

/// Platform mention markup for a user
pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

fn mentions(user_ids: &[String]) -> String {
    user_ids.iter().map(|u| mention(u)).collect::<Vec<_>>().join(" ")
}

/// Cut text to at most `max` characters, marking the cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Sentence telling participants how long they have left
pub fn time_left_sentence(remaining: Duration) -> String {
    let hours = remaining.num_hours().max(0);
    let minutes = (remaining.num_minutes() % 60).max(0);

    if hours > 0 {
        format!("You have *{hours} hour(s) and {minutes} minute(s)* left to respond to today's standup.")
    } else if minutes > 0 {
        format!("You have *{minutes} minute(s)* left to respond to today's standup.")
    } else {
        "⚠️ Standup deadline has passed, but you can still respond!".to_string()
    }
}

/// Next scheduled run, e.g. "Tuesday at 09:00 (UTC)"
pub fn next_run_label(channel: &Channel, now: DateTime<Utc>) -> String {
    let schedule = &channel.config.schedule;
    match schedule.next_run_after(now) {
        Some(next) => format!(
            "{} at {} ({})",
            WEEKDAY_NAMES[next.weekday().num_days_from_sunday() as usize],
            schedule.time,
            schedule.timezone.name()
        ),
        None => "the next scheduled day".to_string(),
    }
}

fn away_lines(away: &[AwayUser], limit: usize) -> String {
    let mut lines: Vec<String> = away
        .iter()
        .take(limit)
        .map(|u| {
            let name = u.display_name.clone().unwrap_or_else(|| mention(&u.user_id));
            format!("• {name} - {}", u.reason)
        })
        .collect();
    if away.len() > limit {
        lines.push(format!("... and {} more", away.len() - limit));
    }
    lines.join("\n")
}

/// Prompt posted when a standup starts
pub fn standup_prompt(standup: &Standup, channel: &Channel) -> String {
    let tz = channel.config.timezone();
    let deadline = standup.response_deadline.with_timezone(&tz);

    let mut text = format!(
        "🚀 *Daily Standup Started!*\n\n{}\n\nPlease answer these questions in a reply to this thread, one line per question:\n",
        mentions(&standup.expected_participants)
    );
    for (i, question) in standup.questions.iter().enumerate() {
        text.push_str(&format!("*{}.* {question}\n", i + 1));
    }
    text.push_str(&format!(
        "\n⏰ Deadline: {} ({}) • Started {}",
        deadline.format("%H:%M"),
        tz.name(),
        if standup.is_manual { "manually" } else { "automatically" }
    ));

    let away = standup.away.away_count();
    if away > 0 {
        text.push_str(&format!("\n📴 {away} team member(s) are currently out of office."));
    }
    text.push_str("\n💡 *Tip:* You can edit your response anytime before the deadline.");

    truncate(&text, MAX_MESSAGE_CHARS)
}

/// Notice posted instead of a prompt when the team is away
pub fn away_notification(away: &[AwayUser], total: usize, channel: &Channel, now: DateTime<Utc>) -> String {
    let mut text = String::from("🏝️ *Standup Skipped - Team Out of Office*\n\n");

    if away.len() >= total {
        text.push_str("Everyone is currently out of office! 🌴\n\n");
    } else {
        let percent = (away.len() as f64 / total.max(1) as f64 * 100.0).round() as u32;
        text.push_str(&format!("{percent}% of the team is currently out of office.\n\n"));
    }

    if !away.is_empty() {
        text.push_str(&format!(
            "📴 *Out of Office ({}):*\n{}\n\n",
            away.len(),
            away_lines(away, MAX_LISTED_AWAY)
        ));
    }

    text.push_str(&format!(
        "🔄 *Next scheduled standup:* {}\n💡 Standup will resume automatically when team members return.",
        next_run_label(channel, now)
    ));

    truncate(&text, MAX_MESSAGE_CHARS)
}

/// In-thread notice after a cancellation
pub fn cancellation_notice(actor: &str, reason: &str) -> String {
    format!(
        "❌ *Standup Cancelled*\n\nThis standup has been cancelled by {}.\nReason: {reason}",
        mention(actor)
    )
}

fn mood_label(mood: Mood) -> &'static str {
    match mood {
        Mood::Positive => "😊 *Positive*",
        Mood::Neutral => "😐 *Neutral*",
        Mood::Negative => "😟 *Negative*",
    }
}

fn bullet_section(title: &str, items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let bullets: Vec<String> = items.iter().take(3).map(|i| format!("• {i}")).collect();
    Some(format!("*{title}:*\n{}", bullets.join("\n")))
}

/// Final results posted in the standup thread
pub fn completion_message(
    standup: &Standup,
    responses: &[Response],
    summary: &StandupSummary,
    now: DateTime<Utc>,
) -> String {
    let mut text = format!(
        "✅ *Standup Completed!*\n\n📊 *Responses:* {}/{} ({}%)\n⏱️ *Duration:* {} minutes",
        responses.len(),
        standup.stats.total_expected,
        standup.response_rate_rounded(),
        standup.duration(now).num_minutes().max(0)
    );

    let away = standup.away.away_count();
    if away > 0 {
        text.push_str(&format!("\n📴 *Out of office:* {away} team member(s)"));
    }

    if !responses.is_empty() {
        let mut lines: Vec<String> = responses
            .iter()
            .take(MAX_LISTED_PARTICIPANTS)
            .map(|r| format!("• {} {}", r.author_label(), if r.is_complete { "✅" } else { "⚠️" }))
            .collect();
        if responses.len() > MAX_LISTED_PARTICIPANTS {
            lines.push(format!("... and {} more", responses.len() - MAX_LISTED_PARTICIPANTS));
        }
        text.push_str(&format!("\n\n*Participants:*\n{}", lines.join("\n")));
    }

    let missing = standup.missing_participants().len();
    if missing > 0 {
        text.push_str(&format!("\n⚠️ Missing responses from {missing} participant(s)"));
    }

    if summary.is_fallback() {
        text.push_str(&format!("\n\n{}", summary.text));
    } else {
        if !summary.text.is_empty() {
            text.push_str(&format!("\n\n🤖 *AI Summary:*\n{}", summary.text));
        }
        for section in [
            bullet_section("🎉 Achievements", &summary.achievements),
            bullet_section("🚫 Blockers", &summary.blockers),
            bullet_section("📋 Next Steps", &summary.next_steps),
        ]
        .into_iter()
        .flatten()
        {
            text.push_str(&format!("\n\n{section}"));
        }
        text.push_str(&format!("\n\nTeam mood: {}", mood_label(summary.mood)));
    }

    truncate(&text, MAX_MESSAGE_CHARS)
}

/// In-thread reminder mentioning everyone still missing
pub fn channel_reminder(missing: &[String], remaining: Duration) -> String {
    format!(
        "⏰ *Standup Reminder*\n\n{}\n\n{}",
        mentions(missing),
        time_left_sentence(remaining)
    )
}

/// Direct-message reminder, linking the thread when a permalink is known
pub fn dm_reminder(remaining: Duration, permalink: Option<&str>) -> String {
    let mut text = format!("⏰ *Standup Reminder*\n\n{}", time_left_sentence(remaining));
    if let Some(url) = permalink {
        text.push_str(&format!("\n\nPlease post your update in the <{url}|standup thread>."));
    }
    text
}
