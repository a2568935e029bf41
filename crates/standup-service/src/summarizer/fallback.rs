//! Deterministic summary used when the summarizer is unavailable or fails

use chrono::{DateTime, Utc};
use standup_core::{Analysis, Mood, Response, StandupSummary, SummarySource};

use crate::services::messages::mention;

/// Build the non-AI summary from the raw responses
pub fn fallback_summary(responses: &[Response], expected: u32, now: DateTime<Utc>) -> StandupSummary {
    let rate = if expected > 0 {
        (responses.len() as f64 / f64::from(expected) * 100.0).round() as u32
    } else {
        0
    };

    let mut text = format!(
        "📊 Standup Summary ({}/{expected} responses, {rate}%)",
        responses.len()
    );
    if !responses.is_empty() {
        let participants: Vec<String> = responses.iter().map(|r| mention(&r.user_id)).collect();
        text.push_str(&format!("\n\n👥 Participants: {}", participants.join(", ")));
    }
    text.push_str(
        "\n\n🤖 AI analysis is currently unavailable. Manual review recommended for detailed insights.",
    );

    StandupSummary {
        text,
        achievements: Vec::new(),
        blockers: Vec::new(),
        next_steps: Vec::new(),
        mood: Mood::Neutral,
        generated_by: SummarySource::Fallback,
        generated_at: now,
    }
}

/// Attach provenance to a summarizer analysis
pub fn summary_from_analysis(analysis: Analysis, now: DateTime<Utc>) -> StandupSummary {
    StandupSummary {
        text: analysis.summary,
        achievements: analysis.achievements,
        blockers: analysis.blockers,
        next_steps: analysis.next_steps,
        mood: analysis.mood,
        generated_by: SummarySource::Ai,
        generated_at: now,
    }
}
