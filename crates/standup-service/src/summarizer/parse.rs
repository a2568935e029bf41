//! Section parser for summarizer answers
//!
//! The model is asked for `**SUMMARY:**`, `**ACHIEVEMENTS:**`, `**BLOCKERS:**`,
//! `**NEXT STEPS:**` and `**TEAM MOOD:**` sections; anything outside them is
//! ignored.

use standup_core::{Analysis, Mood};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Achievements,
    Blockers,
    NextSteps,
    Mood,
}

const HEADERS: [(&str, Section); 5] = [
    ("SUMMARY", Section::Summary),
    ("ACHIEVEMENTS", Section::Achievements),
    ("BLOCKERS", Section::Blockers),
    ("NEXT STEPS", Section::NextSteps),
    ("TEAM MOOD", Section::Mood),
];

fn header(line: &str) -> Option<Section> {
    let bare = line.trim_matches(|c: char| c == '*' || c == '#' || c.is_whitespace());
    let bare = bare.strip_suffix(':').unwrap_or(bare).trim_end_matches('*');
    HEADERS
        .iter()
        .find(|(name, _)| bare.eq_ignore_ascii_case(name))
        .map(|&(_, section)| section)
}

/// Strip a leading bullet (`-`, `•`, `*`) or list number (`1.`)
fn strip_bullet(line: &str) -> &str {
    let line = line.trim_start_matches(['-', '•', '*']).trim_start();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && line[digits..].starts_with('.') {
        line[digits + 1..].trim_start()
    } else {
        line
    }
}

fn parse_mood(line: &str) -> Option<Mood> {
    let lower = line.to_lowercase();
    lower
        .split(|c: char| !c.is_alphabetic())
        .find_map(|word| match word {
            "positive" => Some(Mood::Positive),
            "negative" => Some(Mood::Negative),
            "neutral" => Some(Mood::Neutral),
            _ => None,
        })
}

/// Parse a sectioned analysis
pub fn parse_analysis(text: &str) -> Analysis {
    let mut analysis = Analysis::default();
    let mut mood_found = false;
    let mut current = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(section) = header(line) {
            current = Some(section);
            continue;
        }

        match current {
            Some(Section::Summary) => {
                if !analysis.summary.is_empty() {
                    analysis.summary.push(' ');
                }
                analysis.summary.push_str(line);
            }
            Some(Section::Mood) if !mood_found => {
                if let Some(mood) = parse_mood(line) {
                    analysis.mood = mood;
                    mood_found = true;
                }
            }
            Some(section @ (Section::Achievements | Section::Blockers | Section::NextSteps)) => {
                let item = strip_bullet(line).trim();
                if item.chars().count() <= 3 || item.to_lowercase().contains("none mentioned") {
                    continue;
                }
                let list = match section {
                    Section::Achievements => &mut analysis.achievements,
                    Section::Blockers => &mut analysis.blockers,
                    _ => &mut analysis.next_steps,
                };
                list.push(item.to_string());
            }
            _ => {}
        }
    }

    analysis
}
