//! Availability filter
//!
//! Classifies candidate participants as available or away from their
//! platform profile. A failed lookup keeps the candidate available.

use std::collections::HashMap;

use futures::future::join_all;
use standup_common::AvailabilityConfig;
use standup_core::{AwaySnapshot, AwayUser, UserProfile};
use tracing::{debug, instrument, warn};

use super::context::ServiceContext;

/// Outcome of an availability pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AvailabilityReport {
    /// Available candidate ids, in candidate order
    pub available: Vec<String>,
    pub away: Vec<AwayUser>,
    pub total: usize,
    /// The away share reached the configured threshold
    pub should_skip: bool,
}

impl AvailabilityReport {
    pub fn away_count(&self) -> usize {
        self.away.len()
    }

    /// Snapshot stored on the standup for reporting
    pub fn snapshot(&self) -> AwaySnapshot {
        AwaySnapshot {
            total_original: self.total as u32,
            away_users: self.away.clone(),
        }
    }
}

/// Whether `away` out of `total` reaches the skip threshold (inclusive)
pub fn should_skip(away: usize, total: usize, threshold: f64) -> bool {
    if total == 0 {
        return true;
    }
    away as f64 / total as f64 >= threshold
}

/// Human-readable reason for an away status
fn away_reason(profile: &UserProfile) -> String {
    if profile.deleted {
        return "Account deactivated".to_string();
    }
    if !profile.status_text.trim().is_empty() {
        return profile.status_text.trim().to_string();
    }
    match profile.status_emoji.as_str() {
        ":palm_tree:" | ":beach_with_umbrella:" | ":island:" => "On vacation",
        ":airplane:" => "Traveling",
        ":face_with_thermometer:" | ":pill:" | ":hospital:" => "Sick leave",
        "" => "Out of office",
        _ => "Away",
    }
    .to_string()
}

/// Classify one profile; `Some(reason)` when the user is away
///
/// Deactivated accounts are always away. Otherwise a keyword in the status
/// text or an away emoji marks the user away unless the status has expired.
pub fn classify(profile: &UserProfile, policy: &AvailabilityConfig, now_unix: i64) -> Option<String> {
    if profile.deleted {
        return Some(away_reason(profile));
    }
    if profile.status_expiration > 0 && profile.status_expiration < now_unix {
        return None;
    }

    let text = profile.status_text.to_lowercase();
    let keyword = policy
        .keywords
        .iter()
        .any(|k| !k.is_empty() && text.contains(&k.to_lowercase()));
    let emoji = policy
        .emojis
        .iter()
        .any(|e| !e.is_empty() && profile.status_emoji.contains(e.as_str()));

    (keyword || emoji).then(|| away_reason(profile))
}

/// Availability service
pub struct AvailabilityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AvailabilityService<'a> {
    /// Create a new AvailabilityService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Split candidates into available and away
    ///
    /// Lookups run in concurrent batches of `batch_size`; results are
    /// re-assembled by candidate id so completion order does not matter.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn filter_available(&self, candidates: &[String]) -> AvailabilityReport {
        let policy = &self.ctx.settings().availability;
        let now_unix = self.ctx.now().timestamp();
        let mut away_by_id: HashMap<&str, AwayUser> = HashMap::new();

        for batch in candidates.chunks(policy.batch_size.max(1)) {
            let lookups = batch.iter().map(|id| self.ctx.platform().get_user_info(id));
            let results = join_all(lookups).await;

            for (id, result) in batch.iter().zip(results) {
                match result {
                    Ok(profile) => {
                        if let Some(reason) = classify(&profile, policy, now_unix) {
                            debug!(user_id = %id, reason = %reason, "Participant is away");
                            away_by_id.insert(
                                id.as_str(),
                                AwayUser {
                                    user_id: id.clone(),
                                    reason,
                                    display_name: Some(profile.label().to_string())
                                        .filter(|name| name != id),
                                },
                            );
                        }
                    }
                    Err(e) => {
                        warn!(user_id = %id, error = %e, "Status lookup failed, assuming available");
                    }
                }
            }
        }

        let mut available = Vec::with_capacity(candidates.len());
        let mut away = Vec::with_capacity(away_by_id.len());
        for id in candidates {
            match away_by_id.remove(id.as_str()) {
                Some(user) => away.push(user),
                None => available.push(id.clone()),
            }
        }

        let total = candidates.len();
        let should_skip = should_skip(away.len(), total, policy.threshold);
        debug!(
            available = available.len(),
            away = away.len(),
            should_skip,
            "Availability check complete"
        );

        AvailabilityReport {
            available,
            away,
            total,
            should_skip,
        }
    }
}
