//! Achievement snapshot assembly and last-known-good merging.

use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde_json::Value;
use statgate_core::redact;
use statgate_model::{provider, safe_merge, AchievementSnapshot, MergeVerdict};
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Last-known-good snapshots outlive fetch caches; they are the merge
/// baseline and the regression guard.
const SNAPSHOT_TTL: Duration = Duration::from_secs(24 * 3600);

/// Builds the snapshot from the three provider payloads, merges it against
/// the last-known-good one, and writes the result back.
///
/// Any of `schema`/`global` may be missing (optional sub-fetches); the
/// snapshot then degrades accordingly. Without the schema there is nothing
/// to hang records on, so the result is `None`.
pub fn assemble_and_merge(
    state: &AppState,
    steam_id: &str,
    fetched_at: DateTime<Utc>,
    achievements_body: &Value,
    schema_body: Option<&Value>,
    global_body: Option<&Value>,
) -> Option<AchievementSnapshot> {
    let schema = provider::parse_achievement_schema(schema_body?);
    if schema.is_empty() {
        return None;
    }
    let unlocks = provider::parse_player_achievements(achievements_body);
    let rarity = global_body
        .map(provider::parse_global_percentages)
        .unwrap_or_default();

    let fresh = provider::build_snapshot(fetched_at, &schema, &unlocks, &rarity, &state.adepts);

    let key = format!("achievement_snapshot:{steam_id}");
    let prior: Option<AchievementSnapshot> = state
        .cache
        .get_stale(&key)
        .and_then(|found| serde_json::from_value(found.value).ok());

    let outcome = safe_merge(prior.as_ref(), fresh, &state.merge_policy);
    if outcome.is_corruption_signal() {
        state.merge_corruptions.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("merge_corruption_events_total").increment(1);
        match &outcome.verdict {
            MergeVerdict::Merged { regressions } => {
                tracing::warn!(
                    player = %redact(steam_id),
                    regressions,
                    "achievement fetch tried to revoke unlocks; latch kept them"
                );
            }
            verdict => {
                tracing::warn!(
                    player = %redact(steam_id),
                    ?verdict,
                    "achievement fetch rejected, keeping last-known-good snapshot"
                );
            }
        }
    }

    if let Ok(serialized) = serde_json::to_value(&outcome.snapshot) {
        state.cache.set(&key, serialized, Some(SNAPSHOT_TTL));
    }
    Some(outcome.snapshot)
}
