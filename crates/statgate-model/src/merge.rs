//! Safe merging of achievement snapshots.
//!
//! Unlocks are a one-way latch: a fresh fetch can never take an unlock
//! away. A fetch that drops too many previously-known ids, or that is
//! older than what we already have, is rejected wholesale as suspected
//! corruption and the prior snapshot stands.

use crate::achievement::{AchievementRecord, AchievementSnapshot};
use std::collections::HashMap;

/// Tunables for [`safe_merge`].
#[derive(Debug, Clone)]
pub struct MergePolicy {
    /// Reject the fetch when more than this fraction of prior ids are
    /// missing from it.
    pub max_missing_fraction: f64,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            max_missing_fraction: 0.3,
        }
    }
}

/// What the merge decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeVerdict {
    /// Snapshots merged; `regressions` counts unlock take-backs that the
    /// latch overrode (each one is a corruption signal).
    Merged { regressions: usize },
    /// The fetch was missing too much of the prior snapshot.
    RejectedMissingIds { missing: usize, prior_total: usize },
    /// The fetch predates the prior snapshot.
    RejectedStaleFetch,
}

/// Result of [`safe_merge`]: the snapshot to keep plus the verdict.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub snapshot: AchievementSnapshot,
    pub verdict: MergeVerdict,
}

impl MergeOutcome {
    /// True when the merge saw a corruption signal (rejection or an
    /// overridden unlock regression).
    pub fn is_corruption_signal(&self) -> bool {
        !matches!(self.verdict, MergeVerdict::Merged { regressions: 0 })
    }
}

/// Merges a freshly fetched snapshot against the last-known-good one.
pub fn safe_merge(
    prior: Option<&AchievementSnapshot>,
    new: AchievementSnapshot,
    policy: &MergePolicy,
) -> MergeOutcome {
    let Some(prior) = prior else {
        return MergeOutcome {
            snapshot: new,
            verdict: MergeVerdict::Merged { regressions: 0 },
        };
    };

    if new.fetched_at < prior.fetched_at {
        return MergeOutcome {
            snapshot: prior.clone(),
            verdict: MergeVerdict::RejectedStaleFetch,
        };
    }

    let new_ids: HashMap<&str, &AchievementRecord> = new
        .records
        .iter()
        .map(|r| (r.api_id.as_str(), r))
        .collect();
    let missing = prior
        .records
        .iter()
        .filter(|r| !new_ids.contains_key(r.api_id.as_str()))
        .count();
    if !prior.is_empty() && missing as f64 / prior.len() as f64 > policy.max_missing_fraction {
        return MergeOutcome {
            snapshot: prior.clone(),
            verdict: MergeVerdict::RejectedMissingIds {
                missing,
                prior_total: prior.len(),
            },
        };
    }

    let prior_ids: HashMap<&str, &AchievementRecord> = prior
        .records
        .iter()
        .map(|r| (r.api_id.as_str(), r))
        .collect();

    let mut regressions = 0usize;
    let mut merged: Vec<AchievementRecord> = Vec::with_capacity(new.len() + missing);

    for record in &new.records {
        let mut out = record.clone();
        if let Some(old) = prior_ids.get(record.api_id.as_str()) {
            if old.unlocked && !record.unlocked {
                regressions += 1;
            }
            if old.unlocked {
                out.unlocked = true;
                out.unlocked_at = match (old.unlocked_at, record.unlocked_at) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
            }
            // Metadata: the fetch wins when it has something, otherwise
            // fall back to what we already knew.
            if out.description.is_empty() {
                out.description = old.description.clone();
            }
            if out.icon.is_empty() {
                out.icon = old.icon.clone();
            }
            if out.icon_gray.is_empty() {
                out.icon_gray = old.icon_gray.clone();
            }
            if out.rarity_percent.is_none() {
                out.rarity_percent = old.rarity_percent;
            }
            if out.character.is_none() {
                out.character = old.character.clone();
            }
        }
        merged.push(out);
    }

    // Ids the fetch dropped (under the rejection threshold) are carried
    // forward; a previously-unlocked one is a regression signal too.
    for record in &prior.records {
        if !new_ids.contains_key(record.api_id.as_str()) {
            if record.unlocked {
                regressions += 1;
            }
            merged.push(record.clone());
        }
    }

    MergeOutcome {
        snapshot: AchievementSnapshot::new(new.fetched_at, merged),
        verdict: MergeVerdict::Merged { regressions },
    }
}
