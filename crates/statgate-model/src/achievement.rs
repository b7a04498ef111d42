//! Achievement records and per-player snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What an achievement represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementKind {
    /// Mastery achievement for one survivor character.
    SurvivorAdept,
    /// Mastery achievement for one killer character.
    KillerAdept,
    General,
}

/// One achievement in a player snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub api_id: String,
    pub display_name: String,
    /// Empty while the achievement is hidden and locked.
    pub description: String,
    pub icon: String,
    pub icon_gray: String,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    pub kind: AchievementKind,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Global unlock rarity, 0..=100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity_percent: Option<f64>,
}

/// Point-in-time achievement list for one player.
///
/// Construction enforces the snapshot invariants: ids are unique (first
/// occurrence wins), order is stable (display name, then id), hidden
/// locked achievements carry no description, and rarity is clamped to
/// 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub records: Vec<AchievementRecord>,
}

impl AchievementSnapshot {
    pub fn new(fetched_at: DateTime<Utc>, records: Vec<AchievementRecord>) -> Self {
        let mut seen: HashMap<String, ()> = HashMap::with_capacity(records.len());
        let mut unique: Vec<AchievementRecord> = Vec::with_capacity(records.len());
        for mut record in records {
            if seen.insert(record.api_id.clone(), ()).is_some() {
                continue;
            }
            if record.hidden && !record.unlocked {
                record.description.clear();
            }
            if let Some(rarity) = record.rarity_percent.as_mut() {
                *rarity = rarity.clamp(0.0, 100.0);
            }
            unique.push(record);
        }
        unique.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.api_id.cmp(&b.api_id))
        });
        Self {
            fetched_at,
            records: unique,
        }
    }

    pub fn get(&self, api_id: &str) -> Option<&AchievementRecord> {
        self.records.iter().find(|r| r.api_id == api_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn unlocked_count(&self) -> usize {
        self.records.iter().filter(|r| r.unlocked).count()
    }
}

#[cfg(test)]
pub(crate) fn record(api_id: &str, unlocked: bool) -> AchievementRecord {
    AchievementRecord {
        api_id: api_id.to_string(),
        display_name: format!("Adept {api_id}"),
        description: format!("Reach mastery with {api_id}"),
        icon: String::from("icon.jpg"),
        icon_gray: String::from("icon_gray.jpg"),
        hidden: false,
        character: None,
        kind: AchievementKind::General,
        unlocked,
        unlocked_at: None,
        rarity_percent: Some(42.0),
    }
}
