//! Parsing of raw provider payloads into domain types.
//!
//! The provider wraps everything in endpoint-specific envelopes and is
//! inconsistent about numeric types (rarity percentages arrive as numbers
//! or strings depending on the deployment), so all parsing degrades field
//! by field instead of failing the payload.

use crate::achievement::{AchievementKind, AchievementRecord, AchievementSnapshot};
use crate::adept::AdeptMap;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// One achievement definition from the game schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAchievement {
    pub api_id: String,
    pub display_name: String,
    pub description: String,
    pub icon: String,
    pub icon_gray: String,
    pub hidden: bool,
}

/// One achievement row from the player's unlock list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerAchievement {
    pub achieved: bool,
    pub unlock_time: Option<i64>,
}

/// `GetUserStatsForGame` → id → raw value.
pub fn parse_user_stats(body: &Value) -> HashMap<String, f64> {
    let mut stats = HashMap::new();
    if let Some(rows) = body
        .get("playerstats")
        .and_then(|p| p.get("stats"))
        .and_then(Value::as_array)
    {
        for row in rows {
            let Some(name) = row.get("name").and_then(Value::as_str) else {
                continue;
            };
            if let Some(value) = row.get("value").and_then(Value::as_f64) {
                stats.insert(name.to_string(), value);
            }
        }
    }
    stats
}

/// `GetSchemaForGame` stats block → id → display name. Entries with an
/// empty display name are dropped; the mapper falls back to humanizing.
pub fn parse_stat_schema(body: &Value) -> HashMap<String, String> {
    let mut schema = HashMap::new();
    if let Some(rows) = schema_block(body, "stats") {
        for row in rows {
            let Some(name) = row.get("name").and_then(Value::as_str) else {
                continue;
            };
            if let Some(display) = row.get("displayName").and_then(Value::as_str) {
                if !display.is_empty() {
                    schema.insert(name.to_string(), display.to_string());
                }
            }
        }
    }
    schema
}

/// `GetSchemaForGame` achievements block.
pub fn parse_achievement_schema(body: &Value) -> Vec<SchemaAchievement> {
    let Some(rows) = schema_block(body, "achievements") else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| {
            Some(SchemaAchievement {
                api_id: row.get("name")?.as_str()?.to_string(),
                display_name: row
                    .get("displayName")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                description: row
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                icon: row
                    .get("icon")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                icon_gray: row
                    .get("icongray")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                hidden: row.get("hidden").and_then(Value::as_i64).unwrap_or(0) != 0,
            })
        })
        .collect()
}

/// `GetPlayerAchievements` → api id → unlock state.
pub fn parse_player_achievements(body: &Value) -> HashMap<String, PlayerAchievement> {
    let mut unlocks = HashMap::new();
    if let Some(rows) = body
        .get("playerstats")
        .and_then(|p| p.get("achievements"))
        .and_then(Value::as_array)
    {
        for row in rows {
            let Some(name) = row.get("apiname").and_then(Value::as_str) else {
                continue;
            };
            let achieved = row.get("achieved").and_then(Value::as_i64).unwrap_or(0) != 0;
            let unlock_time = row
                .get("unlocktime")
                .and_then(Value::as_i64)
                .filter(|&t| t > 0);
            unlocks.insert(
                name.to_string(),
                PlayerAchievement {
                    achieved,
                    unlock_time,
                },
            );
        }
    }
    unlocks
}

/// `GetGlobalAchievementPercentagesForApp` → api id → rarity percent.
pub fn parse_global_percentages(body: &Value) -> HashMap<String, f64> {
    let mut rarity = HashMap::new();
    if let Some(rows) = body
        .get("achievementpercentages")
        .and_then(|p| p.get("achievements"))
        .and_then(Value::as_array)
    {
        for row in rows {
            let Some(name) = row.get("name").and_then(Value::as_str) else {
                continue;
            };
            let percent = match row.get("percent") {
                Some(Value::Number(n)) => n.as_f64(),
                Some(Value::String(s)) => s.parse::<f64>().ok(),
                _ => None,
            };
            if let Some(percent) = percent {
                rarity.insert(name.to_string(), percent);
            }
        }
    }
    rarity
}

/// Assembles the full achievement snapshot for one player from the three
/// provider payloads plus the adept table.
pub fn build_snapshot(
    fetched_at: DateTime<Utc>,
    schema: &[SchemaAchievement],
    unlocks: &HashMap<String, PlayerAchievement>,
    rarity: &HashMap<String, f64>,
    adepts: &AdeptMap,
) -> AchievementSnapshot {
    let records = schema
        .iter()
        .map(|def| {
            let unlock = unlocks.get(&def.api_id);
            let adept = adepts.lookup(&def.api_id);
            AchievementRecord {
                api_id: def.api_id.clone(),
                display_name: def.display_name.clone(),
                description: def.description.clone(),
                icon: def.icon.clone(),
                icon_gray: def.icon_gray.clone(),
                hidden: def.hidden,
                character: adept.map(|a| a.character.clone()),
                kind: adept.map(|a| a.kind).unwrap_or(AchievementKind::General),
                unlocked: unlock.map(|u| u.achieved).unwrap_or(false),
                unlocked_at: unlock
                    .and_then(|u| u.unlock_time)
                    .and_then(|t| Utc.timestamp_opt(t, 0).single()),
                rarity_percent: rarity.get(&def.api_id).copied(),
            }
        })
        .collect();
    AchievementSnapshot::new(fetched_at, records)
}

fn schema_block<'v>(body: &'v Value, key: &str) -> Option<&'v Vec<Value>> {
    body.get("game")?
        .get("availableGameStats")?
        .get(key)?
        .as_array()
}
