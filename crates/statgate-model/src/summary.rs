//! Player profile summary.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

/// Normalized view of the provider's player-summary payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub id: String,
    pub persona_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PlayerSummary {
    /// Parses the provider's `players[0]` object. Absent or malformed
    /// optional fields degrade to `None`; a missing id or name means the
    /// payload is unusable.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let player = payload
            .get("response")
            .and_then(|r| r.get("players"))
            .and_then(|p| p.as_array())
            .and_then(|p| p.first())
            .unwrap_or(payload);

        let id = player.get("steamid")?.as_str()?.to_string();
        let persona_name = player.get("personaname")?.as_str()?.to_string();

        Some(Self {
            id,
            persona_name,
            profile_url: string_field(player, "profileurl"),
            avatar: string_field(player, "avatarfull").or_else(|| string_field(player, "avatar")),
            country: string_field(player, "loccountrycode"),
            created_at: player
                .get("timecreated")
                .and_then(Value::as_i64)
                .and_then(|epoch| Utc.timestamp_opt(epoch, 0).single()),
        })
    }
}

fn string_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}
