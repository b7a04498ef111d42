//! Stat mapping: schema + raw values → typed, formatted, ordered records.

use crate::grade;
use serde::Serialize;
use std::collections::HashMap;

/// Which side of the game a stat describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Killer,
    Survivor,
    General,
}

impl Category {
    fn order(self) -> u8 {
        match self {
            Category::Killer => 0,
            Category::Survivor => 1,
            Category::General => 2,
        }
    }

    fn default_weight(self) -> u32 {
        match self {
            Category::Killer => 10,
            Category::Survivor => 15,
            Category::General => 20,
        }
    }
}

/// How a raw numeric value should be interpreted and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Count,
    Float,
    Grade,
    Level,
    Duration,
}

/// A fully resolved stat ready for the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatRecord {
    pub id: String,
    pub display_name: String,
    pub raw_value: f64,
    pub formatted: String,
    pub category: Category,
    pub value_type: ValueType,
    pub sort_weight: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Grade/prestige digest shown on the summary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsOverview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub killer_grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survivor_grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prestige: Option<u32>,
}

/// Friendly names for ids whose schema entries are missing or unhelpful.
/// Checked before the schema, which is checked before humanizing the id.
/// The provider's schema leaves most of these blank, so the table is the
/// real source of display names.
const ALIASES: &[(&str, &str)] = &[
    ("DBD_KillerSkulls", "Killer Pips"),
    ("DBD_CamperSkulls", "Survivor Pips"),
    ("DBD_SlasherTierIncrement", "Killer Grade"),
    ("DBD_UnlockRanking", "Survivor Grade"),
    ("DBD_BloodwebMaxPrestigeLevel", "Highest Prestige"),
    ("DBD_BloodwebPoints", "Bloodpoints Earned"),
    ("DBD_BloodwebMaxLevel", "Highest Bloodweb Level"),
    ("DBD_MaxBloodwebPointsOneCategory", "Most Bloodpoints in One Category"),
    ("DBD_GeneratorPct_float", "Generators Repaired"),
    ("DBD_HealPct_float", "Survivors Healed"),
    ("DBD_EscapeKO", "Escapes While Downed"),
    ("DBD_Escape", "Escapes"),
    ("DBD_EscapeThroughHatch", "Hatch Escapes"),
    ("DBD_HookedAndEscape", "Self-Unhook Escapes"),
    ("DBD_UnhookOrHeal", "Survivors Rescued or Healed"),
    ("DBD_UnhookOrHeal_PostExit", "Endgame Rescues or Heals"),
    ("DBD_SkillCheckSuccess", "Successful Skill Checks"),
    ("DBD_SacrificedCampers", "Survivors Sacrificed"),
    ("DBD_KilledCampers", "Survivors Killed"),
    ("DBD_ChainsawHit", "Chainsaw Hits"),
    ("DBD_TrapPickup", "Bear Traps Caught"),
    ("DBD_UncloakAttack", "Uncloak Attacks"),
    ("DBD_SlasherChainAttack", "Blink Attacks"),
    ("DBD_SlasherFullLoadout", "Killer Full Loadout Matches"),
    ("DBD_CamperFullLoadout", "Survivor Full Loadout Matches"),
    ("DBD_CamperNewItem", "Escapes With a Better Item"),
    ("DBD_AllEscapeThroughHatch", "Full Team Hatch Escapes"),
    ("DBD_HitNearHook", "Hits Near Hook"),
    ("DBD_DLC3_SlasherChainAttack", "Hatchets Thrown Far"),
    ("DBD_DLC4_SlasherPowerAttack", "Chainsaw Sprints"),
];

// Killer keywords are matched first; they must not be substrings of
// survivor-side ids ("hook" would swallow "unhook", "kill" would swallow
// "skillcheck").
const KILLER_KEYWORDS: &[&str] = &[
    "slasher",
    "killer",
    "sacrific",
    "killed",
    "chainsaw",
    "hitnearhook",
    "trap",
    "uncloak",
    "hatchet",
];

const SURVIVOR_KEYWORDS: &[&str] = &[
    "camper",
    "survivor",
    "escape",
    "heal",
    "generator",
    "unhook",
    "hooked",
    "skillcheck",
];

const GRADE_PATTERNS: &[&str] = &["tierincrement", "unlockranking"];

/// Builds the ordered stat list from the provider schema and the player's
/// raw values. Ids without a user value are dropped; ids missing from the
/// schema get a humanized name.
pub fn map_stats(
    schema: &HashMap<String, String>,
    values: &HashMap<String, f64>,
) -> Vec<StatRecord> {
    let mut records: Vec<StatRecord> = values
        .iter()
        .map(|(id, &raw)| build_record(id, raw, schema.get(id).map(String::as_str)))
        .collect();

    records.sort_by(|a, b| {
        a.category
            .order()
            .cmp(&b.category.order())
            .then_with(|| a.sort_weight.cmp(&b.sort_weight))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    records
}

/// Extracts the summary digest. Prestige is clamped to 100 here; the full
/// record list keeps the raw value.
pub fn overview(records: &[StatRecord]) -> StatsOverview {
    let grade_for = |cat: Category| {
        records
            .iter()
            .find(|r| r.value_type == ValueType::Grade && r.category == cat)
            .map(|r| r.formatted.clone())
    };
    let prestige = records
        .iter()
        .find(|r| id_or_display_contains(r, "prestige"))
        .map(|r| (r.raw_value.max(0.0) as u32).min(100));

    StatsOverview {
        killer_grade: grade_for(Category::Killer),
        survivor_grade: grade_for(Category::Survivor),
        prestige,
    }
}

fn id_or_display_contains(record: &StatRecord, needle: &str) -> bool {
    record.id.to_ascii_lowercase().contains(needle)
        || record.display_name.to_ascii_lowercase().contains(needle)
}

fn build_record(id: &str, raw: f64, schema_name: Option<&str>) -> StatRecord {
    let alias = ALIASES
        .iter()
        .find(|(a, _)| *a == id)
        .map(|(_, name)| name.to_string());
    let display_name = alias
        .clone()
        .or_else(|| schema_name.map(str::to_string))
        .unwrap_or_else(|| humanize(id));

    let value_type = value_type_of(id, &display_name);
    let category = category_of(id, &display_name);
    let sort_weight = sort_weight_of(id, &display_name, value_type, category);
    let formatted = format_value(id, raw, value_type);

    StatRecord {
        id: id.to_string(),
        display_name,
        raw_value: raw,
        formatted,
        category,
        value_type,
        sort_weight,
        alias,
    }
}

fn value_type_of(id: &str, display: &str) -> ValueType {
    let id_l = id.to_ascii_lowercase();
    let disp_l = display.to_ascii_lowercase();

    if GRADE_PATTERNS.iter().any(|p| id_l.contains(p)) || disp_l.contains("grade") {
        ValueType::Grade
    } else if id_l.contains("time") || id_l.contains("duration") || disp_l.contains("time played")
    {
        ValueType::Duration
    } else if id_l.contains("level") || id_l.contains("prestige") || disp_l.contains("prestige") {
        ValueType::Level
    } else if id_l.ends_with("_float") || id_l.ends_with("pct") {
        ValueType::Float
    } else {
        ValueType::Count
    }
}

fn category_of(id: &str, display: &str) -> Category {
    let haystack = format!(
        "{} {}",
        id.to_ascii_lowercase(),
        display.to_ascii_lowercase()
    );
    if KILLER_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        Category::Killer
    } else if SURVIVOR_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        Category::Survivor
    } else {
        Category::General
    }
}

fn sort_weight_of(id: &str, display: &str, value_type: ValueType, category: Category) -> u32 {
    let id_l = id.to_ascii_lowercase();
    let disp_l = display.to_ascii_lowercase();
    if value_type == ValueType::Grade {
        0
    } else if id_l.contains("skulls") || disp_l.contains("pip") {
        1
    } else if id_l.contains("prestige") || disp_l.contains("prestige") {
        5
    } else {
        category.default_weight()
    }
}

fn format_value(id: &str, raw: f64, value_type: ValueType) -> String {
    match value_type {
        ValueType::Count => format_count(raw.max(0.0).round() as u64),
        ValueType::Float => format!("{raw:.1}"),
        ValueType::Level => format!("{}", raw.max(0.0) as i64),
        ValueType::Duration => format_duration_secs(raw.max(0.0) as u64),
        ValueType::Grade => grade::decode(raw.max(0.0) as u64, id).display(),
    }
}

/// Thousands-grouped integer: `1234567` → `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Human-readable duration: `"2h 5m"`, `"3m 20s"`, `"45s"`.
pub fn format_duration_secs(total: u64) -> String {
    if total >= 3600 {
        format!("{}h {}m", total / 3600, (total % 3600) / 60)
    } else if total >= 60 {
        format!("{}m {}s", total / 60, total % 60)
    } else {
        format!("{total}s")
    }
}

/// Fallback display name: strips the provider prefix and splits camel case
/// and underscores. `DBD_MaxBloodwebPointsOneCategory` → `"Max Bloodweb
/// Points One Category"`.
fn humanize(id: &str) -> String {
    let trimmed = id.strip_prefix("DBD_").unwrap_or(id);
    let mut out = String::with_capacity(trimmed.len() + 8);
    let mut prev_lower = false;
    for c in trimmed.chars() {
        if c == '_' {
            out.push(' ');
            prev_lower = false;
        } else if c.is_ascii_uppercase() && prev_lower {
            out.push(' ');
            out.push(c);
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}
