//! Adept achievement ↔ character mapping.
//!
//! The source data for this mapping has shipped with contradictory drafts
//! (the same character documented under different roles and id schemes), so
//! the mapping is never inferred from achievement identifiers. One injected
//! table is the single authority: the embedded default below, or an
//! operator-supplied JSON file.

use crate::achievement::AchievementKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const EMBEDDED: &str = include_str!("../data/adepts.json");

#[derive(Debug, Error)]
pub enum AdeptMapError {
    #[error("failed to read adept map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse adept map: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate achievement id in adept map: {0}")]
    Duplicate(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    Survivor,
    Killer,
}

#[derive(Debug, Clone, Deserialize)]
struct RawEntry {
    achievement: String,
    character: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct RawMap {
    entries: Vec<RawEntry>,
}

/// A resolved adept entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AdeptEntry {
    pub character: String,
    pub kind: AchievementKind,
}

/// Lookup table from achievement api id to adept character.
#[derive(Debug, Clone)]
pub struct AdeptMap {
    by_achievement: HashMap<String, AdeptEntry>,
}

impl AdeptMap {
    /// The table compiled into the binary.
    pub fn embedded() -> Self {
        // The embedded table is validated by tests; a parse failure here is
        // a build defect, not a runtime condition.
        Self::from_json(EMBEDDED).unwrap_or_else(|_| Self {
            by_achievement: HashMap::new(),
        })
    }

    /// Loads an operator-supplied table, overriding the embedded default.
    pub fn from_path(path: &Path) -> Result<Self, AdeptMapError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, AdeptMapError> {
        let parsed: RawMap = serde_json::from_str(raw)?;
        let mut by_achievement = HashMap::with_capacity(parsed.entries.len());
        for entry in parsed.entries {
            let kind = match entry.role {
                Role::Survivor => AchievementKind::SurvivorAdept,
                Role::Killer => AchievementKind::KillerAdept,
            };
            if by_achievement
                .insert(
                    entry.achievement.clone(),
                    AdeptEntry {
                        character: entry.character,
                        kind,
                    },
                )
                .is_some()
            {
                return Err(AdeptMapError::Duplicate(entry.achievement));
            }
        }
        Ok(Self { by_achievement })
    }

    pub fn lookup(&self, achievement_id: &str) -> Option<&AdeptEntry> {
        self.by_achievement.get(achievement_id)
    }

    pub fn len(&self) -> usize {
        self.by_achievement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_achievement.is_empty()
    }
}
