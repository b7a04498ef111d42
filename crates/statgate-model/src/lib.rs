//! Domain model for the statgate facade.
//!
//! Pure data transforms: grade decoding, stat mapping, achievement
//! snapshots with safe merging, and the adept character table. Nothing in
//! this crate performs I/O beyond loading an operator-supplied adept map.

pub mod achievement;
pub mod adept;
pub mod grade;
pub mod merge;
pub mod provider;
pub mod stats;
pub mod summary;

pub use achievement::{AchievementKind, AchievementRecord, AchievementSnapshot};
pub use adept::{AdeptEntry, AdeptMap, AdeptMapError};
pub use grade::{decode as decode_grade, Grade, Role, Tier};
pub use merge::{safe_merge, MergeOutcome, MergePolicy, MergeVerdict};
pub use stats::{
    format_count, format_duration_secs, map_stats, overview, Category, StatRecord, StatsOverview,
    ValueType,
};
pub use summary::PlayerSummary;
