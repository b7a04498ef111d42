//! Grade decoding.
//!
//! The provider reports player grades as opaque numeric telemetry whose
//! scheme is piecewise and has outliers, so decoding goes through sparse
//! lookup tables of observed values per role. A monotone range estimator
//! covers gaps between observations; values outside the observed range
//! decode to `Unknown`.
//!
//! The decoder is pure: same `(raw, field)` input, same output, no shared
//! state.

use serde::Serialize;

/// Grade tier, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Ash,
    Bronze,
    Silver,
    Gold,
    Iridescent,
    Unknown,
}

/// Which role a grade field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Killer,
    Survivor,
}

/// A decoded grade: tier plus sub-rank 1..=4 (IV is lowest, I highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub tier: Tier,
    pub sub: u8,
    /// True when the value fell between observed points and the range
    /// estimator supplied the answer.
    pub estimated: bool,
}

impl Grade {
    pub const UNKNOWN: Grade = Grade {
        tier: Tier::Unknown,
        sub: 1,
        estimated: false,
    };

    pub fn display(&self) -> String {
        match self.tier {
            Tier::Unknown => "?".to_string(),
            Tier::Ash => format!("Ash {}", roman(self.sub)),
            Tier::Bronze => format!("Bronze {}", roman(self.sub)),
            Tier::Silver => format!("Silver {}", roman(self.sub)),
            Tier::Gold => format!("Gold {}", roman(self.sub)),
            Tier::Iridescent => format!("Iridescent {}", roman(self.sub)),
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

fn roman(sub: u8) -> &'static str {
    match sub {
        1 => "I",
        2 => "II",
        3 => "III",
        _ => "IV",
    }
}

/// Ladder position 0 (Ash IV) ..= 19 (Iridescent I) to grade.
fn grade_at(rank: usize) -> Grade {
    let tier = match rank / 4 {
        0 => Tier::Ash,
        1 => Tier::Bronze,
        2 => Tier::Silver,
        3 => Tier::Gold,
        _ => Tier::Iridescent,
    };
    let sub = 4 - (rank % 4) as u8;
    Grade {
        tier,
        sub,
        estimated: false,
    }
}

const LADDER_RANKS: usize = 20;

/// Observed killer telemetry values, one per ladder rank, ascending.
/// Collected from live payloads; the scheme is not closed-form.
const KILLER_OBSERVED: [u64; LADDER_RANKS] = [
    3, 18, 35, 60, 120, 255, 439, 680, 980, 1_400, 1_900, 2_500, 3_200, 4_000, 5_000, 6_200,
    7_600, 9_200, 11_000, 13_000,
];

/// Observed survivor telemetry values, one per ladder rank, ascending.
const SURVIVOR_OBSERVED: [u64; LADDER_RANKS] = [
    1, 4, 9, 14, 22, 35, 50, 65, 82, 100, 120, 145, 170, 200, 235, 270, 310, 350, 400, 460,
];

/// Picks the role from the field identifier. Killer grade fields carry the
/// `Slasher` (or `Killer`) marker by provider convention; everything else
/// grading-related is survivor-side. Magnitude is never consulted.
pub fn role_of(field_id: &str) -> Role {
    let lower = field_id.to_ascii_lowercase();
    if lower.contains("slasher") || lower.contains("killer") {
        Role::Killer
    } else {
        Role::Survivor
    }
}

/// Decodes a raw grade telemetry value for the given stat field.
pub fn decode(raw: u64, field_id: &str) -> Grade {
    let table: &[u64; LADDER_RANKS] = match role_of(field_id) {
        Role::Killer => &KILLER_OBSERVED,
        Role::Survivor => &SURVIVOR_OBSERVED,
    };

    if let Ok(rank) = table.binary_search(&raw) {
        return grade_at(rank);
    }

    let min = table[0];
    let max = table[LADDER_RANKS - 1];
    if raw < min || raw > max {
        return Grade::UNKNOWN;
    }

    // Between observations: partition the observed range into 20 equal
    // buckets and estimate monotonically.
    let span = (max - min) as f64;
    let offset = (raw - min) as f64;
    let rank = ((offset / span) * LADDER_RANKS as f64) as usize;
    Grade {
        estimated: true,
        ..grade_at(rank.min(LADDER_RANKS - 1))
    }
}
