use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::context::{NarrativeContext, TagSet};

/// Inclusive challenge-rating range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrRange {
    pub min: f64,
    pub max: f64,
}

impl CrRange {
    /// The range assumed wherever a table or request omits one.
    pub const FULL: CrRange = CrRange { min: 0.0, max: 30.0 };

    pub fn new(min: f64, max: f64) -> CrRange {
        if min <= max {
            CrRange { min, max }
        } else {
            CrRange { min: max, max: min }
        }
    }

    pub fn overlaps(&self, other: &CrRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    pub fn contains(&self, cr: f64) -> bool {
        cr >= self.min && cr <= self.max
    }
}

impl Default for CrRange {
    fn default() -> Self {
        CrRange::FULL
    }
}

fn default_weight() -> f64 {
    1.0
}

/// One weighted outcome of an encounter table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterTableEntry {
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub creature_refs: Vec<String>,
    /// Plain integer or dice notation, e.g. `"3"` or `"2d4+1"`.
    pub quantity_formula: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Replaces the request's CR range when filtering this entry's creatures.
    #[serde(default)]
    pub cr_range_override: Option<CrRange>,
}

/// An encounter table owned by the library collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterTableData {
    pub name: String,
    #[serde(default)]
    pub tags: TagSet,
    /// Missing means `CrRange::FULL`.
    #[serde(default)]
    pub cr_range: Option<CrRange>,
    pub entries: Vec<EncounterTableEntry>,
}

impl EncounterTableData {
    pub fn effective_cr_range(&self) -> CrRange {
        self.cr_range.unwrap_or(CrRange::FULL)
    }
}

/// The party an encounter is balanced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyProfile {
    /// Average character level, 1..=20.
    pub level: u32,
    pub size: u32,
}

/// Everything the generator needs besides the tables and creature source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRequest {
    #[serde(default)]
    pub cr_range: CrRange,
    #[serde(default)]
    pub context: Option<NarrativeContext>,
    pub party: PartyProfile,
}

/// A spawned combatant, ready for an initiative tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterCombatant {
    pub id: Uuid,
    pub name: String,
    pub cr: f64,
    /// 1..=20.
    pub initiative: u32,
    pub current_hp: i32,
    pub max_hp: i32,
    pub ac: i32,
    pub creature_ref: String,
}

/// Encounter difficulty tier, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Trivial,
    Easy,
    Medium,
    Hard,
    Deadly,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trivial => "trivial",
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Deadly => "deadly",
        };
        f.write_str(name)
    }
}

/// The sole output of encounter generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEncounter {
    pub title: String,
    pub combatants: Vec<EncounterCombatant>,
    pub total_xp: u32,
    pub adjusted_xp: f64,
    pub difficulty: Difficulty,
    pub warnings: Vec<String>,
    pub source_table: String,
    /// Index of the rolled entry within the source table.
    pub source_entry: usize,
}
