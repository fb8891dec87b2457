/// Difficulty calculator — XP budgeting against party thresholds.

use serde::{Deserialize, Serialize};

use crate::core::generator::EncounterError;
use crate::schema::encounter::{Difficulty, EncounterCombatant, PartyProfile};

/// Challenge rating to XP. Fractional ratings are listed explicitly.
const CR_TO_XP: [(f64, u32); 34] = [
    (0.0, 10),
    (0.125, 25),
    (0.25, 50),
    (0.5, 100),
    (1.0, 200),
    (2.0, 450),
    (3.0, 700),
    (4.0, 1_100),
    (5.0, 1_800),
    (6.0, 2_300),
    (7.0, 2_900),
    (8.0, 3_900),
    (9.0, 5_000),
    (10.0, 5_900),
    (11.0, 7_200),
    (12.0, 8_400),
    (13.0, 10_000),
    (14.0, 11_500),
    (15.0, 13_000),
    (16.0, 15_000),
    (17.0, 18_000),
    (18.0, 20_000),
    (19.0, 22_000),
    (20.0, 25_000),
    (21.0, 33_000),
    (22.0, 41_000),
    (23.0, 50_000),
    (24.0, 62_000),
    (25.0, 75_000),
    (26.0, 90_000),
    (27.0, 105_000),
    (28.0, 120_000),
    (29.0, 135_000),
    (30.0, 155_000),
];

/// Per-character XP thresholds for levels 1..=20: easy, medium, hard, deadly.
const LEVEL_THRESHOLDS: [[u32; 4]; 20] = [
    [25, 50, 75, 100],
    [50, 100, 150, 200],
    [75, 150, 225, 400],
    [125, 250, 375, 500],
    [250, 500, 750, 1_100],
    [300, 600, 900, 1_400],
    [350, 750, 1_100, 1_700],
    [450, 900, 1_400, 2_100],
    [550, 1_100, 1_600, 2_400],
    [600, 1_200, 1_900, 2_800],
    [800, 1_600, 2_400, 3_600],
    [1_000, 2_000, 3_000, 4_500],
    [1_100, 2_200, 3_400, 5_100],
    [1_250, 2_500, 3_800, 5_700],
    [1_400, 2_800, 4_300, 6_400],
    [1_600, 3_200, 4_800, 7_200],
    [2_000, 3_900, 5_900, 8_800],
    [2_100, 4_200, 6_300, 9_500],
    [2_400, 4_900, 7_300, 10_900],
    [2_800, 5_700, 8_500, 12_700],
];

/// XP for a challenge rating, or `None` for unmapped ratings.
pub fn xp_for_cr(cr: f64) -> Option<u32> {
    CR_TO_XP
        .iter()
        .find(|(rating, _)| (rating - cr).abs() < 1e-6)
        .map(|(_, xp)| *xp)
}

/// XP multiplier for the number of monsters in an encounter.
pub fn encounter_multiplier(monster_count: usize) -> f64 {
    match monster_count {
        0 | 1 => 1.0,
        2 => 1.5,
        3..=6 => 2.0,
        7..=10 => 2.5,
        11..=14 => 3.0,
        _ => 4.0,
    }
}

/// Whole-party XP thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyThresholds {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
    pub deadly: u32,
}

impl PartyThresholds {
    /// The highest tier whose threshold `adjusted_xp` reaches.
    pub fn classify(&self, adjusted_xp: f64) -> Difficulty {
        if adjusted_xp >= f64::from(self.deadly) {
            Difficulty::Deadly
        } else if adjusted_xp >= f64::from(self.hard) {
            Difficulty::Hard
        } else if adjusted_xp >= f64::from(self.medium) {
            Difficulty::Medium
        } else if adjusted_xp >= f64::from(self.easy) {
            Difficulty::Easy
        } else {
            Difficulty::Trivial
        }
    }
}

/// Thresholds for a party. Levels outside 1..=20 are clamped; an empty
/// party, or one whose thresholds overflow `u32`, is rejected.
pub fn party_thresholds(party: &PartyProfile) -> Result<PartyThresholds, EncounterError> {
    if party.size == 0 {
        return Err(EncounterError::InvalidParty(
            "party size must be at least 1".to_string(),
        ));
    }
    let level = party.level.clamp(1, 20);
    let [easy, medium, hard, deadly] = LEVEL_THRESHOLDS[(level - 1) as usize];
    let scale = |xp: u32| {
        xp.checked_mul(party.size).ok_or_else(|| {
            EncounterError::InvalidParty(format!(
                "party of {} at level {} exceeds the XP range",
                party.size, level
            ))
        })
    };
    Ok(PartyThresholds {
        easy: scale(easy)?,
        medium: scale(medium)?,
        hard: scale(hard)?,
        deadly: scale(deadly)?,
    })
}

/// Full difficulty breakdown for a set of combatants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyReport {
    pub total_xp: u32,
    pub multiplier: f64,
    pub adjusted_xp: f64,
    pub thresholds: PartyThresholds,
    pub difficulty: Difficulty,
    pub warnings: Vec<String>,
}

pub fn calculate_difficulty(
    combatants: &[EncounterCombatant],
    party: &PartyProfile,
) -> Result<DifficultyReport, EncounterError> {
    let thresholds = party_thresholds(party)?;
    let mut warnings = Vec::new();

    if !(1..=20).contains(&party.level) {
        let warning = format!("party level {} clamped to 1-20", party.level);
        tracing::warn!("{}", warning);
        warnings.push(warning);
    }

    let mut total_xp: u32 = 0;
    for combatant in combatants {
        match xp_for_cr(combatant.cr) {
            Some(xp) => total_xp = total_xp.saturating_add(xp),
            None => {
                let warning = format!("CR {} of {} has no XP value", combatant.cr, combatant.name);
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    let multiplier = encounter_multiplier(combatants.len());
    let adjusted_xp = f64::from(total_xp) * multiplier;

    Ok(DifficultyReport {
        total_xp,
        multiplier,
        adjusted_xp,
        thresholds,
        difficulty: thresholds.classify(adjusted_xp),
        warnings,
    })
}
