/// Combatant spawner — turns resolved creatures into initiative-ready combatants.

use rand::Rng;
use uuid::Builder;

use crate::core::rng::unit;
use crate::schema::creature::{parse_leading_int, CreatureData};
use crate::schema::encounter::{CrRange, EncounterCombatant};

/// Hit points and armor class used when a stat block has none.
pub const DEFAULT_STAT: i32 = 10;

#[derive(Debug, Clone, Default)]
pub struct SpawnOutcome {
    /// Highest initiative first.
    pub combatants: Vec<EncounterCombatant>,
    pub warnings: Vec<String>,
}

/// Spawn `quantity` combatants drawn from `creatures`.
///
/// Each instance picks a random creature whose CR lies in `cr_range`; if
/// none does, the whole list is used and a warning is recorded.
pub fn spawn_combatants<R: Rng + ?Sized>(
    creatures: &[CreatureData],
    cr_range: &CrRange,
    quantity: u32,
    rng: &mut R,
) -> SpawnOutcome {
    let mut outcome = SpawnOutcome::default();
    if creatures.is_empty() {
        return outcome;
    }

    let mut pool: Vec<&CreatureData> = creatures.iter().filter(|c| cr_range.contains(c.cr)).collect();
    if pool.is_empty() {
        let warning = format!(
            "no creature within CR {}-{}; using all {} resolved creatures",
            cr_range.min,
            cr_range.max,
            creatures.len()
        );
        tracing::warn!("{}", warning);
        outcome.warnings.push(warning);
        pool = creatures.iter().collect();
    }

    for _ in 0..quantity {
        let pick = ((unit(rng) * pool.len() as f64) as usize).min(pool.len() - 1);
        outcome.combatants.push(spawn_one(pool[pick], rng));
    }

    outcome
        .combatants
        .sort_by(|a, b| b.initiative.cmp(&a.initiative));
    outcome
}

fn spawn_one<R: Rng + ?Sized>(creature: &CreatureData, rng: &mut R) -> EncounterCombatant {
    let max_hp = creature
        .hp
        .as_deref()
        .and_then(parse_leading_int)
        .unwrap_or(DEFAULT_STAT);
    let ac = creature
        .ac
        .as_deref()
        .and_then(parse_leading_int)
        .unwrap_or(DEFAULT_STAT);
    let initiative = (1 + (unit(rng) * 20.0) as u32).min(20);
    let id = Builder::from_random_bytes(rng.gen::<[u8; 16]>()).into_uuid();

    EncounterCombatant {
        id,
        name: creature.name.clone(),
        cr: creature.cr,
        initiative,
        current_hp: max_hp,
        max_hp,
        ac,
        creature_ref: creature.reference.clone(),
    }
}
