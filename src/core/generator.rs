/// Encounter generation: table selection → entry roll → quantity →
/// spawning → difficulty.

use rand::Rng;
use thiserror::Error;

use crate::core::config::EngineConfig;
use crate::core::difficulty::calculate_difficulty;
use crate::core::quantity::resolve_quantity;
use crate::core::roller::roll_entry;
use crate::core::selector::select_table;
use crate::core::spawner::spawn_combatants;
use crate::schema::creature::{CreatureData, CreatureSource};
use crate::schema::encounter::{EncounterRequest, EncounterTableData, GeneratedEncounter};

#[derive(Debug, Error)]
pub enum EncounterError {
    #[error("no encounter tables supplied")]
    NoTables,
    #[error("no encounter entry selected from table {0}")]
    NoEntrySelected(String),
    #[error("no creatures resolved for table {0}")]
    NoCreaturesResolved(String),
    #[error("invalid party: {0}")]
    InvalidParty(String),
}

/// Generate one encounter.
///
/// Non-fatal problems (CR fallbacks, unresolved creature names, clamped
/// quantities) are reported in `GeneratedEncounter::warnings`.
pub fn generate_encounter<S, R>(
    tables: &[EncounterTableData],
    source: &S,
    request: &EncounterRequest,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<GeneratedEncounter, EncounterError>
where
    S: CreatureSource + ?Sized,
    R: Rng + ?Sized,
{
    let selection = select_table(tables, &request.cr_range, request.context.as_ref(), rng)?;
    let table = selection.table;
    let mut warnings = selection.warnings;

    let entry_index = roll_entry(&table.entries, rng)
        .ok_or_else(|| EncounterError::NoEntrySelected(table.name.clone()))?;
    let entry = &table.entries[entry_index];

    let mut creatures: Vec<CreatureData> = Vec::with_capacity(entry.creature_refs.len());
    for name in &entry.creature_refs {
        match source.resolve(name) {
            Some(creature) => creatures.push(creature),
            None => {
                let warning = format!("creature not found: {}", name);
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }
    if creatures.is_empty() {
        return Err(EncounterError::NoCreaturesResolved(table.name.clone()));
    }

    let mut quantity = resolve_quantity(&entry.quantity_formula, rng);
    if quantity > config.max_combatants {
        let warning = format!(
            "quantity {} from {:?} capped at {}",
            quantity, entry.quantity_formula, config.max_combatants
        );
        tracing::warn!("{}", warning);
        warnings.push(warning);
        quantity = config.max_combatants;
    }

    let cr_range = entry.cr_range_override.unwrap_or(request.cr_range);
    let spawned = spawn_combatants(&creatures, &cr_range, quantity, rng);
    warnings.extend(spawned.warnings);

    let report = calculate_difficulty(&spawned.combatants, &request.party)?;
    warnings.extend(report.warnings);

    let title = entry
        .description
        .clone()
        .unwrap_or_else(|| format!("{} encounter", table.name));

    tracing::debug!(
        "generated {} ({} combatants, {} adjusted XP, {})",
        title,
        spawned.combatants.len(),
        report.adjusted_xp,
        report.difficulty
    );

    Ok(GeneratedEncounter {
        title,
        combatants: spawned.combatants,
        total_xp: report.total_xp,
        adjusted_xp: report.adjusted_xp,
        difficulty: report.difficulty,
        warnings,
        source_table: table.name.clone(),
        source_entry: entry_index,
    })
}
