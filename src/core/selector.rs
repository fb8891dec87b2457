/// Encounter table selector — CR filtering plus context ranking.

use rand::Rng;

use crate::core::generator::EncounterError;
use crate::core::rng::unit;
use crate::core::scoring::{best_index, score_candidate};
use crate::schema::context::{NarrativeContext, ScoredCandidate};
use crate::schema::encounter::{CrRange, EncounterTableData};

/// The chosen table and how it was chosen.
#[derive(Debug, Clone)]
pub struct TableSelection<'a> {
    pub table: &'a EncounterTableData,
    /// Position in the caller's table slice.
    pub index: usize,
    /// Present when the table was ranked against a context.
    pub score: Option<ScoredCandidate>,
    pub warnings: Vec<String>,
}

/// Pick one table for an encounter.
///
/// Tables whose CR range overlaps `cr_range` are preferred; if none do, all
/// tables are considered and a warning is recorded. With a non-empty
/// context the best-scoring table wins (earliest on ties); otherwise the
/// pick is uniform.
pub fn select_table<'a, R: Rng + ?Sized>(
    tables: &'a [EncounterTableData],
    cr_range: &CrRange,
    context: Option<&NarrativeContext>,
    rng: &mut R,
) -> Result<TableSelection<'a>, EncounterError> {
    if tables.is_empty() {
        return Err(EncounterError::NoTables);
    }

    let mut warnings = Vec::new();
    let mut candidates: Vec<usize> = tables
        .iter()
        .enumerate()
        .filter(|(_, t)| t.effective_cr_range().overlaps(cr_range))
        .map(|(i, _)| i)
        .collect();

    if candidates.is_empty() {
        let warning = format!(
            "no encounter table covers CR {}-{}; choosing from all {} tables",
            cr_range.min,
            cr_range.max,
            tables.len()
        );
        tracing::warn!("{}", warning);
        warnings.push(warning);
        candidates = (0..tables.len()).collect();
    }

    let (index, score) = match context.filter(|c| !c.is_empty()) {
        Some(context) => {
            let scores: Vec<ScoredCandidate> = candidates
                .iter()
                .map(|&i| score_candidate(tables[i].name.clone(), &tables[i], context))
                .collect();
            let best = best_index(&scores).unwrap_or(0);
            (candidates[best], scores.into_iter().nth(best))
        }
        None => {
            let pick = ((unit(rng) * candidates.len() as f64) as usize).min(candidates.len() - 1);
            (candidates[pick], None)
        }
    };

    tracing::debug!("selected encounter table {}", tables[index].name);
    Ok(TableSelection {
        table: &tables[index],
        index,
        score,
        warnings,
    })
}
