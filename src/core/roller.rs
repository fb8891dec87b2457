/// Entry roller — weighted random pick of one encounter-table entry.

use rand::Rng;

use crate::core::rng::unit;
use crate::schema::encounter::EncounterTableEntry;

/// Negative or non-finite weights count as zero.
fn effective_weight(entry: &EncounterTableEntry) -> f64 {
    if entry.weight.is_finite() && entry.weight > 0.0 {
        entry.weight
    } else {
        0.0
    }
}

/// Pick an entry index with probability proportional to its weight.
///
/// Returns `None` only for an empty slice. If float drift exhausts the
/// walk, the last entry wins.
pub fn roll_entry<R: Rng + ?Sized>(entries: &[EncounterTableEntry], rng: &mut R) -> Option<usize> {
    if entries.is_empty() {
        return None;
    }
    let total: f64 = entries.iter().map(effective_weight).sum();
    let mut roll = unit(rng) * total;
    for (i, entry) in entries.iter().enumerate() {
        let weight = effective_weight(entry);
        if roll < weight {
            return Some(i);
        }
        roll -= weight;
    }
    Some(entries.len() - 1)
}
