/// Context scoring — tag overlap between a candidate and a narrative context.
///
/// The one scoring primitive shared by every context-ranked resource:
/// encounter tables here, playlists in the audio collaborator.

use std::cmp::Ordering;

use crate::schema::context::{NarrativeContext, ScoredCandidate, TagCategory, TagSet};
use crate::schema::encounter::EncounterTableData;

/// Weight of each matching tag on top of the per-category point.
pub const TAG_MATCH_WEIGHT: f64 = 0.5;

/// Anything exposing tag lists per category.
pub trait Tagged {
    fn tags(&self, category: TagCategory) -> &[String];
}

impl Tagged for TagSet {
    fn tags(&self, category: TagCategory) -> &[String] {
        self.get(category)
    }
}

impl Tagged for EncounterTableData {
    fn tags(&self, category: TagCategory) -> &[String] {
        self.tags.get(category)
    }
}

/// Score one candidate.
///
/// Each category with at least one exact (case-sensitive) match adds 1;
/// every matching tag adds `TAG_MATCH_WEIGHT`. Faction is multi-valued, so
/// it may contribute several tag matches.
pub fn score_candidate<T: Tagged + ?Sized>(
    id: impl Into<String>,
    candidate: &T,
    context: &NarrativeContext,
) -> ScoredCandidate {
    let mut matched_categories = Vec::new();
    let mut matched_tag_count = 0;

    for category in TagCategory::ALL {
        let wanted = context.values(category);
        if wanted.is_empty() {
            continue;
        }
        let hits = candidate
            .tags(category)
            .iter()
            .filter(|tag| wanted.contains(&tag.as_str()))
            .count();
        if hits > 0 {
            matched_categories.push(category);
            matched_tag_count += hits;
        }
    }

    let score = matched_categories.len() as f64 + TAG_MATCH_WEIGHT * matched_tag_count as f64;
    ScoredCandidate {
        id: id.into(),
        score,
        matched_categories,
        matched_tag_count,
    }
}

/// Score every candidate and sort by score, highest first.
///
/// The sort is stable, so equal scores keep their input order.
pub fn rank_candidates<'a, T, I>(candidates: I, context: &NarrativeContext) -> Vec<ScoredCandidate>
where
    T: Tagged + ?Sized + 'a,
    I: IntoIterator<Item = (String, &'a T)>,
{
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|(id, candidate)| score_candidate(id, candidate, context))
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

/// Index of the highest score; ties go to the earliest candidate.
pub fn best_index(scores: &[ScoredCandidate]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if candidate.score <= top => {}
            _ => best = Some((i, candidate.score)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn tags(terrain: &[&str], weather: &[&str], situation: &[&str], faction: &[&str]) -> TagSet {
        TagSet {
            terrain: owned(terrain),
            weather: owned(weather),
            time_of_day: Vec::new(),
            faction: owned(faction),
            situation: owned(situation),
        }
    }

    fn forest_rain_combat() -> NarrativeContext {
        NarrativeContext {
            terrain: Some("Forest".to_string()),
            weather: Some("Rain".to_string()),
            situation: Some("Combat".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn three_category_match_scores_four_and_a_half() {
        let candidate = tags(&["Forest"], &["Rain"], &["Combat"], &[]);
        let scored = score_candidate("t1", &candidate, &forest_rain_combat());
        assert_eq!(scored.score, 4.5);
        assert_eq!(scored.matched_tag_count, 3);
        assert_eq!(
            scored.matched_categories,
            vec![TagCategory::Terrain, TagCategory::Weather, TagCategory::Situation]
        );
    }

    #[test]
    fn no_overlap_scores_zero() {
        let candidate = tags(&["Desert"], &["Clear"], &["Travel"], &["Guild"]);
        let scored = score_candidate("t2", &candidate, &forest_rain_combat());
        assert_eq!(scored.score, 0.0);
        assert!(scored.matched_categories.is_empty());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let candidate = tags(&["forest"], &[], &[], &[]);
        assert_eq!(score_candidate("t", &candidate, &forest_rain_combat()).score, 0.0);
    }

    #[test]
    fn factions_count_each_tag() {
        let context = NarrativeContext {
            factions: vec!["Zhentarim".to_string(), "Harpers".to_string()],
            ..Default::default()
        };
        let candidate = tags(&[], &[], &[], &["Zhentarim", "Harpers", "Emerald Enclave"]);
        let scored = score_candidate("t", &candidate, &context);
        assert_eq!(scored.matched_categories, vec![TagCategory::Faction]);
        assert_eq!(scored.matched_tag_count, 2);
        assert_eq!(scored.score, 2.0);
    }

    #[test]
    fn empty_context_scores_nothing() {
        let candidate = tags(&["Forest"], &["Rain"], &[], &[]);
        let scored = score_candidate("t", &candidate, &NarrativeContext::default());
        assert_eq!(scored.score, 0.0);
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let a = tags(&["Forest"], &[], &[], &[]);
        let b = tags(&["Forest"], &[], &[], &[]);
        let c = tags(&["Forest"], &["Rain"], &[], &[]);
        let ranked = rank_candidates(
            vec![("a".to_string(), &a), ("b".to_string(), &b), ("c".to_string(), &c)],
            &forest_rain_combat(),
        );
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn best_index_prefers_first_of_ties() {
        let ctx = forest_rain_combat();
        let scores = vec![
            score_candidate("x", &tags(&[], &[], &[], &[]), &ctx),
            score_candidate("y", &tags(&["Forest"], &[], &[], &[]), &ctx),
            score_candidate("z", &tags(&["Forest"], &[], &[], &[]), &ctx),
        ];
        assert_eq!(best_index(&scores), Some(1));
        assert_eq!(best_index(&[]), None);
    }
}
