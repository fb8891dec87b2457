/// Encounter integration tests — fixture tables and creatures end to end.

use hexweave::core::difficulty::calculate_difficulty;
use hexweave::core::engine::{EngineError, Hexweave};
use hexweave::core::generator::EncounterError;
use hexweave::core::scoring::rank_candidates;
use hexweave::schema::context::NarrativeContext;
use hexweave::schema::creature::CreatureLibrary;
use hexweave::schema::encounter::{CrRange, EncounterRequest, EncounterTableData, PartyProfile};

fn creatures() -> CreatureLibrary {
    let text = std::fs::read_to_string("tests/fixtures/creatures.ron").unwrap();
    CreatureLibrary::parse_ron(&text).unwrap()
}

fn tables() -> Vec<EncounterTableData> {
    let text = std::fs::read_to_string("tests/fixtures/encounter_tables.ron").unwrap();
    ron::from_str(&text).unwrap()
}

fn context(terrain: &str) -> NarrativeContext {
    NarrativeContext {
        terrain: Some(terrain.to_string()),
        ..Default::default()
    }
}

fn request(cr: (f64, f64), context: Option<NarrativeContext>) -> EncounterRequest {
    EncounterRequest {
        cr_range: CrRange::new(cr.0, cr.1),
        context,
        party: PartyProfile { level: 3, size: 4 },
    }
}

#[test]
fn fixtures_load() {
    assert_eq!(creatures().len(), 9);
    let tables = tables();
    assert_eq!(tables.len(), 4);
    assert_eq!(tables[0].entries[2].weight, 1.0);
    assert_eq!(tables[2].effective_cr_range(), CrRange::FULL);
}

#[test]
fn night_forest_prefers_night_woods() {
    let mut engine = Hexweave::builder().seed(99).build().unwrap();
    let night = NarrativeContext {
        time_of_day: Some("Night".to_string()),
        ..context("Forest")
    };
    for _ in 0..10 {
        let encounter = engine
            .generate_encounter(&tables(), &creatures(), &request((0.0, 2.0), Some(night.clone())))
            .unwrap();
        assert_eq!(encounter.source_table, "Night Woods");
        assert!(!encounter.combatants.is_empty());
    }
}

#[test]
fn snowy_peaks_respect_cr_and_report_missing_creatures() {
    let mut engine = Hexweave::builder().seed(17).build().unwrap();
    let peaks = NarrativeContext {
        weather: Some("Snow".to_string()),
        ..context("Mountain")
    };
    let mut saw_missing = false;
    for _ in 0..30 {
        let encounter = engine
            .generate_encounter(&tables(), &creatures(), &request((5.0, 8.0), Some(peaks.clone())))
            .unwrap();
        assert_eq!(encounter.source_table, "Frozen Peaks");
        if encounter.source_entry == 1 {
            saw_missing = true;
            assert!(encounter
                .warnings
                .contains(&"creature not found: Frost Giant".to_string()));
            assert!(encounter.combatants.iter().all(|c| c.name == "Ice Mephit"));
        } else {
            assert_eq!(encounter.combatants.len(), 1);
            assert_eq!(encounter.combatants[0].name, "Young White Dragon");
            assert_eq!(encounter.combatants[0].max_hp, 133);
            assert_eq!(encounter.combatants[0].ac, 17);
        }
    }
    assert!(saw_missing);
}

#[test]
fn entry_override_narrows_creatures() {
    let mut engine = Hexweave::builder().seed(3).build().unwrap();
    let road = NarrativeContext {
        situation: Some("Travel".to_string()),
        factions: vec!["Bandits".to_string()],
        ..context("Road")
    };
    for _ in 0..40 {
        let encounter = engine
            .generate_encounter(&tables(), &creatures(), &request((0.0, 1.0), Some(road.clone())))
            .unwrap();
        assert_eq!(encounter.source_table, "Highway");
        if encounter.source_entry == 1 {
            assert_eq!(encounter.combatants.len(), 4);
            assert!(encounter.combatants.iter().all(|c| c.name == "Bandit Captain"));
        } else {
            assert!((3..=8).contains(&encounter.combatants.len()));
            assert_eq!(encounter.title, "Toll collectors");
        }
    }
}

#[test]
fn combatants_are_initiative_ready() {
    let mut engine = Hexweave::builder().seed(1234).build().unwrap();
    for _ in 0..20 {
        let encounter = engine
            .generate_encounter(&tables(), &creatures(), &request((0.0, 2.0), None))
            .unwrap();
        for pair in encounter.combatants.windows(2) {
            assert!(pair[0].initiative >= pair[1].initiative);
        }
        for combatant in &encounter.combatants {
            assert!((1..=20).contains(&combatant.initiative));
            assert_eq!(combatant.current_hp, combatant.max_hp);
            assert!(combatant.max_hp > 0);
            assert!(combatant.creature_ref.starts_with("Bestiary/"));
        }
    }
}

#[test]
fn reported_difficulty_matches_calculator() {
    let mut engine = Hexweave::builder().seed(77).build().unwrap();
    let request = request((0.0, 2.0), Some(context("Forest")));
    for _ in 0..10 {
        let encounter = engine
            .generate_encounter(&tables(), &creatures(), &request)
            .unwrap();
        let report = calculate_difficulty(&encounter.combatants, &request.party).unwrap();
        assert_eq!(encounter.total_xp, report.total_xp);
        assert_eq!(encounter.adjusted_xp, report.adjusted_xp);
        assert_eq!(encounter.difficulty, report.difficulty);
    }
}

#[test]
fn same_seed_same_encounters() {
    let mut a = Hexweave::builder().seed(5150).build().unwrap();
    let mut b = Hexweave::builder().seed(5150).build().unwrap();
    let request = request((0.0, 3.0), None);
    for _ in 0..5 {
        assert_eq!(
            a.generate_encounter(&tables(), &creatures(), &request).unwrap(),
            b.generate_encounter(&tables(), &creatures(), &request).unwrap()
        );
    }
}

#[test]
fn fatal_conditions_surface_as_errors() {
    let mut engine = Hexweave::builder().build().unwrap();
    let no_tables = engine.generate_encounter(&[], &creatures(), &request((0.0, 1.0), None));
    assert!(matches!(
        no_tables,
        Err(EngineError::Encounter(EncounterError::NoTables))
    ));

    let mut empty_party = request((0.0, 1.0), Some(context("Forest")));
    empty_party.party.size = 0;
    let result = engine.generate_encounter(&tables(), &creatures(), &empty_party);
    assert!(matches!(
        result,
        Err(EngineError::Encounter(EncounterError::InvalidParty(_)))
    ));

    let nobody = engine.generate_encounter(&tables(), &CreatureLibrary::new(), &request((0.0, 1.0), None));
    assert!(matches!(
        nobody,
        Err(EngineError::Encounter(EncounterError::NoCreaturesResolved(_)))
    ));
}

#[test]
fn ranking_tables_by_context() {
    let tables = tables();
    let night = NarrativeContext {
        time_of_day: Some("Night".to_string()),
        weather: Some("Fog".to_string()),
        ..context("Forest")
    };
    let ranked = rank_candidates(tables.iter().map(|t| (t.name.clone(), t)), &night);
    let order: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, vec!["Night Woods", "Forest Road", "Highway", "Frozen Peaks"]);
    assert_eq!(ranked[0].score, 4.5);
    assert_eq!(ranked[1].score, 1.5);
}
