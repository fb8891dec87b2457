use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Creature statistics as resolved by the library collaborator.
///
/// `hp` and `ac` are kept as the raw stat-block strings ("22 (4d8 + 4)",
/// "15 (leather armor)"); spawning parses their leading integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureData {
    pub name: String,
    pub cr: f64,
    #[serde(default)]
    pub hp: Option<String>,
    #[serde(default)]
    pub ac: Option<String>,
    /// Link back to the creature's source note or statblock.
    pub reference: String,
}

/// Resolves creature names to statistics.
pub trait CreatureSource {
    fn resolve(&self, name: &str) -> Option<CreatureData>;
}

/// In-memory creature library keyed by exact, case-sensitive name.
#[derive(Debug, Clone, Default)]
pub struct CreatureLibrary {
    creatures: FxHashMap<String, CreatureData>,
}

impl CreatureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, creature: CreatureData) {
        self.creatures.insert(creature.name.clone(), creature);
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// Parse a RON list of creatures.
    pub fn parse_ron(input: &str) -> Result<CreatureLibrary, ron::error::SpannedError> {
        let creatures: Vec<CreatureData> = ron::from_str(input)?;
        let mut library = CreatureLibrary::new();
        for creature in creatures {
            library.register(creature);
        }
        Ok(library)
    }
}

impl CreatureSource for CreatureLibrary {
    fn resolve(&self, name: &str) -> Option<CreatureData> {
        self.creatures.get(name).cloned()
    }
}

/// Parse a challenge rating written as "1/4", "0.25" or "3".
pub fn parse_challenge_rating(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let value = match trimmed.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if num < 0.0 || den <= 0.0 {
                return None;
            }
            num / den
        }
        None => trimmed.parse().ok()?,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Leading integer of a stat-block string, e.g. `"22 (4d8 + 4)"` → 22.
pub fn parse_leading_int(input: &str) -> Option<i32> {
    let digits: String = input
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin() -> CreatureData {
        CreatureData {
            name: "Goblin".to_string(),
            cr: 0.25,
            hp: Some("7 (2d6)".to_string()),
            ac: Some("15 (leather armor, shield)".to_string()),
            reference: "Bestiary/Goblin.md".to_string(),
        }
    }

    #[test]
    fn library_resolves_exact_name() {
        let mut library = CreatureLibrary::new();
        library.register(goblin());
        assert_eq!(library.len(), 1);
        assert!(library.resolve("Goblin").is_some());
        assert!(library.resolve("goblin").is_none());
    }

    #[test]
    fn library_from_ron() {
        let library = CreatureLibrary::parse_ron(
            r#"[
                (name: "Wolf", cr: 0.25, hp: Some("11 (2d8 + 2)"), ac: Some("13"), reference: "wolf"),
                (name: "Ogre", cr: 2.0, reference: "ogre"),
            ]"#,
        )
        .unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(library.resolve("Ogre").unwrap().hp, None);
    }

    #[test]
    fn challenge_rating_forms() {
        assert_eq!(parse_challenge_rating("1/4"), Some(0.25));
        assert_eq!(parse_challenge_rating("1/8"), Some(0.125));
        assert_eq!(parse_challenge_rating("0.5"), Some(0.5));
        assert_eq!(parse_challenge_rating(" 3 "), Some(3.0));
        assert_eq!(parse_challenge_rating("1/0"), None);
        assert_eq!(parse_challenge_rating("deadly"), None);
    }

    #[test]
    fn challenge_rating_fractions_must_be_finite_and_positive() {
        assert_eq!(parse_challenge_rating("-1/4"), None);
        assert_eq!(parse_challenge_rating("1/-4"), None);
        assert_eq!(parse_challenge_rating("-1/-4"), None);
        assert_eq!(parse_challenge_rating("inf/1"), None);
        assert_eq!(parse_challenge_rating("NaN/2"), None);
        assert_eq!(parse_challenge_rating("1/inf"), Some(0.0));
        assert_eq!(parse_challenge_rating("-0.5"), None);
    }

    #[test]
    fn leading_int() {
        assert_eq!(parse_leading_int("22 (4d8 + 4)"), Some(22));
        assert_eq!(parse_leading_int("15"), Some(15));
        assert_eq!(parse_leading_int("(none)"), None);
        assert_eq!(parse_leading_int(""), None);
    }
}
