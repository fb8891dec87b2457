use serde::{Deserialize, Serialize};

/// A category of narrative tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagCategory {
    Terrain,
    Weather,
    TimeOfDay,
    Faction,
    Situation,
}

impl TagCategory {
    pub const ALL: [TagCategory; 5] = [
        TagCategory::Terrain,
        TagCategory::Weather,
        TagCategory::TimeOfDay,
        TagCategory::Faction,
        TagCategory::Situation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Terrain => "terrain",
            Self::Weather => "weather",
            Self::TimeOfDay => "timeOfDay",
            Self::Faction => "faction",
            Self::Situation => "situation",
        }
    }
}

/// The current game state as a bag of narrative tags.
///
/// Absent single-valued fields never match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeContext {
    #[serde(default)]
    pub terrain: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub situation: Option<String>,
    #[serde(default)]
    pub factions: Vec<String>,
}

impl NarrativeContext {
    /// Context values for one category, as a slice-like list.
    pub fn values(&self, category: TagCategory) -> Vec<&str> {
        match category {
            TagCategory::Terrain => self.terrain.as_deref().into_iter().collect(),
            TagCategory::Weather => self.weather.as_deref().into_iter().collect(),
            TagCategory::TimeOfDay => self.time_of_day.as_deref().into_iter().collect(),
            TagCategory::Situation => self.situation.as_deref().into_iter().collect(),
            TagCategory::Faction => self.factions.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terrain.is_none()
            && self.weather.is_none()
            && self.time_of_day.is_none()
            && self.situation.is_none()
            && self.factions.is_empty()
    }
}

/// Per-category tag lists carried by any context-ranked resource
/// (encounter tables, playlists).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagSet {
    #[serde(default)]
    pub terrain: Vec<String>,
    #[serde(default)]
    pub weather: Vec<String>,
    #[serde(default)]
    pub time_of_day: Vec<String>,
    #[serde(default)]
    pub faction: Vec<String>,
    #[serde(default)]
    pub situation: Vec<String>,
}

impl TagSet {
    pub fn get(&self, category: TagCategory) -> &[String] {
        match category {
            TagCategory::Terrain => &self.terrain,
            TagCategory::Weather => &self.weather,
            TagCategory::TimeOfDay => &self.time_of_day,
            TagCategory::Faction => &self.faction,
            TagCategory::Situation => &self.situation,
        }
    }
}

/// The result of scoring one candidate against a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: String,
    pub score: f64,
    pub matched_categories: Vec<TagCategory>,
    pub matched_tag_count: usize,
}
