use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Preferred length of the next assistant response. Chosen per message, not
/// per scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseLength {
    #[default]
    Short,
    Medium,
    Long,
    ExtraLong,
}

impl ResponseLength {
    pub fn cycle(self) -> Self {
        match self {
            Self::Short => Self::Medium,
            Self::Medium => Self::Long,
            Self::Long => Self::ExtraLong,
            Self::ExtraLong => Self::Short,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Short => "short (about 100 words)",
            Self::Medium => "medium (about 1000 words)",
            Self::Long => "long (about 3000 words)",
            Self::ExtraLong => "extra long (go all out)",
        }
    }
}

/// Whether a player message is spoken in character or narrated as an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnMode {
    Dialogue,
    #[default]
    Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelQuality {
    #[default]
    Fast,
    High,
}

impl ModelQuality {
    /// Temperature for the main story stream.
    pub fn story_temperature(self) -> f32 {
        match self {
            Self::High => 0.95,
            Self::Fast => 0.8,
        }
    }

    /// Temperature for plot choice generation.
    pub fn choices_temperature(self) -> f32 {
        match self {
            Self::High => 0.9,
            Self::Fast => 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryCharacter {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl SecondaryCharacter {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Everything the user configured before play, plus the mutable cast of
/// secondary characters. Created at setup, discarded on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub player_name: String,
    pub player_gender: String,
    pub player_description: String,
    pub partner_name: String,
    pub partner_gender: String,
    pub partner_description: String,
    pub world_view: String,
    pub opening_plot: String,
    /// Path of a generated scene image, if any.
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub secondary_characters: Vec<SecondaryCharacter>,
    #[serde(default)]
    pub model_quality: ModelQuality,
    /// Play without a remote backend, fabricating sample content locally.
    #[serde(default)]
    pub simulation: bool,
}

impl Scenario {
    /// Names the stream classifier accepts as speakers: the companion plus
    /// every secondary character currently in the scene.
    pub fn known_names(&self) -> Vec<&str> {
        let mut names = vec![self.partner_name.as_str()];
        names.extend(self.secondary_characters.iter().map(|c| c.name.as_str()));
        names
    }

    pub fn add_secondary_character(&mut self, character: SecondaryCharacter) {
        self.secondary_characters.push(character);
    }

    pub fn remove_secondary_character(&mut self, id: Uuid) -> Option<SecondaryCharacter> {
        let index = self.secondary_characters.iter().position(|c| c.id == id)?;
        Some(self.secondary_characters.remove(index))
    }
}

/// Ephemeral plot suggestion offered to the user. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotChoice {
    pub title: String,
    pub description: String,
}

/// The companion's private state of mind, surfaced on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnerThoughts {
    pub monologue: String,
    pub relationship: String,
}

/// Which setup section a generated field set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Player,
    Partner,
    World,
}

/// Generated content for one setup section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SetupDetails {
    Character {
        name: String,
        gender: String,
        description: String,
    },
    World {
        world_view: String,
        opening_plot: String,
    },
}
