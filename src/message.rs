use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    System,
    Ai,
}

/// One transcript entry. For `Sender::Ai`, a present `character_name` marks
/// character dialogue; an absent one marks narration. Never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            character_name: None,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::System,
            character_name: None,
            text: text.into(),
        }
    }

    pub fn narration(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Ai,
            character_name: None,
            text: text.into(),
        }
    }

    pub fn dialogue(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Ai,
            character_name: Some(speaker.into()),
            text: text.into(),
        }
    }

    pub fn is_narration(&self) -> bool {
        self.sender == Sender::Ai && self.character_name.is_none()
    }

    pub fn is_dialogue(&self) -> bool {
        self.sender == Sender::Ai && self.character_name.is_some()
    }
}
