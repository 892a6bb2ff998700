use crate::message::{ChatMessage, Sender};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered story transcript. Grows by append, shrinks only through
/// [`Transcript::rewind`], and is replaced wholesale when a save is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Appends `chunk` to the entry with the given id, if it still exists.
    pub fn append_text(&mut self, id: Uuid, chunk: &str) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            message.text.push_str(chunk);
        }
    }

    pub fn has_user_entry(&self) -> bool {
        self.messages.iter().any(|m| m.sender == Sender::User)
    }

    /// Index of the most recent user entry, scanning backward.
    fn last_user_index(&self) -> Option<usize> {
        self.messages.iter().rposition(|m| m.sender == Sender::User)
    }

    /// Discards the most recent user entry and everything after it. Returns
    /// false (and leaves the transcript untouched) when no user entry exists.
    /// The caller is responsible for reseeding the remote session from the
    /// surviving prefix.
    pub fn rewind(&mut self) -> bool {
        match self.last_user_index() {
            Some(index) => {
                self.messages.truncate(index);
                true
            }
            None => false,
        }
    }
}

impl From<Vec<ChatMessage>> for Transcript {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewind_truncates_before_last_user_entry() {
        let mut transcript = Transcript::from(vec![
            ChatMessage::system("sys"),
            ChatMessage::user("A"),
            ChatMessage::narration("B"),
            ChatMessage::user("C"),
            ChatMessage::narration("D"),
        ]);
        assert!(transcript.rewind());
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[0].text, "sys");
        assert_eq!(transcript.messages()[1].text, "A");
        assert_eq!(transcript.messages()[2].text, "B");

        // A second rewind strips the earlier exchange as well.
        assert!(transcript.rewind());
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].text, "sys");
    }

    #[test]
    fn rewind_without_user_entries_is_a_noop() {
        let mut transcript = Transcript::from(vec![
            ChatMessage::system("sys"),
            ChatMessage::narration("opening"),
        ]);
        let before = transcript.clone();
        assert!(!transcript.rewind());
        assert_eq!(transcript, before);
    }

    #[test]
    fn rewind_can_empty_the_transcript() {
        let mut transcript = Transcript::from(vec![ChatMessage::user("only")]);
        assert!(transcript.rewind());
        assert!(transcript.is_empty());
    }
}
