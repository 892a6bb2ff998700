//! Incremental classification of streamed story text.
//!
//! The backend interleaves narration with character dialogue marked as
//! `[Name]: text`. Fragments arrive at arbitrary boundaries, so a tag may be
//! split across two or more fragments; the scanner buffers a suspected
//! partial tag until it is completed or disproved instead of matching one
//! fragment at a time.

use crate::message::ChatMessage;
use crate::scenario::Scenario;
use crate::transcript::Transcript;
use uuid::Uuid;

/// Classified run of text emitted by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub speaker: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
enum TagParse {
    /// Not inside a suspected tag.
    None,
    /// Seen `[`, collecting the name.
    Name(String),
    /// Seen `[name]`, waiting for the colon.
    AfterClose(String),
}

/// Two-state scanner: narrating, or speaking as the most recent tagged name.
/// A completed tag is the only transition; everything else is text in the
/// current state.
#[derive(Debug)]
pub struct SpeakerTagScanner {
    speaker: Option<String>,
    parse: TagParse,
    /// Raw text of the suspected tag, replayed verbatim if disproved.
    pending: String,
    /// Swallow whitespace immediately after an accepted tag, across
    /// fragment boundaries.
    eat_whitespace: bool,
}

impl Default for SpeakerTagScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeakerTagScanner {
    pub fn new() -> Self {
        Self {
            speaker: None,
            parse: TagParse::None,
            pending: String::new(),
            eat_whitespace: false,
        }
    }

    pub fn current_speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    /// Feeds one stream fragment and returns the classified runs that became
    /// unambiguous. An empty fragment is a no-op.
    pub fn push(&mut self, fragment: &str) -> Vec<Piece> {
        let mut out = Vec::new();
        for ch in fragment.chars() {
            self.push_char(ch, &mut out);
        }
        out
    }

    /// Ends the stream, flushing any undecided buffer as literal text.
    pub fn finish(&mut self) -> Vec<Piece> {
        let mut out = Vec::new();
        self.flush_pending(&mut out);
        out
    }

    fn push_char(&mut self, ch: char, out: &mut Vec<Piece>) {
        match std::mem::replace(&mut self.parse, TagParse::None) {
            TagParse::None => {
                if ch == '[' {
                    self.parse = TagParse::Name(String::new());
                    self.pending.push('[');
                } else {
                    self.emit_char(ch, out);
                }
            }
            TagParse::Name(mut name) => match ch {
                ']' if name.is_empty() => {
                    // "[]" cannot be a tag.
                    self.pending.push(']');
                    self.flush_pending(out);
                }
                ']' => {
                    self.pending.push(']');
                    self.parse = TagParse::AfterClose(name);
                }
                '[' => {
                    // The earlier bracket cannot open a tag, but this one may.
                    self.flush_pending(out);
                    self.parse = TagParse::Name(String::new());
                    self.pending.push('[');
                }
                _ => {
                    name.push(ch);
                    self.pending.push(ch);
                    self.parse = TagParse::Name(name);
                }
            },
            TagParse::AfterClose(name) => {
                if ch == ':' {
                    self.speaker = Some(name);
                    self.pending.clear();
                    self.eat_whitespace = true;
                } else {
                    // "[name]" without a colon is ordinary text.
                    self.flush_pending(out);
                    self.push_char(ch, out);
                }
            }
        }
    }

    /// Replays the buffered suspected tag as literal text in the current
    /// state.
    fn flush_pending(&mut self, out: &mut Vec<Piece>) {
        self.parse = TagParse::None;
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        for ch in pending.chars() {
            self.emit_char(ch, out);
        }
    }

    fn emit_char(&mut self, ch: char, out: &mut Vec<Piece>) {
        if self.eat_whitespace {
            if ch.is_whitespace() {
                return;
            }
            self.eat_whitespace = false;
        }
        match out.last_mut() {
            Some(piece) if piece.speaker.as_deref() == self.speaker.as_deref() => {
                piece.text.push(ch);
            }
            _ => out.push(Piece {
                speaker: self.speaker.clone(),
                text: ch.to_string(),
            }),
        }
    }
}

/// Applies scanner output to the transcript for one assistant turn: one
/// narration entry per turn, one dialogue entry per run of the same speaker.
/// Speakers outside the scenario's known cast are coerced to the companion.
pub struct TurnAssembler {
    scanner: SpeakerTagScanner,
    known_names: Vec<String>,
    partner_name: String,
    narration_id: Option<Uuid>,
    current_dialogue: Option<(String, Uuid)>,
}

impl TurnAssembler {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            scanner: SpeakerTagScanner::new(),
            known_names: scenario
                .known_names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            partner_name: scenario.partner_name.clone(),
            narration_id: None,
            current_dialogue: None,
        }
    }

    pub fn push(&mut self, fragment: &str, transcript: &mut Transcript) {
        let pieces = self.scanner.push(fragment);
        self.apply(pieces, transcript);
    }

    pub fn finish(&mut self, transcript: &mut Transcript) {
        let pieces = self.scanner.finish();
        self.apply(pieces, transcript);
    }

    fn apply(&mut self, pieces: Vec<Piece>, transcript: &mut Transcript) {
        for piece in pieces {
            match piece.speaker {
                None => match self.narration_id {
                    Some(id) => transcript.append_text(id, &piece.text),
                    None => {
                        let message = ChatMessage::narration(piece.text);
                        self.narration_id = Some(message.id);
                        transcript.push(message);
                    }
                },
                Some(reported) => {
                    let speaker = self.coerce_name(reported);
                    match &self.current_dialogue {
                        Some((current, id)) if *current == speaker => {
                            transcript.append_text(*id, &piece.text);
                        }
                        _ => {
                            let message = ChatMessage::dialogue(speaker.clone(), piece.text);
                            self.current_dialogue = Some((speaker, message.id));
                            transcript.push(message);
                        }
                    }
                }
            }
        }
    }

    /// Unknown speakers default to the companion. Papering over model drift
    /// this way was kept from the original behavior, but we log it so drift
    /// stays visible.
    fn coerce_name(&self, reported: String) -> String {
        if self.known_names.iter().any(|n| *n == reported) {
            reported
        } else {
            log::debug!(
                "unknown speaker {reported:?} coerced to companion {:?}",
                self.partner_name
            );
            self.partner_name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the scanner over the fragments and coalesces adjacent
    /// same-speaker pieces, the way the assembler does via `append_text`.
    /// Each `push` call returns fresh pieces, so a run of one speaker can
    /// span several of them.
    fn collect(fragments: &[&str]) -> Vec<Piece> {
        let mut scanner = SpeakerTagScanner::new();
        let mut pieces: Vec<Piece> = Vec::new();
        let absorb = |batch: Vec<Piece>, pieces: &mut Vec<Piece>| {
            for piece in batch {
                match pieces.last_mut() {
                    Some(last) if last.speaker == piece.speaker => last.text.push_str(&piece.text),
                    _ => pieces.push(piece),
                }
            }
        };
        for fragment in fragments {
            absorb(scanner.push(fragment), &mut pieces);
        }
        absorb(scanner.finish(), &mut pieces);
        pieces
    }

    #[test]
    fn untagged_text_is_narration() {
        let pieces = collect(&["The woods ", "grow darker."]);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].speaker, None);
        assert_eq!(pieces[0].text, "The woods grow darker.");
    }

    #[test]
    fn tag_strips_and_sets_speaker() {
        let pieces = collect(&["[Bob]: hi", " there"]);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].speaker.as_deref(), Some("Bob"));
        assert_eq!(pieces[0].text, "hi there");
    }

    #[test]
    fn tag_split_across_fragments() {
        let pieces = collect(&["[Bo", "b]: hi"]);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].speaker.as_deref(), Some("Bob"));
        assert_eq!(pieces[0].text, "hi");
    }

    #[test]
    fn tag_split_before_colon() {
        let pieces = collect(&["[Bob]", ": hi"]);
        assert_eq!(pieces[0].speaker.as_deref(), Some("Bob"));
        assert_eq!(pieces[0].text, "hi");
    }

    #[test]
    fn narration_then_dialogue_mid_fragment() {
        let pieces = collect(&["The door creaks. [Mia]: Who's there?"]);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].speaker, None);
        assert_eq!(pieces[0].text, "The door creaks. ");
        assert_eq!(pieces[1].speaker.as_deref(), Some("Mia"));
        assert_eq!(pieces[1].text, "Who's there?");
    }

    #[test]
    fn bracketed_text_without_colon_stays_literal() {
        let pieces = collect(&["a [note] b"]);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].text, "a [note] b");
    }

    #[test]
    fn empty_brackets_stay_literal() {
        let pieces = collect(&["x[]y"]);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].text, "x[]y");
    }

    #[test]
    fn restarted_bracket_recovers() {
        let pieces = collect(&["a[b[Bob]: hi"]);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].speaker, None);
        assert_eq!(pieces[0].text, "a[b");
        assert_eq!(pieces[1].speaker.as_deref(), Some("Bob"));
        assert_eq!(pieces[1].text, "hi");
    }

    #[test]
    fn empty_fragment_is_a_noop() {
        let mut scanner = SpeakerTagScanner::new();
        assert!(scanner.push("").is_empty());
    }

    #[test]
    fn each_push_returns_only_that_fragment_as_pieces() {
        // Merging across calls is the caller's job; the scanner only
        // coalesces within one call.
        let mut scanner = SpeakerTagScanner::new();
        let first = scanner.push("The woods ");
        let second = scanner.push("grow darker.");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].text, "The woods ");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].text, "grow darker.");
    }

    #[test]
    fn dangling_partial_tag_flushes_on_finish() {
        let pieces = collect(&["wait [Bo"]);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].speaker, None);
        assert_eq!(pieces[0].text, "wait [Bo");
    }

    #[test]
    fn whitespace_after_tag_is_swallowed_across_fragments() {
        let pieces = collect(&["[Bob]:", "  hi"]);
        assert_eq!(pieces[0].speaker.as_deref(), Some("Bob"));
        assert_eq!(pieces[0].text, "hi");
    }

    fn test_scenario() -> Scenario {
        Scenario {
            player_name: "Alex".into(),
            player_gender: "other".into(),
            player_description: "a wanderer".into(),
            partner_name: "Mia".into(),
            partner_gender: "female".into(),
            partner_description: "a guide".into(),
            world_view: "a quiet forest".into(),
            opening_plot: "dawn breaks".into(),
            background_image: None,
            secondary_characters: vec![SecondaryCharacter::new("Bob", "an innkeeper")],
            model_quality: Default::default(),
            simulation: true,
        }
    }

    use crate::scenario::SecondaryCharacter;

    #[test]
    fn assembler_builds_narration_and_dialogue_entries() {
        let scenario = test_scenario();
        let mut transcript = Transcript::new();
        let mut assembler = TurnAssembler::new(&scenario);
        assembler.push("Rain falls. [Bob]: Come in, ", &mut transcript);
        assembler.push("quickly.", &mut transcript);
        assembler.finish(&mut transcript);

        let messages = transcript.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_narration());
        assert_eq!(messages[0].text, "Rain falls. ");
        assert_eq!(messages[1].character_name.as_deref(), Some("Bob"));
        assert_eq!(messages[1].text, "Come in, quickly.");
    }

    #[test]
    fn assembler_coerces_unknown_speaker_to_companion() {
        let scenario = test_scenario();
        let mut transcript = Transcript::new();
        let mut assembler = TurnAssembler::new(&scenario);
        assembler.push("[Stranger]: You never saw me.", &mut transcript);
        assembler.finish(&mut transcript);

        let messages = transcript.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].character_name.as_deref(), Some("Mia"));
    }

    #[test]
    fn assembler_reuses_narration_entry_across_interleaving() {
        let scenario = test_scenario();
        let mut transcript = Transcript::new();
        let mut assembler = TurnAssembler::new(&scenario);
        assembler.push("Thunder. [Mia]: Stay close. ", &mut transcript);
        assembler.push("The lights die.", &mut transcript);
        assembler.finish(&mut transcript);

        // Dialogue continues until the next tag; narration entry was created
        // first and keeps its place.
        let messages = transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "Thunder. ");
        assert_eq!(
            messages[1].text,
            "Stay close. The lights die."
        );
    }
}
