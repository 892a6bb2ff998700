//! Prompt assembly for the story session: the game-master system
//! instruction, replay of a prior transcript as alternating turns, and
//! per-message augmentation with length and mode directives.

use crate::message::{ChatMessage, Sender};
use crate::scenario::{ResponseLength, Scenario, TurnMode};
use crate::transcript::Transcript;

/// The fixed command that opens a fresh adventure. Passed through without
/// augmentation.
pub const OPENING_COMMAND: &str = "Begin the adventure.";

pub const SYSTEM_DIRECTIVE_PREFIX: &str = "[System directive:";

/// One replayed exchange for session seeding.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryTurn {
    User(String),
    Model(String),
}

pub fn system_prompt(scenario: &Scenario, language: &str) -> String {
    let secondary = if scenario.secondary_characters.is_empty() {
        String::new()
    } else {
        let list = scenario
            .secondary_characters
            .iter()
            .map(|c| format!("- {}: {}", c.name, c.description))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\nOther characters currently in the scene:\n{list}")
    };

    format!(
        "You are a professional storyteller and game master guiding a dynamic \
         text adventure.\n\
         \n\
         The character you portray is: {partner}.\n\
         About your character:\n\
         - Gender: {partner_gender}\n\
         - Description: {partner_description}\n\
         \n\
         The world and the player character:\n\
         - World premise: {world}\n\
         - Player name: {player}\n\
         - Player gender: {player_gender}\n\
         - Player background: {player_description}\n\
         {secondary}\n\
         \n\
         Your first task is to present the opening scene. In your first reply, \
         describe only the opening plot below, then wait for the player to \
         act. Add no extra commentary such as \"the adventure begins!\".\n\
         - Opening plot: {opening}\n\
         \n\
         After the opening, advance the story from the player's input under \
         these rules:\n\
         1. Describe the scene, the consequences of the player's actions, and \
         what the other characters say and do.\n\
         2. Keep the narration immersive and adapt to the player's choices.\n\
         3. End every reply waiting for the player's next move. Never decide \
         or speak for the player character.\n\
         4. Stay in character as '{partner}' throughout.\n\
         5. Player input arrives tagged as dialogue or action; read the tag \
         to understand intent.\n\
         6. Messages of the form {directive} ...] are stage directions; fold \
         them naturally into your next reply, for example a new character's \
         arrival or departure.\n\
         7. Required format: whenever any character speaks (including \
         {partner}), write the line as \"[Character name]: spoken text\". \
         Text without a name tag is treated as narration. Example: \"The \
         forest darkens. [{partner}]: We should be careful.\"\n\
         8. Write all narration and dialogue in {language}.",
        partner = scenario.partner_name,
        partner_gender = scenario.partner_gender,
        partner_description = scenario.partner_description,
        world = scenario.world_view,
        player = scenario.player_name,
        player_gender = scenario.player_gender,
        player_description = scenario.player_description,
        secondary = secondary,
        opening = scenario.opening_plot,
        directive = SYSTEM_DIRECTIVE_PREFIX,
        language = language,
    )
}

/// Replays a transcript as alternating user/model turns. Consecutive
/// assistant entries merge into one model turn, dialogue entries regain
/// their `[Name]: ` prefix, system entries and empty entries are skipped.
pub fn replay_history(transcript: &Transcript) -> Vec<HistoryTurn> {
    let mut turns: Vec<HistoryTurn> = Vec::new();
    let mut model_parts: Vec<String> = Vec::new();

    for message in transcript.messages() {
        if message.text.trim().is_empty() {
            continue;
        }
        match message.sender {
            Sender::User => {
                flush_model_parts(&mut turns, &mut model_parts);
                turns.push(HistoryTurn::User(message.text.clone()));
            }
            Sender::Ai => model_parts.push(wire_format(message)),
            Sender::System => {}
        }
    }
    flush_model_parts(&mut turns, &mut model_parts);
    turns
}

fn flush_model_parts(turns: &mut Vec<HistoryTurn>, parts: &mut Vec<String>) {
    if !parts.is_empty() {
        turns.push(HistoryTurn::Model(std::mem::take(parts).join("\n")));
    }
}

/// An assistant entry as the model originally wrote it.
fn wire_format(message: &ChatMessage) -> String {
    match &message.character_name {
        Some(name) => format!("[{name}]: {}", message.text),
        None => message.text.clone(),
    }
}

/// Wraps an ordinary player message with a length directive and a
/// dialogue/action marker. The opening command and system directives pass
/// through untouched.
pub fn augment_message(message: &str, length: ResponseLength, mode: TurnMode) -> String {
    if message == OPENING_COMMAND || message.starts_with(SYSTEM_DIRECTIVE_PREFIX) {
        return message.to_string();
    }
    let mode_text = match mode {
        TurnMode::Dialogue => format!("[Player dialogue]: \"{message}\""),
        TurnMode::Action => format!("[Player action]: {message}"),
    };
    format!(
        "{SYSTEM_DIRECTIVE_PREFIX} keep this response {} in length.]\n\n{mode_text}",
        length.label()
    )
}

/// Flattens a transcript into a plain text log for the structured prompts
/// (inner thoughts, plot choices).
pub fn history_as_text(transcript: &Transcript) -> String {
    transcript
        .messages()
        .iter()
        .map(|message| match message.sender {
            Sender::User => format!("Player: {}", message.text),
            Sender::System => format!("System: {}", message.text),
            Sender::Ai => match &message.character_name {
                Some(name) => format!("{name}: {}", message.text),
                None => format!("Narrator: {}", message.text),
            },
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn inner_thoughts_prompt(transcript: &Transcript, scenario: &Scenario) -> String {
    format!(
        "Context: you are portraying an AI character named \"{partner}\" in a \
         text adventure with the player \"{player}\".\n\
         Your character: {description}\n\
         The world: {world}\n\
         \n\
         Task: from the log below, produce \"{partner}\"'s inner monologue at \
         the final moment of the log, and a one-line reading of their current \
         relationship to the player.\n\
         \n\
         Log:\n---\n{log}\n---\n\
         \n\
         Reply as a JSON object with exactly two string keys:\n\
         1. \"monologue\": what \"{partner}\" is truly thinking, feeling, or \
         secretly planning right now.\n\
         2. \"relationship\": one short line on how \"{partner}\" currently \
         sees the player (wary, amused, starting to trust, fed up, ...).",
        partner = scenario.partner_name,
        player = scenario.player_name,
        description = scenario.partner_description,
        world = scenario.world_view,
        log = history_as_text(transcript),
    )
}

pub fn plot_choices_prompt(transcript: &Transcript) -> String {
    format!(
        "As a creative game master, read the story log below and offer the \
         player two clearly different but equally interesting directions the \
         plot could take next.\n\
         \n\
         Log:\n---\n{log}\n---\n\
         \n\
         Reply as JSON in this exact shape:\n\
         {{\n  \"choices\": [\n    {{ \"title\": \"short option title 1\", \
         \"description\": \"what happens if the player picks this.\" }},\n    \
         {{ \"title\": \"short option title 2\", \"description\": \"what \
         happens if the player picks this.\" }}\n  ]\n}}",
        log = history_as_text(transcript),
    )
}

pub fn scene_image_prompt(scenario: &Scenario) -> String {
    format!(
        "Based on the following text adventure settings, write a single \
         concise, visually descriptive prompt for an AI image generation \
         model. Capture the essence of the world, the atmosphere, and the \
         opening scene. Reply with the prompt only, no conversational text.\n\
         \n\
         - World premise: {world}\n\
         - Companion / narrator: {partner}\n\
         - Opening plot: {opening}\n\
         \n\
         Image generation prompt:",
        world = scenario.world_view,
        partner = scenario.partner_description,
        opening = scenario.opening_plot,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::SecondaryCharacter;

    fn scenario() -> Scenario {
        Scenario {
            player_name: "Alex".into(),
            player_gender: "other".into(),
            player_description: "a cartographer".into(),
            partner_name: "Mia".into(),
            partner_gender: "female".into(),
            partner_description: "a sly guide".into(),
            world_view: "floating islands".into(),
            opening_plot: "the anchor chain snaps".into(),
            background_image: None,
            secondary_characters: vec![],
            model_quality: Default::default(),
            simulation: true,
        }
    }

    #[test]
    fn system_prompt_names_cast_format_rule_and_language() {
        let mut s = scenario();
        s.add_secondary_character(SecondaryCharacter::new("Bob", "an innkeeper"));
        let prompt = system_prompt(&s, "French");
        assert!(prompt.contains("Mia"));
        assert!(prompt.contains("Alex"));
        assert!(prompt.contains("- Bob: an innkeeper"));
        assert!(prompt.contains("[Character name]: spoken text"));
        assert!(prompt.contains("the anchor chain snaps"));
        assert!(prompt.contains("in French"));
    }

    #[test]
    fn replay_merges_consecutive_assistant_entries() {
        let transcript = Transcript::from(vec![
            ChatMessage::system("a new character appeared"),
            ChatMessage::user("look around"),
            ChatMessage::narration("Dust everywhere."),
            ChatMessage::dialogue("Mia", "Cover your mouth."),
            ChatMessage::user("keep going"),
        ]);
        let turns = replay_history(&transcript);
        assert_eq!(
            turns,
            vec![
                HistoryTurn::User("look around".into()),
                HistoryTurn::Model("Dust everywhere.\n[Mia]: Cover your mouth.".into()),
                HistoryTurn::User("keep going".into()),
            ]
        );
    }

    #[test]
    fn replay_skips_empty_entries() {
        let transcript = Transcript::from(vec![
            ChatMessage::narration("   "),
            ChatMessage::user("hello"),
        ]);
        assert_eq!(
            replay_history(&transcript),
            vec![HistoryTurn::User("hello".into())]
        );
    }

    #[test]
    fn augment_wraps_ordinary_turns() {
        let augmented = augment_message("open the door", ResponseLength::Short, TurnMode::Action);
        assert!(augmented.starts_with(SYSTEM_DIRECTIVE_PREFIX));
        assert!(augmented.contains("[Player action]: open the door"));

        let spoken = augment_message("hello?", ResponseLength::Medium, TurnMode::Dialogue);
        assert!(spoken.contains("[Player dialogue]: \"hello?\""));
    }

    #[test]
    fn augment_passes_opening_and_directives_through() {
        assert_eq!(
            augment_message(OPENING_COMMAND, ResponseLength::Short, TurnMode::Action),
            OPENING_COMMAND
        );
        let directive = format!("{SYSTEM_DIRECTIVE_PREFIX} weave in the new arrival.]");
        assert_eq!(
            augment_message(&directive, ResponseLength::Long, TurnMode::Action),
            directive
        );
    }
}
