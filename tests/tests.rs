use chrono::Utc;
use fabula::message::ChatMessage;
use fabula::prompt::{self, HistoryTurn, OPENING_COMMAND};
use fabula::save::{MAX_SAVES, SaveData, SaveManager};
use fabula::scenario::{Scenario, SecondaryCharacter};
use fabula::sim;
use fabula::stream::TurnAssembler;
use fabula::transcript::Transcript;
use tempfile::tempdir;

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
        secondary_characters: vec![SecondaryCharacter::new("Bob", "an innkeeper")],
        model_quality: Default::default(),
        simulation: true,
    }
}

fn sample_save() -> SaveData {
    SaveData {
        scenario: scenario(),
        transcript: Transcript::from(vec![
            ChatMessage::user(OPENING_COMMAND),
            ChatMessage::narration("The chain snaps. "),
            ChatMessage::dialogue("Mia", "Hold on!"),
        ]),
        saved_at: Utc::now(),
    }
}

#[test]
fn save_round_trip_preserves_slot_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saves.json");

    let mut manager = SaveManager::with_path(path.clone());
    assert!(!manager.has_any());
    let data = sample_save();
    manager.save(2, data.clone()).unwrap();

    let reloaded = SaveManager::with_path(path);
    assert!(reloaded.slot(0).is_none());
    let restored = reloaded.slot(2).expect("slot 2 should survive a reload");
    assert_eq!(restored.scenario, data.scenario);
    assert_eq!(restored.transcript, data.transcript);
    assert_eq!(
        restored.scenario.secondary_characters[0].name,
        "Bob"
    );
}

#[test]
fn out_of_range_slot_is_ignored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saves.json");
    let mut manager = SaveManager::with_path(path.clone());
    manager.save(MAX_SAVES, sample_save()).unwrap();
    assert!(!manager.has_any());
    assert!(!path.exists());
}

#[test]
fn corrupted_save_file_yields_empty_slots_and_is_removed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saves.json");
    std::fs::write(&path, "{{{ not json at all").unwrap();

    let manager = SaveManager::with_path(path.clone());
    assert!(!manager.has_any());
    assert!(!path.exists());
}

#[test]
fn non_array_save_file_is_discarded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saves.json");
    std::fs::write(&path, r#"{"scenario": "not a slot array"}"#).unwrap();

    let manager = SaveManager::with_path(path.clone());
    assert!(!manager.has_any());
    assert!(!path.exists());
}

#[test]
fn malformed_slot_is_dropped_but_valid_slots_survive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saves.json");

    let mut manager = SaveManager::with_path(path.clone());
    manager.save(0, sample_save()).unwrap();

    // Corrupt slot 1 by hand, leaving slot 0 intact.
    let mut slots: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    slots[1] = serde_json::json!({"scenario": "missing everything"});
    std::fs::write(&path, serde_json::to_string(&slots).unwrap()).unwrap();

    let reloaded = SaveManager::with_path(path);
    assert!(reloaded.slot(0).is_some());
    assert!(reloaded.slot(1).is_none());
}

#[test]
fn delete_clears_a_slot_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saves.json");

    let mut manager = SaveManager::with_path(path.clone());
    manager.save(1, sample_save()).unwrap();
    manager.delete(1).unwrap();

    let reloaded = SaveManager::with_path(path);
    assert!(!reloaded.has_any());
}

#[test]
fn simulated_turn_streams_into_narration_and_dialogue() {
    let scenario = scenario();
    let turn = sim::sample_turn(OPENING_COMMAND, &scenario);

    // The simulator's 3-char fragments split speaker tags mid-name, the
    // worst case for the classifier.
    let mut transcript = Transcript::new();
    let mut assembler = TurnAssembler::new(&scenario);
    for fragment in sim::fragment(&turn) {
        assembler.push(&fragment, &mut transcript);
    }
    assembler.finish(&mut transcript);

    let messages = transcript.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].is_narration());
    assert_eq!(messages[1].character_name.as_deref(), Some("Mia"));
    assert!(messages[1].text.contains("Two paths"));
    assert!(!messages[1].text.contains('['));
}

#[test]
fn rewind_then_replay_seeds_the_shorter_history() {
    let mut transcript = Transcript::from(vec![
        ChatMessage::user(OPENING_COMMAND),
        ChatMessage::narration("An opening scene."),
        ChatMessage::user("go north"),
        ChatMessage::narration("You head north. "),
        ChatMessage::dialogue("Mia", "Wrong way."),
    ]);

    assert!(transcript.rewind());
    let turns = prompt::replay_history(&transcript);
    assert_eq!(
        turns,
        vec![
            HistoryTurn::User(OPENING_COMMAND.into()),
            HistoryTurn::Model("An opening scene.".into()),
        ]
    );

    // A second rewind strips the opening as well.
    assert!(transcript.rewind());
    assert!(transcript.is_empty());
    assert!(!transcript.rewind());
}
