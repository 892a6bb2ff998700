//! Simulation mode: deterministic sample content used when no API key is
//! configured or the scenario opts out of remote calls. Everything here is
//! fabricated locally; nothing touches the network.

use crate::prompt::OPENING_COMMAND;
use crate::scenario::{InnerThoughts, PlotChoice, Scenario, SetupDetails, SetupField};

pub const SIM_PARTNER_NAME: &str = "Sim Companion";

/// The full text of one simulated assistant turn, dialogue tagged the same
/// way the remote backend is instructed to tag it.
pub fn sample_turn(message: &str, scenario: &Scenario) -> String {
    let partner = if scenario.partner_name.is_empty() {
        SIM_PARTNER_NAME
    } else {
        &scenario.partner_name
    };
    if message == OPENING_COMMAND {
        format!(
            "Welcome to simulation mode. This is a sample opening scene.\n\
             [{partner}]: Two paths lie ahead of you, one into the forest, \
             one up the mountain. Which will it be?"
        )
    } else {
        format!(
            "(Simulated narration) You chose \"{message}\".\n\
             [{partner}]: A fine test choice! The story rolls on..."
        )
    }
}

/// Cuts a sample turn into small fragments, deliberately splitting inside
/// the speaker tags so the scanner's buffering is exercised in real runs.
pub fn fragment(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(3)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

pub fn sample_inner_thoughts() -> InnerThoughts {
    InnerThoughts {
        monologue: "(Simulated monologue: I wonder whether simulation mode is \
                    working as intended.)"
            .into(),
        relationship: "Simulated relationship: neutral".into(),
    }
}

pub fn sample_plot_choices() -> Vec<PlotChoice> {
    vec![
        PlotChoice {
            title: "Sample option one".into(),
            description: "A simulated plot direction. Pick it to keep testing the flow.".into(),
        },
        PlotChoice {
            title: "Sample option two".into(),
            description: "Another simulated direction, for a different test path.".into(),
        },
    ]
}

pub fn sample_setup_details(field: SetupField) -> SetupDetails {
    match field {
        SetupField::Player => SetupDetails::Character {
            name: "Sim Hero".into(),
            gender: "other".into(),
            description: "A character generated in simulation mode, with no AI attached.".into(),
        },
        SetupField::Partner => SetupDetails::Character {
            name: SIM_PARTNER_NAME.into(),
            gender: "other".into(),
            description: "A friendly simulated companion guiding you through the test.".into(),
        },
        SetupField::World => SetupDetails::World {
            world_view: "A simulated world, built for testing.".into(),
            opening_plot: "You wake in a bright room. A line of text reads: \
                           \"welcome to simulation mode\"."
                .into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_reassemble_to_the_original() {
        let text = sample_turn(OPENING_COMMAND, &crate::scenario::Scenario {
            player_name: String::new(),
            player_gender: String::new(),
            player_description: String::new(),
            partner_name: "Mia".into(),
            partner_gender: String::new(),
            partner_description: String::new(),
            world_view: String::new(),
            opening_plot: String::new(),
            background_image: None,
            secondary_characters: vec![],
            model_quality: Default::default(),
            simulation: true,
        });
        assert_eq!(fragment(&text).concat(), text);
        assert!(text.contains("[Mia]:"));
    }
}
