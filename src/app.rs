//! Turn/history controller and application state. Owns the transcript, the
//! scenario, and the one active session; all remote work runs on spawned
//! tasks that report back through the [`AppEvent`] channel so the UI keeps
//! repainting between stream fragments.

use crate::ai::{StoryAi, StreamEvent};
use crate::app_state::AppState;
use crate::error::{AiError, classify_error};
use crate::message::ChatMessage;
use crate::prompt::{self, OPENING_COMMAND, SYSTEM_DIRECTIVE_PREFIX};
use crate::save::{MAX_SAVES, SaveData, SaveManager};
use crate::scenario::{
    InnerThoughts, ModelQuality, PlotChoice, ResponseLength, Scenario, SecondaryCharacter,
    SetupDetails, SetupField, TurnMode,
};
use crate::settings::Settings;
use crate::stream::TurnAssembler;
use crate::transcript::Transcript;
use crate::ui::spinner::Spinner;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Results of background work, delivered to the main loop.
pub enum AppEvent {
    Stream(StreamEvent),
    PlotChoices(Result<Vec<PlotChoice>, AiError>),
    InnerThoughts(Result<InnerThoughts, AiError>),
    SetupDetails(SetupField, Result<SetupDetails, AiError>),
    SceneImage(Result<String, AiError>),
    ApiKeyValidated(bool),
}

/// Rows of the setup form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupItem {
    PlayerName,
    PlayerGender,
    PlayerDescription,
    GeneratePlayer,
    PartnerName,
    PartnerGender,
    PartnerDescription,
    GeneratePartner,
    WorldView,
    OpeningPlot,
    GenerateWorld,
    GenerateImage,
    ToggleQuality,
    ToggleSimulation,
    Start,
}

pub const SETUP_ITEMS: &[SetupItem] = &[
    SetupItem::PlayerName,
    SetupItem::PlayerGender,
    SetupItem::PlayerDescription,
    SetupItem::GeneratePlayer,
    SetupItem::PartnerName,
    SetupItem::PartnerGender,
    SetupItem::PartnerDescription,
    SetupItem::GeneratePartner,
    SetupItem::WorldView,
    SetupItem::OpeningPlot,
    SetupItem::GenerateWorld,
    SetupItem::GenerateImage,
    SetupItem::ToggleQuality,
    SetupItem::ToggleSimulation,
    SetupItem::Start,
];

/// Scenario under construction on the setup screen.
#[derive(Debug, Clone, Default)]
pub struct SetupForm {
    pub player_name: String,
    pub player_gender: String,
    pub player_description: String,
    pub partner_name: String,
    pub partner_gender: String,
    pub partner_description: String,
    pub world_view: String,
    pub opening_plot: String,
    pub background_image: Option<String>,
    pub model_quality: ModelQuality,
    pub simulation: bool,
    pub selected: usize,
    pub editing: bool,
}

impl SetupForm {
    pub fn selected_item(&self) -> SetupItem {
        SETUP_ITEMS[self.selected]
    }

    pub fn field_mut(&mut self, item: SetupItem) -> Option<&mut String> {
        match item {
            SetupItem::PlayerName => Some(&mut self.player_name),
            SetupItem::PlayerGender => Some(&mut self.player_gender),
            SetupItem::PlayerDescription => Some(&mut self.player_description),
            SetupItem::PartnerName => Some(&mut self.partner_name),
            SetupItem::PartnerGender => Some(&mut self.partner_gender),
            SetupItem::PartnerDescription => Some(&mut self.partner_description),
            SetupItem::WorldView => Some(&mut self.world_view),
            SetupItem::OpeningPlot => Some(&mut self.opening_plot),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.player_name.trim().is_empty()
            && !self.partner_name.trim().is_empty()
            && !self.world_view.trim().is_empty()
            && !self.opening_plot.trim().is_empty()
    }

    pub fn into_scenario(self) -> Scenario {
        Scenario {
            player_name: self.player_name,
            player_gender: self.player_gender,
            player_description: self.player_description,
            partner_name: self.partner_name,
            partner_gender: self.partner_gender,
            partner_description: self.partner_description,
            world_view: self.world_view,
            opening_plot: self.opening_plot,
            background_image: self.background_image,
            secondary_characters: Vec::new(),
            model_quality: self.model_quality,
            simulation: self.simulation,
        }
    }
}

/// Two-step input flow for adding a secondary character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterInput {
    None,
    Name(String),
    Description { name: String, text: String },
}

pub struct App {
    pub state: AppState,
    pub should_quit: bool,

    pub settings: Settings,
    pub save_manager: SaveManager,
    /// Startup configuration warning, shown on the menu and setup screens.
    pub startup_notice: Option<String>,
    pub api_key_valid: bool,

    ai: Option<StoryAi>,
    pub scenario: Option<Scenario>,
    pub transcript: Transcript,
    pub plot_choices: Vec<PlotChoice>,
    pub inner_thoughts: Option<InnerThoughts>,
    pub show_thoughts: bool,

    // One streamed turn at a time; see `is_busy`.
    streaming: bool,
    pub waiting_choices: bool,
    pub waiting_thoughts: bool,
    pub waiting_setup: bool,
    assembler: Option<TurnAssembler>,
    pending_user_message: Option<String>,
    pending_raw: String,

    pub input: String,
    pub turn_mode: TurnMode,
    pub response_length: ResponseLength,

    pub main_menu_index: usize,
    pub slot_index: usize,
    pub character_index: usize,
    pub character_input: CharacterInput,
    pub api_key_input: String,
    pub setup: SetupForm,
    pub scroll_offset: usize,

    pub spinner: Spinner,
    last_spinner_update: Instant,

    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        let settings = Settings::load();
        let startup_notice = if settings.api_key.is_none() {
            Some(
                "Warning: no API key configured. Remote narration is \
                 unavailable; enable simulation mode on the setup screen to \
                 try the interface, or enter a key from the main menu."
                    .to_string(),
            )
        } else {
            None
        };

        Self {
            state: AppState::MainMenu,
            should_quit: false,
            save_manager: SaveManager::new(),
            startup_notice,
            api_key_valid: settings.api_key.is_some(),
            settings,
            ai: None,
            scenario: None,
            transcript: Transcript::new(),
            plot_choices: Vec::new(),
            inner_thoughts: None,
            show_thoughts: false,
            streaming: false,
            waiting_choices: false,
            waiting_thoughts: false,
            waiting_setup: false,
            assembler: None,
            pending_user_message: None,
            pending_raw: String::new(),
            input: String::new(),
            turn_mode: TurnMode::default(),
            response_length: ResponseLength::default(),
            main_menu_index: 0,
            slot_index: 0,
            character_index: 0,
            character_input: CharacterInput::None,
            api_key_input: String::new(),
            setup: SetupForm::default(),
            scroll_offset: 0,
            spinner: Spinner::new(),
            last_spinner_update: Instant::now(),
            event_tx: event_tx.clone(),
        }
    }

    /// Advisory exclusion: the UI refuses to start a second send/rewind
    /// while one streamed turn is pending. This is a UI contract, not a
    /// runtime lock.
    pub fn is_busy(&self) -> bool {
        self.streaming
    }

    pub fn can_rewind(&self) -> bool {
        !self.is_busy() && self.transcript.has_user_entry()
    }

    pub fn on_tick(&mut self) {
        if (self.streaming || self.waiting_choices || self.waiting_thoughts || self.waiting_setup)
            && self.last_spinner_update.elapsed() >= Duration::from_millis(100)
        {
            self.spinner.next_frame();
            self.last_spinner_update = Instant::now();
        }
    }

    // --- game lifecycle -----------------------------------------------------

    fn make_ai(&self, simulation: bool) -> StoryAi {
        match (&self.settings.api_key, simulation) {
            (_, true) | (None, _) => StoryAi::simulated(),
            (Some(key), false) => StoryAi::remote(key, &self.settings.model),
        }
    }

    pub fn start_game(&mut self) {
        if !self.setup.is_complete() {
            self.startup_notice =
                Some("Fill in at least both names, the world premise, and the opening plot.".into());
            return;
        }
        let scenario = std::mem::take(&mut self.setup).into_scenario();
        let mut ai = self.make_ai(scenario.simulation);
        ai.start_session(&scenario, &Transcript::new(), &self.settings.language);

        self.transcript = Transcript::new();
        self.plot_choices.clear();
        self.inner_thoughts = None;
        self.scenario = Some(scenario);
        self.ai = Some(ai);
        self.state = AppState::Loading;
        self.startup_notice = None;
        self.begin_turn(OPENING_COMMAND.to_string());
    }

    pub fn reset_game(&mut self) {
        self.scenario = None;
        self.transcript = Transcript::new();
        self.plot_choices.clear();
        self.inner_thoughts = None;
        self.show_thoughts = false;
        self.ai = None;
        self.input.clear();
        self.scroll_offset = 0;
        self.state = AppState::MainMenu;
    }

    // --- turn controller ----------------------------------------------------

    /// Appends a user turn, clears pending plot suggestions, and triggers
    /// one streamed assistant turn.
    pub fn send_user_turn(&mut self, text: String) {
        if self.is_busy() || text.trim().is_empty() {
            return;
        }
        self.plot_choices.clear();
        self.transcript.push(ChatMessage::user(text.clone()));
        let augmented = prompt::augment_message(&text, self.response_length, self.turn_mode);
        self.begin_turn(augmented);
    }

    /// Sends a stage direction. It is recorded as a user turn in the
    /// transcript, same as the original behavior for character events.
    fn send_directive(&mut self, directive: String) {
        self.plot_choices.clear();
        self.transcript.push(ChatMessage::user(directive.clone()));
        self.begin_turn(directive);
    }

    fn begin_turn(&mut self, wire_message: String) {
        let (Some(ai), Some(scenario)) = (&self.ai, &self.scenario) else {
            return;
        };
        let job = match ai.turn_job(scenario, wire_message.clone()) {
            Ok(job) => job,
            Err(e) => {
                self.transcript
                    .push(ChatMessage::system(classify_error(&e.to_string())));
                return;
            }
        };
        self.assembler = Some(TurnAssembler::new(scenario));
        self.pending_user_message = Some(wire_message);
        self.pending_raw.clear();
        self.streaming = true;

        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let handle = tokio::spawn(job.run(tx));
            while let Some(event) = rx.recv().await {
                if events.send(AppEvent::Stream(event)).is_err() {
                    break;
                }
            }
            let _ = handle.await;
        });
    }

    /// Discards the most recent user turn and everything after it, then
    /// reseeds a fresh session from the surviving prefix. No-op when there
    /// is nothing to rewind or a turn is in flight.
    pub fn rewind(&mut self) {
        if !self.can_rewind() {
            return;
        }
        if !self.transcript.rewind() {
            return;
        }
        self.plot_choices.clear();
        if let (Some(ai), Some(scenario)) = (self.ai.as_mut(), &self.scenario) {
            ai.start_session(scenario, &self.transcript, &self.settings.language);
        }
        log::info!("rewound transcript to {} entries", self.transcript.len());
    }

    // --- stream handling ----------------------------------------------------

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Stream(stream_event) => self.handle_stream_event(stream_event),
            AppEvent::PlotChoices(result) => {
                self.waiting_choices = false;
                match result {
                    Ok(choices) => self.plot_choices = choices,
                    Err(e) => {
                        // Same degradation as the original: keep playing with
                        // a manual-entry pair instead of a hard failure.
                        self.plot_choices = vec![
                            PlotChoice {
                                title: "Suggestion failed".into(),
                                description: classify_error(&e.to_string()),
                            },
                            PlotChoice {
                                title: "Type your own".into(),
                                description: "Ignore the suggestions and type your next move."
                                    .into(),
                            },
                        ];
                    }
                }
            }
            AppEvent::InnerThoughts(result) => {
                self.waiting_thoughts = false;
                self.inner_thoughts = Some(match result {
                    Ok(thoughts) => thoughts,
                    Err(e) => InnerThoughts {
                        monologue: format!("Peek failed: {}", classify_error(&e.to_string())),
                        relationship: "unknown".into(),
                    },
                });
            }
            AppEvent::SetupDetails(field, result) => {
                self.waiting_setup = false;
                match result {
                    Ok(details) => self.apply_setup_details(field, details),
                    Err(e) => self.startup_notice = Some(classify_error(&e.to_string())),
                }
            }
            AppEvent::SceneImage(result) => {
                self.waiting_setup = false;
                match result {
                    Ok(reference) => match &mut self.scenario {
                        Some(scenario) => scenario.background_image = Some(reference),
                        None => self.setup.background_image = Some(reference),
                    },
                    Err(e) => self.startup_notice = Some(classify_error(&e.to_string())),
                }
            }
            AppEvent::ApiKeyValidated(is_valid) => {
                self.api_key_valid = is_valid;
                if is_valid {
                    self.startup_notice = None;
                    self.state = AppState::MainMenu;
                } else {
                    self.startup_notice =
                        Some("That key did not validate against the API.".into());
                }
            }
        }
    }

    fn handle_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Fragment(text) => {
                self.pending_raw.push_str(&text);
                if let Some(assembler) = &mut self.assembler {
                    assembler.push(&text, &mut self.transcript);
                }
            }
            StreamEvent::Completed => {
                if let Some(mut assembler) = self.assembler.take() {
                    assembler.finish(&mut self.transcript);
                }
                if let (Some(ai), Some(sent)) = (self.ai.as_mut(), self.pending_user_message.take())
                {
                    ai.complete_turn(sent, std::mem::take(&mut self.pending_raw));
                }
                self.streaming = false;
                if self.state == AppState::Loading {
                    self.state = AppState::InGame;
                }
            }
            StreamEvent::Failed(raw) => {
                // Keep whatever was assembled; surface the problem inline.
                if let Some(mut assembler) = self.assembler.take() {
                    assembler.finish(&mut self.transcript);
                }
                self.pending_user_message = None;
                self.pending_raw.clear();
                self.streaming = false;
                self.transcript
                    .push(ChatMessage::system(format!(
                        "Something went wrong: {}",
                        classify_error(&raw)
                    )));
                if self.state == AppState::Loading {
                    // Opening never arrived; back to setup like the original.
                    self.state = AppState::Setup;
                    self.startup_notice = Some(classify_error(&raw));
                }
            }
        }
    }

    // --- structured requests ------------------------------------------------

    pub fn request_plot_choices(&mut self) {
        let (Some(ai), Some(scenario)) = (&self.ai, &self.scenario) else {
            return;
        };
        if self.waiting_choices {
            return;
        }
        self.waiting_choices = true;
        self.plot_choices.clear();
        let backend = ai.backend();
        let prompt = prompt::plot_choices_prompt(&self.transcript);
        let temperature = scenario.model_quality.choices_temperature();
        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.plot_choices(prompt, temperature).await;
            let _ = events.send(AppEvent::PlotChoices(result));
        });
    }

    pub fn request_inner_thoughts(&mut self) {
        let (Some(ai), Some(scenario)) = (&self.ai, &self.scenario) else {
            return;
        };
        if self.waiting_thoughts {
            return;
        }
        self.waiting_thoughts = true;
        self.inner_thoughts = None;
        let backend = ai.backend();
        let prompt = prompt::inner_thoughts_prompt(&self.transcript, scenario);
        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.inner_thoughts(prompt).await;
            let _ = events.send(AppEvent::InnerThoughts(result));
        });
    }

    pub fn request_setup_details(&mut self, field: SetupField) {
        if self.waiting_setup {
            return;
        }
        self.waiting_setup = true;
        let backend = self.make_ai(self.setup.simulation).backend();
        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.setup_details(field).await;
            let _ = events.send(AppEvent::SetupDetails(field, result));
        });
    }

    pub fn request_scene_image(&mut self) {
        if self.waiting_setup {
            return;
        }
        let preview = Scenario {
            player_name: self.setup.player_name.clone(),
            player_gender: self.setup.player_gender.clone(),
            player_description: self.setup.player_description.clone(),
            partner_name: self.setup.partner_name.clone(),
            partner_gender: self.setup.partner_gender.clone(),
            partner_description: self.setup.partner_description.clone(),
            world_view: self.setup.world_view.clone(),
            opening_plot: self.setup.opening_plot.clone(),
            background_image: None,
            secondary_characters: Vec::new(),
            model_quality: self.setup.model_quality,
            simulation: self.setup.simulation,
        };
        self.waiting_setup = true;
        let backend = self.make_ai(self.setup.simulation).backend();
        let prompt = prompt::scene_image_prompt(&preview);
        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.scene_image(prompt).await;
            let _ = events.send(AppEvent::SceneImage(result));
        });
    }

    fn apply_setup_details(&mut self, field: SetupField, details: SetupDetails) {
        match (field, details) {
            (
                SetupField::Player,
                SetupDetails::Character {
                    name,
                    gender,
                    description,
                },
            ) => {
                self.setup.player_name = name;
                self.setup.player_gender = gender;
                self.setup.player_description = description;
            }
            (
                SetupField::Partner,
                SetupDetails::Character {
                    name,
                    gender,
                    description,
                },
            ) => {
                self.setup.partner_name = name;
                self.setup.partner_gender = gender;
                self.setup.partner_description = description;
            }
            (
                SetupField::World,
                SetupDetails::World {
                    world_view,
                    opening_plot,
                },
            ) => {
                self.setup.world_view = world_view;
                self.setup.opening_plot = opening_plot;
            }
            (field, _) => {
                log::warn!("setup details shape did not match requested field {field:?}");
            }
        }
    }

    // --- character management ----------------------------------------------

    pub fn add_character(&mut self, name: String, description: String) {
        if self.is_busy() {
            return;
        }
        let Some(scenario) = self.scenario.as_mut() else {
            return;
        };
        let character = SecondaryCharacter::new(name.clone(), description.clone());
        scenario.add_secondary_character(character);
        self.transcript.push(ChatMessage::system(format!(
            "A new character named \"{name}\" has appeared. Description: {description}"
        )));
        self.send_directive(format!(
            "{SYSTEM_DIRECTIVE_PREFIX} weave the new character \"{name}\"'s arrival \
             seamlessly into the story.]"
        ));
    }

    pub fn remove_character(&mut self, id: Uuid) {
        if self.is_busy() {
            return;
        }
        let Some(scenario) = self.scenario.as_mut() else {
            return;
        };
        let Some(removed) = scenario.remove_secondary_character(id) else {
            return;
        };
        self.transcript.push(ChatMessage::system(format!(
            "The character \"{}\" has left or disappeared.",
            removed.name
        )));
        self.send_directive(format!(
            "{SYSTEM_DIRECTIVE_PREFIX} reflect the absence of the character \"{}\" in \
             the story.]",
            removed.name
        ));
    }

    // --- persistence --------------------------------------------------------

    pub fn save_to_slot(&mut self, index: usize) {
        let Some(scenario) = &self.scenario else {
            return;
        };
        let data = SaveData {
            scenario: scenario.clone(),
            transcript: self.transcript.clone(),
            saved_at: Utc::now(),
        };
        if let Err(e) = self.save_manager.save(index, data) {
            self.transcript
                .push(ChatMessage::system(format!("Failed to save the story: {e}")));
        } else {
            self.state = AppState::InGame;
        }
    }

    pub fn load_slot(&mut self, index: usize) {
        let Some(data) = self.save_manager.slot(index).cloned() else {
            return;
        };
        let mut ai = self.make_ai(data.scenario.simulation);
        ai.start_session(&data.scenario, &data.transcript, &self.settings.language);

        self.scenario = Some(data.scenario);
        self.transcript = data.transcript;
        self.plot_choices.clear();
        self.inner_thoughts = None;
        self.ai = Some(ai);
        self.input.clear();
        self.scroll_offset = 0;
        self.state = AppState::InGame;
    }

    pub fn delete_slot(&mut self, index: usize) {
        if let Err(e) = self.save_manager.delete(index) {
            log::error!("failed to delete save slot {index}: {e}");
        }
    }

    // --- api key ------------------------------------------------------------

    fn submit_api_key(&mut self) {
        let key = self.api_key_input.trim().to_string();
        if key.is_empty() {
            return;
        }
        self.settings.api_key = Some(key.clone());
        if let Err(e) = self.settings.save() {
            log::error!("failed to save settings: {e}");
        }
        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let is_valid = Settings::validate_api_key(&key).await;
            let _ = events.send(AppEvent::ApiKeyValidated(is_valid));
        });
    }

    // --- key dispatch -------------------------------------------------------

    pub fn on_key(&mut self, key: KeyEvent) {
        match self.state {
            AppState::MainMenu => self.on_key_main_menu(key),
            AppState::Setup => self.on_key_setup(key),
            AppState::Loading => {}
            AppState::InGame => self.on_key_in_game(key),
            AppState::SaveMenu | AppState::LoadMenu => self.on_key_slots(key),
            AppState::CharacterManager => self.on_key_characters(key),
            AppState::ApiKeyInput => self.on_key_api_key(key),
        }
    }

    fn on_key_main_menu(&mut self, key: KeyEvent) {
        const ITEMS: usize = 4; // new story, load, api key, quit
        match key.code {
            KeyCode::Up => self.main_menu_index = self.main_menu_index.saturating_sub(1),
            KeyCode::Down => self.main_menu_index = (self.main_menu_index + 1).min(ITEMS - 1),
            KeyCode::Enter => match self.main_menu_index {
                0 => {
                    self.setup = SetupForm::default();
                    self.setup.simulation = self.settings.api_key.is_none();
                    self.state = AppState::Setup;
                }
                1 => {
                    self.slot_index = 0;
                    self.state = AppState::LoadMenu;
                }
                2 => {
                    self.api_key_input.clear();
                    self.state = AppState::ApiKeyInput;
                }
                _ => self.should_quit = true,
            },
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn on_key_setup(&mut self, key: KeyEvent) {
        if self.setup.editing {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.setup.editing = false,
                KeyCode::Backspace => {
                    let item = self.setup.selected_item();
                    if let Some(field) = self.setup.field_mut(item) {
                        field.pop();
                    }
                }
                KeyCode::Char(c) => {
                    let item = self.setup.selected_item();
                    if let Some(field) = self.setup.field_mut(item) {
                        field.push(c);
                    }
                }
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Up => self.setup.selected = self.setup.selected.saturating_sub(1),
            KeyCode::Down => {
                self.setup.selected = (self.setup.selected + 1).min(SETUP_ITEMS.len() - 1)
            }
            KeyCode::Enter => match self.setup.selected_item() {
                SetupItem::GeneratePlayer => self.request_setup_details(SetupField::Player),
                SetupItem::GeneratePartner => self.request_setup_details(SetupField::Partner),
                SetupItem::GenerateWorld => self.request_setup_details(SetupField::World),
                SetupItem::GenerateImage => self.request_scene_image(),
                SetupItem::ToggleQuality => {
                    self.setup.model_quality = match self.setup.model_quality {
                        ModelQuality::Fast => ModelQuality::High,
                        ModelQuality::High => ModelQuality::Fast,
                    }
                }
                SetupItem::ToggleSimulation => self.setup.simulation = !self.setup.simulation,
                SetupItem::Start => self.start_game(),
                _ => self.setup.editing = true,
            },
            KeyCode::Esc => self.state = AppState::MainMenu,
            _ => {}
        }
    }

    fn on_key_in_game(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('r') => self.rewind(),
                KeyCode::Char('p') => self.request_plot_choices(),
                KeyCode::Char('t') => {
                    self.show_thoughts = !self.show_thoughts;
                    if self.show_thoughts {
                        self.request_inner_thoughts();
                    } else {
                        self.inner_thoughts = None;
                    }
                }
                KeyCode::Char('n') => {
                    self.character_index = 0;
                    self.character_input = CharacterInput::None;
                    self.state = AppState::CharacterManager;
                }
                KeyCode::Char('s') => {
                    if !self.is_busy() {
                        self.slot_index = 0;
                        self.state = AppState::SaveMenu;
                    }
                }
                KeyCode::Char('o') => self.response_length = self.response_length.cycle(),
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                self.send_user_turn(text);
            }
            KeyCode::Tab => {
                self.turn_mode = match self.turn_mode {
                    TurnMode::Dialogue => TurnMode::Action,
                    TurnMode::Action => TurnMode::Dialogue,
                };
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_add(1),
            KeyCode::Down => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            KeyCode::Esc => self.reset_game(),
            KeyCode::Char(c @ '1') | KeyCode::Char(c @ '2')
                if self.input.is_empty() && !self.plot_choices.is_empty() =>
            {
                let index = (c as usize) - ('1' as usize);
                if let Some(choice) = self.plot_choices.get(index).cloned() {
                    self.send_user_turn(choice.description);
                }
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    fn on_key_slots(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.slot_index = self.slot_index.saturating_sub(1),
            KeyCode::Down => self.slot_index = (self.slot_index + 1).min(MAX_SAVES - 1),
            KeyCode::Enter => {
                if self.state == AppState::SaveMenu {
                    self.save_to_slot(self.slot_index);
                } else {
                    self.load_slot(self.slot_index);
                }
            }
            KeyCode::Char('d') => self.delete_slot(self.slot_index),
            KeyCode::Esc => {
                self.state = if self.scenario.is_some() {
                    AppState::InGame
                } else {
                    AppState::MainMenu
                };
            }
            _ => {}
        }
    }

    fn on_key_characters(&mut self, key: KeyEvent) {
        match std::mem::replace(&mut self.character_input, CharacterInput::None) {
            CharacterInput::None => match key.code {
                KeyCode::Char('a') => self.character_input = CharacterInput::Name(String::new()),
                KeyCode::Char('d') => {
                    if let Some(scenario) = &self.scenario {
                        if let Some(character) =
                            scenario.secondary_characters.get(self.character_index)
                        {
                            let id = character.id;
                            self.remove_character(id);
                            self.state = AppState::InGame;
                        }
                    }
                }
                KeyCode::Up => self.character_index = self.character_index.saturating_sub(1),
                KeyCode::Down => {
                    let count = self
                        .scenario
                        .as_ref()
                        .map(|s| s.secondary_characters.len())
                        .unwrap_or(0);
                    self.character_index = (self.character_index + 1).min(count.saturating_sub(1));
                }
                KeyCode::Esc => self.state = AppState::InGame,
                _ => {}
            },
            CharacterInput::Name(mut name) => match key.code {
                KeyCode::Enter if !name.trim().is_empty() => {
                    self.character_input = CharacterInput::Description {
                        name,
                        text: String::new(),
                    };
                }
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    name.pop();
                    self.character_input = CharacterInput::Name(name);
                }
                KeyCode::Char(c) => {
                    name.push(c);
                    self.character_input = CharacterInput::Name(name);
                }
                _ => self.character_input = CharacterInput::Name(name),
            },
            CharacterInput::Description { name, mut text } => match key.code {
                KeyCode::Enter if !text.trim().is_empty() => {
                    self.add_character(name, text);
                    self.state = AppState::InGame;
                }
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    text.pop();
                    self.character_input = CharacterInput::Description { name, text };
                }
                KeyCode::Char(c) => {
                    text.push(c);
                    self.character_input = CharacterInput::Description { name, text };
                }
                _ => self.character_input = CharacterInput::Description { name, text },
            },
        }
    }

    fn on_key_api_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_api_key(),
            KeyCode::Esc => self.state = AppState::MainMenu,
            KeyCode::Backspace => {
                self.api_key_input.pop();
            }
            KeyCode::Char(c) => self.api_key_input.push(c),
            _ => {}
        }
    }
}
