use crate::app::App;
use crate::app_state::AppState;
use ratatui::Frame;

use super::{api_key_input, character_manager, game, main_menu, setup, slots};

pub fn draw(f: &mut Frame, app: &App) {
    match app.state {
        AppState::MainMenu => main_menu::draw(f, app),
        AppState::Setup => setup::draw(f, app),
        AppState::Loading | AppState::InGame => game::draw(f, app),
        AppState::SaveMenu | AppState::LoadMenu => slots::draw(f, app),
        AppState::CharacterManager => character_manager::draw(f, app),
        AppState::ApiKeyInput => api_key_input::draw(f, app),
    }
}
