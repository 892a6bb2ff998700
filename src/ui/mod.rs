// ui/mod.rs

mod api_key_input;
mod character_manager;
mod constants;
mod draw;
mod game;
mod main_menu;
mod setup;
mod slots;
pub mod spinner;
mod utils;

pub use draw::draw;
