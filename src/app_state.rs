// app_state.rs

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    MainMenu,
    Setup,
    /// Opening scene is streaming in; controls are locked.
    Loading,
    InGame,
    SaveMenu,
    LoadMenu,
    CharacterManager,
    ApiKeyInput,
}
