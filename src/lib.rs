pub mod ai;
pub mod app;
pub mod app_state;
pub mod cleanup;
pub mod error;
pub mod logging;
pub mod message;
pub mod prompt;
pub mod save;
pub mod scenario;
pub mod settings;
pub mod sim;
pub mod stream;
pub mod transcript;
pub mod ui;

// Re-export commonly used items for easier access
pub use ai::{StoryAi, StreamEvent};
pub use error::{AiError, AppError, classify_error};
pub use message::{ChatMessage, Sender};
pub use scenario::{PlotChoice, Scenario, SecondaryCharacter};
pub use stream::{SpeakerTagScanner, TurnAssembler};
pub use transcript::Transcript;
