use async_openai::{Client, config::OpenAIConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Application data directory (settings, saves, logs, generated images).
pub fn data_dir() -> PathBuf {
    dir::home_dir()
        .expect("Failed to get home directory")
        .join("fabula")
        .join("data")
}

fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

// Application settings, stored as one JSON file in the data directory.
#[derive(Serialize, Deserialize, Clone)]
pub struct Settings {
    pub language: String,
    pub api_key: Option<String>,
    pub model: String,
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            language: "English".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            debug_mode: false,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from_file(&settings_path()).unwrap_or_default()
    }

    pub fn save(&self) -> io::Result<()> {
        self.save_to_file(&settings_path())
    }

    pub fn load_from_file(path: &std::path::Path) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Cheap liveness probe for a candidate API key.
    pub async fn validate_api_key(api_key: &str) -> bool {
        let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
        client.models().list().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let settings = Settings {
            language: "English".into(),
            api_key: Some("sk-test".into()),
            model: "gpt-4o-mini".into(),
            debug_mode: true,
        };
        settings.save_to_file(&path).expect("save");
        let loaded = Settings::load_from_file(&path).expect("load");
        assert_eq!(loaded.api_key.as_deref(), Some("sk-test"));
        assert!(loaded.debug_mode);
    }
}
