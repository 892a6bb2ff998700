//! Slot-based persistence: a fixed array of five nullable slots serialized
//! as one JSON blob. Corrupted data is discarded for empty slots at load
//! time, never propagated as a crash.

use crate::scenario::Scenario;
use crate::settings::data_dir;
use crate::transcript::Transcript;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

pub const MAX_SAVES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub scenario: Scenario,
    pub transcript: Transcript,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SaveManager {
    path: PathBuf,
    pub slots: Vec<Option<SaveData>>,
}

impl Default for SaveManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveManager {
    pub fn new() -> Self {
        Self::with_path(data_dir().join("saves.json"))
    }

    pub fn with_path(path: PathBuf) -> Self {
        let slots = Self::load_slots(&path);
        Self { path, slots }
    }

    /// Loads all slots. A missing file, unparseable JSON, or a non-array
    /// shape all yield a fresh set of empty slots; individual slots that
    /// fail shape validation are dropped.
    fn load_slots(path: &std::path::Path) -> Vec<Option<SaveData>> {
        let mut slots = vec![None; MAX_SAVES];
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return slots,
        };
        let parsed: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("discarding corrupted save file: {e}");
                let _ = fs::remove_file(path);
                return slots;
            }
        };
        let Some(entries) = parsed.as_array() else {
            log::warn!("save file is not a slot array, discarding");
            let _ = fs::remove_file(path);
            return slots;
        };
        for (index, entry) in entries.iter().take(MAX_SAVES).enumerate() {
            if entry.is_null() {
                continue;
            }
            match serde_json::from_value::<SaveData>(entry.clone()) {
                Ok(data) => slots[index] = Some(data),
                Err(e) => log::warn!("dropping malformed save in slot {index}: {e}"),
            }
        }
        slots
    }

    pub fn has_any(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    pub fn slot(&self, index: usize) -> Option<&SaveData> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Saves into one slot. Out-of-range indexes are ignored.
    pub fn save(&mut self, index: usize, data: SaveData) -> io::Result<()> {
        if index >= MAX_SAVES {
            return Ok(());
        }
        self.slots[index] = Some(data);
        self.persist()
    }

    /// Clears one slot. Out-of-range indexes are ignored.
    pub fn delete(&mut self, index: usize) -> io::Result<()> {
        if index >= MAX_SAVES {
            return Ok(());
        }
        self.slots[index] = None;
        self.persist()
    }

    fn persist(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(&self.slots)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}
