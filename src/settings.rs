//! Engine settings
//!
//! Persisted separately from high scores through a [`KeyValueStore`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::StoreError;
use crate::persistence::{self, KeyValueStore};

/// Tunable engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timers ===
    /// Idle time before the hint is revealed
    pub hint_delay_ms: u32,
    /// Delay between deadlock detection and the shuffle
    pub shuffle_delay_ms: u32,

    // === Board generation ===
    /// Regeneration attempts for a clean starting board
    pub init_attempts: u32,
    /// Permutation attempts per shuffle
    pub shuffle_attempts: u32,

    // === Scoring ===
    /// Base points per cleared cell
    pub points_per_item: u64,

    // === Presentation ===
    /// Cell edge in pixels, used for drop and label coordinates
    pub cell_size: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hint_delay_ms: HINT_DELAY_MS,
            shuffle_delay_ms: SHUFFLE_DELAY_MS,
            init_attempts: INIT_ATTEMPTS,
            shuffle_attempts: SHUFFLE_ATTEMPTS,
            points_per_item: POINTS_PER_ITEM,
            cell_size: CELL_SIZE,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "settings";

    /// Load settings, falling back to defaults when missing or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring stored settings: {}", err);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        persistence::save(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.hint_delay_ms, 3000);
        assert_eq!(settings.shuffle_delay_ms, 1000);
        assert_eq!(settings.init_attempts, 10);
        assert_eq!(settings.points_per_item, 10);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            hint_delay_ms: 500,
            ..Default::default()
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"version":1,"data":{"cell_size":64.0}}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.cell_size, 64.0);
        assert_eq!(settings.hint_delay_ms, 3000);
    }

    #[test]
    fn test_corrupt_entry_falls_back() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "{broken").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
