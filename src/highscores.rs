//! High score storage
//!
//! A single integer, persisted through the key-value store under its own
//! key. Read when a session is set up, written when a session ends above it.

use std::sync::Arc;

use crate::persistence::{KeyValueStore, PersistError};

/// High score store
#[derive(Clone)]
pub struct HighScoreStore {
    store: Arc<dyn KeyValueStore>,
}

impl HighScoreStore {
    /// Store key
    const STORAGE_KEY: &'static str = "high_score";

    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored high score, or 0 when there is none
    pub fn load(&self) -> u64 {
        match self.try_load() {
            Ok(Some(score)) => {
                log::info!("Loaded high score {score}");
                score
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("Ignoring unreadable high score: {e}");
                0
            }
        }
    }

    fn try_load(&self) -> Result<Option<u64>, PersistError> {
        match self.store.read(Self::STORAGE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, score: u64) -> Result<(), PersistError> {
        let json = serde_json::to_string(&score)?;
        self.store.write(Self::STORAGE_KEY, &json)?;
        log::info!("High score saved ({score})");
        Ok(())
    }
}
