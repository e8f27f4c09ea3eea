//! Saved session snapshot

use serde::{Deserialize, Deserializer, Serialize};

use super::PersistError;
use super::store::KeyValueStore;
use crate::consts::{MARGIN_LEFT, MARGIN_RIGHT, MARGIN_TOP, QUEUE_CAPACITY, QUEUE_Y};
use crate::peer::RemoteStatus;
use crate::sim::Ball;

/// Store key for the suspended session
pub const SNAPSHOT_KEY: &str = "saved_game";

/// Option fields must still be present in the JSON (as `null` if empty)
fn required<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSnapshot {
    pub status: RemoteStatus,
    pub started: bool,
    pub user_id: String,
}

/// Everything needed to pick a session up where it was suspended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(deserialize_with = "required")]
    pub current: Option<Ball>,
    pub placed: Vec<Ball>,
    pub queue: Vec<Ball>,
    pub score: u64,
    pub is_game_over: bool,
    pub move_x: i32,
    pub move_y: i32,
    pub shooting: bool,
    pub last_x: i32,
    pub play_online: bool,
    #[serde(deserialize_with = "required")]
    pub peer: Option<PeerSnapshot>,
}

impl Snapshot {
    /// Reject snapshots that would resume into an inconsistent board
    pub fn validate(&self) -> Result<(), PersistError> {
        if self.current.is_none() {
            return Err(PersistError::Invalid("no current ball"));
        }
        if self.queue.len() != QUEUE_CAPACITY {
            return Err(PersistError::Invalid("queue is not full"));
        }
        if self.placed.iter().any(|b| b.value < 2)
            || self.queue.iter().chain(self.current.iter()).any(|b| b.value < 1)
        {
            return Err(PersistError::Invalid("ball value out of range"));
        }
        if !self.all_balls().all(on_board) || !(MARGIN_LEFT..=MARGIN_RIGHT).contains(&self.last_x) {
            return Err(PersistError::Invalid("ball outside the board"));
        }
        if self.play_online != self.peer.is_some() {
            return Err(PersistError::Invalid("online flag disagrees with peer state"));
        }
        Ok(())
    }

    fn all_balls(&self) -> impl Iterator<Item = &Ball> {
        self.placed.iter().chain(self.queue.iter()).chain(self.current.iter())
    }
}

/// Inside the side margins, between the top margin and the queue row
fn on_board(ball: &Ball) -> bool {
    (MARGIN_LEFT..=MARGIN_RIGHT).contains(&ball.pos.x) && (MARGIN_TOP..=QUEUE_Y).contains(&ball.pos.y)
}

pub fn save_snapshot(store: &dyn KeyValueStore, snapshot: &Snapshot) -> Result<(), PersistError> {
    let json = serde_json::to_string(snapshot)?;
    store.write(SNAPSHOT_KEY, &json)
}

/// `Ok(None)` when nothing was saved or the saved blob is empty
pub fn load_snapshot(store: &dyn KeyValueStore) -> Result<Option<Snapshot>, PersistError> {
    let Some(json) = store.read(SNAPSHOT_KEY)? else {
        return Ok(None);
    };
    if json.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&json)?))
}
