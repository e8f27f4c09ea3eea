//! Board simulation module
//!
//! All gameplay rules live here. This module is pure and deterministic:
//! - Integer positions and values only
//! - Caller-supplied RNG and timestamps
//! - No rendering, network or platform dependencies

pub mod clock;
pub mod collision;
pub mod state;
pub mod tick;

pub use clock::GameClock;
pub use collision::{Collision, OpponentLink, balls_touch, detect_collision};
pub use state::{Ball, BoardState, random_value};
pub use tick::advance;
