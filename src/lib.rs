//! Rising Numbers - A numeric bubble puzzle
//!
//! Core modules:
//! - `sim`: Board simulation (balls, collisions, queue, tick clock)
//! - `session`: Mode state machine and the game aggregate
//! - `peer`: Two-player synchronization by periodic polling
//! - `persistence`: Suspend/resume snapshots
//! - `handle`: Shared, lock-guarded access for driver, poller and input

pub mod handle;
pub mod highscores;
pub mod input;
pub mod peer;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;

pub use handle::GameHandle;
pub use highscores::HighScoreStore;
pub use session::{Game, Mode, RenderView};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Minimum time between simulation ticks (ms)
    pub const TICK_MILLIS: u64 = 20;
    /// Minimum time between peer polls (ms)
    pub const POLL_MILLIS: u64 = 2000;
    /// Clock anchor offset applied on unpause (ms)
    pub const RESUME_GRACE_MILLIS: u64 = 100;

    /// Board edges the current ball is clamped to
    pub const MARGIN_LEFT: i32 = 18;
    pub const MARGIN_RIGHT: i32 = 282;
    pub const MARGIN_TOP: i32 = 18;
    /// Merges below this line end the game
    pub const BOTTOM_THRESHOLD_Y: i32 = 260;

    /// Ball geometry
    pub const BALL_RADIUS: i32 = 15;
    pub const BALL_DISTANCE: i32 = BALL_RADIUS * 2;
    /// Upward drift per tick
    pub const DRIFT_STEP: i32 = 1;
    /// Sideways step per keyboard press
    pub const KEYBOARD_STEP: i32 = 12;

    /// Initial board layout (two rows)
    pub const BALLS_IN_ROW: usize = 6;
    pub const BALL_SPACING: i32 = 48;
    pub const QUEUE_LEFT_PAD: i32 = 12;

    /// Upcoming balls
    pub const QUEUE_CAPACITY: usize = 3;
    pub const QUEUE_Y: i32 = 282;
    /// New ball values are uniform in `2..=NEW_BALL_MAX + 1`
    pub const NEW_BALL_MAX: u32 = 25;

    /// A merged ball above this value ends the game
    pub const MAX_VALUE: u32 = 99;

    /// Opponent balls shown next to the queue
    pub const INCOMING_DISPLAY: usize = 3;
}

/// X of the `index`-th display slot, counted from the left edge of the queue
#[inline]
pub fn slot_x(index: usize) -> i32 {
    use consts::*;
    MARGIN_LEFT + QUEUE_LEFT_PAD + index as i32 * BALL_SPACING
}

/// Launch x used before the first shot (just right of the queue)
#[inline]
pub fn initial_launch_x() -> i32 {
    slot_x(consts::QUEUE_CAPACITY)
}
