//! Board state and core simulation types
//!
//! Everything that must survive a suspend/resume lives here.

use std::collections::VecDeque;

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{initial_launch_x, slot_x};

/// A numbered ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: IVec2,
    /// Always >= 1; a placed ball reaching 1 is solved and removed
    pub value: u32,
}

impl Ball {
    pub fn new(x: i32, y: i32, value: u32) -> Self {
        Self {
            pos: IVec2::new(x, y),
            value,
        }
    }

    /// Ball sitting in the `index`-th queue slot
    pub fn in_slot(index: usize, value: u32) -> Self {
        Self::new(slot_x(index), QUEUE_Y, value)
    }
}

/// Draw a value for a freshly generated ball
pub fn random_value(rng: &mut impl Rng) -> u32 {
    rng.random_range(2..=NEW_BALL_MAX + 1)
}

/// Complete board state
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    /// Balls stuck to the board
    pub placed: Vec<Ball>,
    /// Upcoming balls, left to right; the back is launched next
    pub queue: VecDeque<Ball>,
    /// Ball under player control
    pub current: Option<Ball>,
    pub score: u64,
    pub high_score: u64,
    /// X the next current ball is launched from
    pub last_x: i32,
    /// Pending drag delta, consumed by the next drift tick
    pub pending_move: IVec2,
    /// Fire requested; the next tick resolves the shot
    pub shooting: bool,
    /// Set by a losing merge or a peer verdict, acted on by the next tick
    pub is_game_over: bool,
    pub is_game_won: bool,
}

impl BoardState {
    /// Fresh board: two random rows, a full queue and a current ball
    pub fn new(rng: &mut impl Rng, high_score: u64) -> Self {
        let mut placed = Vec::with_capacity(BALLS_IN_ROW * 2);
        for row_y in [MARGIN_TOP, MARGIN_TOP + BALL_DISTANCE] {
            for i in 0..BALLS_IN_ROW {
                placed.push(Ball::new(slot_x(i), row_y, random_value(rng)));
            }
        }

        let queue = (0..QUEUE_CAPACITY)
            .map(|i| Ball::in_slot(i, random_value(rng)))
            .collect();

        let mut board = Self {
            placed,
            queue,
            current: None,
            score: 0,
            high_score,
            last_x: initial_launch_x(),
            pending_move: IVec2::ZERO,
            shooting: false,
            is_game_over: false,
            is_game_won: false,
        };
        board.create_new_ball(rng, None);
        board
    }

    /// Replace the current ball.
    ///
    /// An opponent ball, when given, is used as-is and the local queue is
    /// left alone. Otherwise the back of the queue is launched, a new random
    /// ball enters at the front and every queued ball snaps to its slot.
    pub fn create_new_ball(&mut self, rng: &mut impl Rng, from_opponent: Option<Ball>) {
        let mut next = match from_opponent {
            Some(ball) => ball,
            None => {
                let launched = self.queue.pop_back();
                self.queue.push_front(Ball::in_slot(0, random_value(rng)));
                for (i, ball) in self.queue.iter_mut().enumerate() {
                    ball.pos = IVec2::new(slot_x(i), QUEUE_Y);
                }
                debug_assert_eq!(self.queue.len(), QUEUE_CAPACITY);
                // The queue is never empty outside of a corrupt restore
                launched.unwrap_or_else(|| Ball::in_slot(QUEUE_CAPACITY, random_value(rng)))
            }
        };
        next.pos = IVec2::new(self.last_x, QUEUE_Y);
        self.current = Some(next);
    }

    /// Clamp the current ball inside the side and top margins; it never
    /// sinks below the queue row it was launched from
    pub fn clamp_current(&mut self) {
        if let Some(ball) = self.current.as_mut() {
            ball.pos.x = ball.pos.x.clamp(MARGIN_LEFT, MARGIN_RIGHT);
            ball.pos.y = ball.pos.y.clamp(MARGIN_TOP, QUEUE_Y);
        }
    }

    /// Shift the current ball sideways (keyboard), staying inside the margins
    pub fn nudge_current(&mut self, dx: i32) {
        if let Some(ball) = self.current.as_mut() {
            ball.pos.x = (ball.pos.x + dx).clamp(MARGIN_LEFT, MARGIN_RIGHT);
        }
    }

    /// Structural invariants; used by tests and snapshot validation
    pub fn is_consistent(&self) -> bool {
        self.queue.len() == QUEUE_CAPACITY
            && self.placed.iter().all(|b| b.value > 1)
            && self.queue.iter().all(|b| b.value >= 1)
            && self.current.is_none_or(|b| b.value >= 1)
    }
}
