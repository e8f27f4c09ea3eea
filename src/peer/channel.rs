//! Per-match peer state
//!
//! Holds what the local game knows about the match: who we are, what the
//! server last said, points waiting to be announced and balls the opponent
//! sent. Delivery is best effort; a lost poll just means the next one
//! carries on from wherever the server is.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use glam::IVec2;

use super::protocol::{Payload, PeerRequest, PeerResponse, RemoteStatus};
use crate::consts::*;
use crate::sim::{Ball, OpponentLink};
use crate::slot_x;

/// What the session has to do after a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing changes for the board
    Continue,
    /// Opponent found; the board may start ticking
    Started,
    /// Terminal status before the match started; begin again
    Restart,
    Won,
    Lost,
}

#[derive(Debug, Clone)]
pub struct PeerSync {
    pub user_id: String,
    pub status: RemoteStatus,
    pub started: bool,
    /// Points earned locally, announced front first, one per poll
    pub outgoing: VecDeque<u32>,
    /// Balls from the opponent, used before the local queue
    pub incoming: VecDeque<Ball>,
    /// Set once a poll carrying `gameOver` has gone out
    pub game_over_announced: bool,
    last_poll: Instant,
    poll_period: Duration,
}

impl PeerSync {
    pub fn new(user_id: String, poll_period: Duration, now: Instant) -> Self {
        Self {
            user_id,
            status: RemoteStatus::Pending,
            started: false,
            outgoing: VecDeque::new(),
            incoming: VecDeque::new(),
            game_over_announced: false,
            last_poll: now,
            poll_period,
        }
    }

    /// Forget the current match and wait for a new one under a new id
    pub fn reset(&mut self, user_id: String, now: Instant) {
        *self = Self::new(user_id, self.poll_period, now);
    }

    /// Rebuild from a saved session
    pub fn restored(
        user_id: String,
        status: RemoteStatus,
        started: bool,
        poll_period: Duration,
        now: Instant,
    ) -> Self {
        Self {
            status,
            started,
            ..Self::new(user_id, poll_period, now)
        }
    }

    /// True once strictly more than one poll period has passed
    pub fn poll_due(&self, now: Instant) -> bool {
        now.checked_duration_since(self.last_poll)
            .is_some_and(|elapsed| elapsed > self.poll_period)
    }

    /// Record a finished attempt, whether or not it succeeded
    pub fn mark_polled(&mut self, now: Instant) {
        self.last_poll = now;
    }

    /// Build the next request, consuming at most one outgoing value
    pub fn next_request(&mut self, is_game_over: bool) -> PeerRequest {
        let payload = if is_game_over {
            self.game_over_announced = true;
            Payload::GameOver
        } else if let Some(points) = self.outgoing.pop_front() {
            Payload::Number(points)
        } else {
            Payload::Nothing
        };
        PeerRequest {
            user_id: self.user_id.clone(),
            payload,
        }
    }

    /// Apply a parsed response and say what it means for the session
    pub fn apply(&mut self, response: PeerResponse) -> Verdict {
        if let Some(status) = response.status {
            self.status = status;
        }

        let verdict = if !self.started {
            match self.status {
                RemoteStatus::InPlay => {
                    self.started = true;
                    Verdict::Started
                }
                status if status.is_terminal() => Verdict::Restart,
                _ => Verdict::Continue,
            }
        } else {
            match self.status {
                RemoteStatus::OpponentDisconnected | RemoteStatus::LocalWon => Verdict::Won,
                RemoteStatus::LocalLost => Verdict::Lost,
                _ => Verdict::Continue,
            }
        };

        if let Some(value) = response.ball_value {
            let slot = QUEUE_CAPACITY + self.incoming.len();
            self.incoming.push_back(Ball::in_slot(slot, value));
        }

        verdict
    }

    /// Opponent balls shown next to the queue
    pub fn incoming_preview(&self) -> impl Iterator<Item = &Ball> {
        self.incoming.iter().take(INCOMING_DISPLAY)
    }
}

impl OpponentLink for PeerSync {
    fn send_points(&mut self, points: u32) {
        self.outgoing.push_back(points);
    }

    fn next_ball(&mut self) -> Option<Ball> {
        let ball = self.incoming.pop_front()?;
        for (i, waiting) in self.incoming.iter_mut().enumerate() {
            waiting.pos = IVec2::new(slot_x(QUEUE_CAPACITY + i), QUEUE_Y);
        }
        Some(ball)
    }
}
