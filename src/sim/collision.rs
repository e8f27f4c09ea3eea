//! Collision detection and the divide/merge rules
//!
//! The current ball is tested against the placed balls in board order; the
//! first one within touching distance is the only one resolved this step.
//! If the target is evenly divisible by the current ball it is divided,
//! otherwise the current ball absorbs the target's value and sticks.

use rand::Rng;

use super::state::{Ball, BoardState};
use crate::consts::*;

/// Where the current ball's scoring side effects go in two-player play
pub trait OpponentLink {
    /// Queue points earned locally for the opponent
    fn send_points(&mut self, points: u32);
    /// Next ball the opponent sent us, if any
    fn next_ball(&mut self) -> Option<Ball>;
}

/// Outcome of one collision step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Target divided by the current ball
    Divided {
        target: Ball,
        new_value: u32,
        points: u32,
        /// Target reached 1 and left the board
        solved: bool,
    },
    /// Current ball absorbed the target and was placed
    Merged { placed: Ball, game_over: bool },
    /// Current ball reached the top margin and was placed as-is
    Ceiling { placed: Ball },
}

/// True when two balls are within touching distance
#[inline]
pub fn balls_touch(a: &Ball, b: &Ball) -> bool {
    let dx = i64::from(a.pos.x - b.pos.x);
    let dy = i64::from(a.pos.y - b.pos.y);
    let reach = i64::from(BALL_DISTANCE);
    dx * dx + dy * dy <= reach * reach
}

/// Test the current ball against the board and resolve the first hit.
///
/// Returns `None` when nothing was hit; the current ball then drifts up one
/// step. Without a current ball this is a no-op.
pub fn detect_collision(
    board: &mut BoardState,
    rng: &mut impl Rng,
    mut link: Option<&mut (dyn OpponentLink + '_)>,
) -> Option<Collision> {
    let current = board.current?;

    if let Some(index) = board.placed.iter().position(|b| balls_touch(&current, b)) {
        let target = board.placed[index];

        if target.value % current.value == 0 {
            let new_value = target.value / current.value;
            let mut points = target.value - new_value;
            let solved = new_value == 1;
            if solved {
                board.placed.remove(index);
                points += 1;
            } else {
                board.placed[index].value = new_value;
            }
            board.score += u64::from(points);

            if let Some(link) = link.as_deref_mut() {
                link.send_points(points);
            }

            board.last_x = current.pos.x;
            let from_opponent = link.as_deref_mut().and_then(|l| l.next_ball());
            board.create_new_ball(rng, from_opponent);

            debug_assert!(board.placed.iter().all(|b| b.value > 1));
            return Some(Collision::Divided {
                target,
                new_value,
                points,
                solved,
            });
        }

        // Saturates so an oversized value still trips the limit below
        let placed = Ball {
            value: current.value.saturating_add(target.value),
            ..current
        };
        board.placed.push(placed);
        board.current = None;

        let game_over = placed.value > MAX_VALUE || placed.pos.y > BOTTOM_THRESHOLD_Y;
        if game_over {
            board.is_game_over = true;
        } else {
            board.last_x = current.pos.x;
            let from_opponent = link.as_deref_mut().and_then(|l| l.next_ball());
            board.create_new_ball(rng, from_opponent);
        }
        return Some(Collision::Merged { placed, game_over });
    }

    if current.pos.y <= MARGIN_TOP {
        board.placed.push(current);
        board.current = None;
        board.last_x = current.pos.x;
        let from_opponent = link.as_deref_mut().and_then(|l| l.next_ball());
        board.create_new_ball(rng, from_opponent);
        return Some(Collision::Ceiling { placed: current });
    }

    if let Some(ball) = board.current.as_mut() {
        ball.pos.y -= DRIFT_STEP;
    }
    None
}
