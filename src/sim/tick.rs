//! One board advance
//!
//! Two policies, picked by the shooting flag:
//! - Drift: apply the pending move, clamp, test once, drift up a step.
//! - Launch: test repeatedly in the same tick until something is hit.

use glam::IVec2;
use rand::Rng;

use super::collision::{Collision, OpponentLink, detect_collision};
use super::state::BoardState;

/// Advance the board by one tick
///
/// The launch loop always terminates: every miss moves the ball one step
/// closer to the top margin, which counts as a hit.
pub fn advance(
    board: &mut BoardState,
    rng: &mut impl Rng,
    mut link: Option<&mut (dyn OpponentLink + '_)>,
) -> Option<Collision> {
    if !board.shooting {
        // Drag distances point the way the finger came from
        if let Some(ball) = board.current.as_mut() {
            let delta = board.pending_move;
            ball.pos = IVec2::new(ball.pos.x.saturating_sub(delta.x), ball.pos.y.saturating_sub(delta.y));
        }
        board.pending_move = IVec2::ZERO;
        board.clamp_current();
        return detect_collision(board, rng, link);
    }

    let mut hit = None;
    while hit.is_none() && board.current.is_some() {
        hit = detect_collision(board, rng, link.as_deref_mut());
    }
    board.shooting = false;
    hit
}
