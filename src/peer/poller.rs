//! Background poll task
//!
//! DESIGN
//! ======
//! A tokio task wakes on a short interval and asks the game whether a poll is
//! due. The request is built under the game lock, sent without it, and the
//! response applied under the lock again, so a slow server never stalls the
//! tick loop. Shutdown aborts the task and waits for it to finish, so no late
//! response can land after the peer channel is replaced.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::channel::Verdict;
use super::protocol::parse_response;
use super::transport::PeerTransport;
use crate::handle::lock_game;
use crate::session::Game;

/// How often the task checks whether a poll is due
pub const POLL_CHECK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Not due, not online, or nothing to send
    Skipped,
    /// Transport error or malformed response; nothing applied
    Failed,
    /// Response applied (`None` when the game dropped it as stale)
    Applied(Option<Verdict>),
}

/// One poll attempt against `game`
pub async fn poll_once(game: &Mutex<Game>, transport: &dyn PeerTransport) -> PollOutcome {
    let request = {
        let mut game = lock_game(game);
        match game.begin_poll(Instant::now()) {
            Some(request) => request,
            None => return PollOutcome::Skipped,
        }
    };

    let result = transport
        .exchange(&request)
        .await
        .and_then(|body| parse_response(&body));

    let mut game = lock_game(game);
    let outcome = match result {
        Ok(response) => {
            log::debug!("Peer response: {response:?}");
            PollOutcome::Applied(game.apply_peer_response(&request, response, Instant::now()))
        }
        Err(e) => {
            log::warn!("Peer poll failed: {e}");
            PollOutcome::Failed
        }
    };
    game.finish_poll(Instant::now());
    outcome
}

/// Handle to the running poll task
pub struct Poller {
    task: JoinHandle<()>,
}

impl Poller {
    pub fn spawn(game: Arc<Mutex<Game>>, transport: Arc<dyn PeerTransport>, check_every: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(check_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                poll_once(&game, transport.as_ref()).await;
            }
        });
        log::info!("Peer poller started");
        Self { task }
    }

    /// Cancel the task and wait until it is gone
    pub async fn shutdown(self) {
        self.task.abort();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                log::error!("Peer poller panicked: {e}");
            }
        }
        log::info!("Peer poller stopped");
    }
}
