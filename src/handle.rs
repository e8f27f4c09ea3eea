//! Shared game handle
//!
//! DESIGN
//! ======
//! The tick loop, the peer poller and input callbacks all mutate one `Game`.
//! It lives behind a single `Mutex`, and every operation takes that lock for
//! its whole duration so a tick, a command and a poll response never
//! interleave. Disk writes (high score, suspend snapshot) happen after the
//! lock is released so they never stall the tick loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::highscores::HighScoreStore;
use crate::input::Key;
use crate::peer::{POLL_CHECK_INTERVAL, PeerTransport, Poller};
use crate::persistence::{KeyValueStore, PersistError, load_snapshot, save_snapshot};
use crate::session::{Game, RenderView, TickOutcome};
use crate::settings::Settings;

/// Lock the game, recovering from a poisoned lock
pub(crate) fn lock_game(game: &Mutex<Game>) -> MutexGuard<'_, Game> {
    game.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct GameHandle {
    game: Arc<Mutex<Game>>,
    store: Arc<dyn KeyValueStore>,
    high_scores: HighScoreStore,
    transport: Arc<dyn PeerTransport>,
    poller: Option<Poller>,
    poll_check: Duration,
}

impl GameHandle {
    /// Single-player game, running, with the stored high score
    pub fn new(settings: &Settings, store: Arc<dyn KeyValueStore>, transport: Arc<dyn PeerTransport>) -> Self {
        let high_scores = HighScoreStore::new(store.clone());
        let game = Game::new(settings, high_scores.load(), Instant::now());
        Self {
            game: Arc::new(Mutex::new(game)),
            store,
            high_scores,
            transport,
            poller: None,
            poll_check: POLL_CHECK_INTERVAL,
        }
    }

    /// Override how often the poller checks for a due poll
    pub fn with_poll_check(mut self, every: Duration) -> Self {
        self.poll_check = every;
        self
    }

    pub fn game(&self) -> Arc<Mutex<Game>> {
        self.game.clone()
    }

    /// Run `f` under the game lock
    pub fn with<R>(&self, f: impl FnOnce(&mut Game) -> R) -> R {
        f(&mut lock_game(&self.game))
    }

    pub fn view(&self) -> RenderView {
        self.with(|g| g.view())
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    // === Commands ===

    pub fn tick(&self, now: Instant) -> TickOutcome {
        let outcome = self.with(|g| g.tick(now));
        if let TickOutcome::Ended {
            new_high_score: Some(score),
            ..
        } = outcome
        {
            if let Err(e) = self.high_scores.save(score) {
                log::warn!("Failed to save high score: {e}");
            }
        }
        outcome
    }

    pub fn key(&self, key: Key) -> bool {
        self.with(|g| g.key(key, Instant::now()))
    }

    pub fn tap(&self) {
        self.with(|g| g.tap(Instant::now()));
    }

    pub fn drag_scroll(&self, dx: i32, dy: i32) {
        self.with(|g| g.drag_scroll(dx, dy));
    }

    pub fn start(&self) {
        self.with(|g| g.start(Instant::now()));
    }

    pub fn pause(&self) -> bool {
        self.with(|g| g.pause())
    }

    pub fn resume(&self) -> bool {
        self.with(|g| g.resume(Instant::now()))
    }

    /// Menu "new game". The old poller is stopped before the peer channel is
    /// replaced; a new one starts for two-player games.
    pub async fn new_game(&mut self, online: bool) {
        self.stop_poller().await;
        self.with(|g| g.new_game(online, Instant::now()));
        if online {
            self.start_poller();
        }
    }

    // === Suspend/resume ===

    /// Save the session for a later `resume_saved`
    pub fn suspend(&self) -> Result<(), PersistError> {
        let snapshot = self.with(|g| g.snapshot());
        save_snapshot(self.store.as_ref(), &snapshot)?;
        log::info!("Game saved");
        Ok(())
    }

    /// Pick up a suspended session. Returns whether one was restored.
    ///
    /// Nothing saved, or a saved game without a current ball, leaves the
    /// running game alone. A corrupt or inconsistent save is discarded and a
    /// fresh single-player game starts instead.
    pub async fn resume_saved(&mut self) -> bool {
        let snapshot = match load_snapshot(self.store.as_ref()) {
            Ok(Some(snapshot)) if snapshot.current.is_some() => snapshot,
            Ok(_) => {
                log::info!("No saved game to restore");
                return false;
            }
            Err(e) => {
                log::warn!("Discarding saved game: {e}");
                self.new_game(false).await;
                return false;
            }
        };

        self.stop_poller().await;
        let online = snapshot.play_online;
        match self.with(|g| g.restore(snapshot, Instant::now())) {
            Ok(()) => {
                if online {
                    self.start_poller();
                }
                true
            }
            Err(e) => {
                log::warn!("Discarding saved game: {e}");
                self.new_game(false).await;
                false
            }
        }
    }

    // === Loops ===

    /// Drive ticks until `should_run` clears, handing each frame's view to
    /// `on_frame`
    pub async fn run(&self, should_run: &AtomicBool, frame: Duration, mut on_frame: impl FnMut(&RenderView, TickOutcome)) {
        while should_run.load(Ordering::Relaxed) {
            let outcome = self.tick(Instant::now());
            on_frame(&self.view(), outcome);
            tokio::time::sleep(frame).await;
        }
    }

    fn start_poller(&mut self) {
        self.poller = Some(Poller::spawn(self.game.clone(), self.transport.clone(), self.poll_check));
    }

    async fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.shutdown().await;
        }
    }

    /// Stop background work; call before dropping the handle
    pub async fn shutdown(&mut self) {
        self.stop_poller().await;
    }
}
