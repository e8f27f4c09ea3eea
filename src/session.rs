//! Session mode state machine and the game aggregate
//!
//! `Game` owns everything a tick, an input command or a poll response may
//! touch: the board, the mode, the tick clock, the optional peer channel and
//! the RNG. Callers share it behind a single lock (see `handle`).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::input::{Key, clamp_drag};
use crate::peer::{PeerRequest, PeerResponse, PeerSync, Verdict};
use crate::persistence::{PeerSnapshot, PersistError, Snapshot};
use crate::settings::Settings;
use crate::sim::{Ball, BoardState, Collision, GameClock, OpponentLink, advance};

/// Session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Running,
    Paused,
    /// Lost, or single-player game over
    Over,
    /// Won a two-player match
    Won,
}

impl Mode {
    pub fn is_over(self) -> bool {
        matches!(self, Mode::Over | Mode::Won)
    }
}

/// Result of one driver tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or too soon since the last tick
    Idle,
    /// Two-player match not started yet
    WaitingForOpponent,
    /// Board advanced, possibly resolving a collision
    Advanced(Option<Collision>),
    /// Game over observed; the session stopped
    Ended {
        won: bool,
        /// Set when the final score beat the stored high score
        new_high_score: Option<u64>,
    },
}

/// Read-only view for the renderer, taken once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderView {
    pub placed: Vec<Ball>,
    pub queue: Vec<Ball>,
    pub current: Option<Ball>,
    pub score: u64,
    pub high_score: u64,
    pub mode: Mode,
    pub online: bool,
    pub waiting_for_opponent: bool,
    /// First few opponent balls, shown right of the queue
    pub incoming: Vec<Ball>,
}

pub struct Game {
    board: BoardState,
    mode: Mode,
    clock: GameClock,
    peer: Option<PeerSync>,
    rng: Pcg32,
    poll_period: Duration,
}

impl Game {
    /// Fresh single-player game, already running
    pub fn new(settings: &Settings, high_score: u64, now: Instant) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = BoardState::new(&mut rng, high_score);
        log::info!("Game initialized with seed: {seed}");

        Self {
            board,
            mode: Mode::Running,
            clock: GameClock::new(settings.tick_period(), settings.resume_grace(), now),
            peer: None,
            rng,
            poll_period: settings.poll_period(),
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn peer(&self) -> Option<&PeerSync> {
        self.peer.as_ref()
    }

    pub fn is_online(&self) -> bool {
        self.peer.is_some()
    }

    fn new_user_id(&mut self) -> String {
        self.rng.random::<u64>().to_string()
    }

    /// New board and, in two-player play, a new match identity
    fn reset(&mut self, now: Instant) {
        let high_score = self.board.high_score;
        self.board = BoardState::new(&mut self.rng, high_score);
        if self.peer.is_some() {
            let user_id = self.new_user_id();
            if let Some(peer) = self.peer.as_mut() {
                peer.reset(user_id, now);
            }
        }
    }

    // === Mode transitions ===

    /// Start playing. Resumes a paused game as-is; otherwise begins a new one.
    pub fn start(&mut self, now: Instant) {
        if self.mode != Mode::Paused {
            self.reset(now);
            log::info!("Started new game");
        }
        if let Some(peer) = self.peer.as_mut() {
            peer.mark_polled(now);
        }
        self.clock.mark(now);
        self.mode = Mode::Running;
    }

    /// Menu "new game": always a fresh board, attaching a peer channel when
    /// `online` and dropping any existing one otherwise
    pub fn new_game(&mut self, online: bool, now: Instant) {
        self.peer = if online {
            let user_id = self.new_user_id();
            Some(PeerSync::new(user_id, self.poll_period, now))
        } else {
            None
        };
        self.mode = Mode::Running;
        let high_score = self.board.high_score;
        self.board = BoardState::new(&mut self.rng, high_score);
        self.clock.mark(now);
        log::info!("Started new {} game", if online { "two-player" } else { "single-player" });
    }

    pub fn pause(&mut self) -> bool {
        if self.mode != Mode::Running {
            return false;
        }
        self.mode = Mode::Paused;
        log::info!("Paused");
        true
    }

    /// Window focus lost
    pub fn focus_lost(&mut self) -> bool {
        self.pause()
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        if self.mode != Mode::Paused {
            return false;
        }
        self.clock.resume(now);
        self.mode = Mode::Running;
        log::info!("Resumed");
        true
    }

    pub fn stop(&mut self) -> bool {
        if self.mode != Mode::Running {
            return false;
        }
        self.mode = if self.board.is_game_won { Mode::Won } else { Mode::Over };
        log::info!("Game over ({:?}), score {}", self.mode, self.board.score);
        true
    }

    // === Input ===

    pub fn set_move(&mut self, dx: i32, dy: i32) {
        self.board.pending_move = IVec2::new(dx, dy);
    }

    pub fn set_shooting(&mut self, shooting: bool) {
        self.board.shooting = shooting;
    }

    /// Keyboard command. Any key starts a new game when over and resumes when
    /// paused. Returns whether the key was handled.
    pub fn key(&mut self, key: Key, now: Instant) -> bool {
        match self.mode {
            Mode::Running => match key {
                Key::Fire => {
                    self.board.shooting = true;
                    true
                }
                Key::Left => {
                    self.board.nudge_current(-KEYBOARD_STEP);
                    true
                }
                Key::Right => {
                    self.board.nudge_current(KEYBOARD_STEP);
                    true
                }
                Key::Up => self.pause(),
                Key::Other => false,
            },
            Mode::Paused => self.resume(now),
            Mode::Over | Mode::Won => {
                self.start(now);
                true
            }
        }
    }

    /// Single tap: resume or restart first if needed, then fire
    pub fn tap(&mut self, now: Instant) {
        match self.mode {
            Mode::Running => {}
            Mode::Paused => {
                self.resume(now);
            }
            Mode::Over | Mode::Won => self.start(now),
        }
        self.board.shooting = true;
    }

    /// Drag distances; the ball is never pushed down
    pub fn drag_scroll(&mut self, dx: i32, dy: i32) {
        let delta = clamp_drag(dx, dy);
        self.set_move(delta.x, delta.y);
    }

    // === Simulation ===

    /// Driver tick; rate limited by the game clock
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.mode != Mode::Running {
            return TickOutcome::Idle;
        }
        if self.peer.as_ref().is_some_and(|p| !p.started) {
            return TickOutcome::WaitingForOpponent;
        }

        if self.board.is_game_over {
            let won = self.board.is_game_won;
            self.stop();
            let mut new_high_score = None;
            if self.board.score > self.board.high_score {
                self.board.high_score = self.board.score;
                new_high_score = Some(self.board.score);
                log::info!("New high score: {}", self.board.score);
            }
            return TickOutcome::Ended { won, new_high_score };
        }

        if !self.clock.ready(now) {
            return TickOutcome::Idle;
        }

        let link = self.peer.as_mut().map(|p| p as &mut dyn OpponentLink);
        let hit = advance(&mut self.board, &mut self.rng, link);
        self.clock.mark(now);
        TickOutcome::Advanced(hit)
    }

    // === Peer polling ===

    /// Request to send now, if a poll is due. Polls go out while running,
    /// plus one final `gameOver` report after the game ends.
    pub fn begin_poll(&mut self, now: Instant) -> Option<PeerRequest> {
        let is_game_over = self.board.is_game_over;
        let running = self.mode == Mode::Running;
        let peer = self.peer.as_mut()?;
        if !peer.poll_due(now) {
            return None;
        }
        let final_report = is_game_over && !peer.game_over_announced;
        if !running && !final_report {
            return None;
        }
        Some(peer.next_request(is_game_over))
    }

    /// Close a poll attempt, successful or not
    pub fn finish_poll(&mut self, now: Instant) {
        if let Some(peer) = self.peer.as_mut() {
            peer.mark_polled(now);
        }
    }

    /// Apply a response to `request`. Responses for an older match identity,
    /// or arriving after the game ended, are dropped.
    pub fn apply_peer_response(
        &mut self,
        request: &PeerRequest,
        response: PeerResponse,
        now: Instant,
    ) -> Option<Verdict> {
        if self.mode.is_over() {
            return None;
        }
        let peer = self.peer.as_mut()?;
        if peer.user_id != request.user_id {
            log::debug!("Dropping response for previous match {}", request.user_id);
            return None;
        }

        let verdict = peer.apply(response);
        match verdict {
            Verdict::Continue => {}
            Verdict::Started => log::info!("Opponent found, match started"),
            Verdict::Restart => {
                log::warn!("Match ended before it started, restarting");
                self.reset(now);
                self.clock.mark(now);
            }
            Verdict::Won | Verdict::Lost => {
                if !self.board.is_game_over {
                    self.board.is_game_over = true;
                    self.board.is_game_won = verdict == Verdict::Won;
                }
            }
        }
        Some(verdict)
    }

    // === Rendering ===

    pub fn view(&self) -> RenderView {
        RenderView {
            placed: self.board.placed.clone(),
            queue: self.board.queue.iter().copied().collect(),
            current: self.board.current,
            score: self.board.score,
            high_score: self.board.high_score,
            mode: self.mode,
            online: self.peer.is_some(),
            waiting_for_opponent: self.peer.as_ref().is_some_and(|p| !p.started),
            incoming: self
                .peer
                .as_ref()
                .map(|p| p.incoming_preview().copied().collect())
                .unwrap_or_default(),
        }
    }

    // === Suspend/resume ===

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current: self.board.current,
            placed: self.board.placed.clone(),
            queue: self.board.queue.iter().copied().collect(),
            score: self.board.score,
            is_game_over: self.board.is_game_over,
            move_x: self.board.pending_move.x,
            move_y: self.board.pending_move.y,
            shooting: self.board.shooting,
            last_x: self.board.last_x,
            play_online: self.peer.is_some(),
            peer: self.peer.as_ref().map(|p| PeerSnapshot {
                status: p.status,
                started: p.started,
                user_id: p.user_id.clone(),
            }),
        }
    }

    /// Replace the session with a saved one. Nothing changes on error.
    pub fn restore(&mut self, snapshot: Snapshot, now: Instant) -> Result<(), PersistError> {
        snapshot.validate()?;

        self.board = BoardState {
            placed: snapshot.placed,
            queue: VecDeque::from(snapshot.queue),
            current: snapshot.current,
            score: snapshot.score,
            high_score: self.board.high_score,
            last_x: snapshot.last_x,
            pending_move: IVec2::new(snapshot.move_x, snapshot.move_y),
            shooting: snapshot.shooting,
            is_game_over: snapshot.is_game_over,
            is_game_won: false,
        };
        self.peer = snapshot.peer.map(|p| {
            PeerSync::restored(p.user_id, p.status, p.started, self.poll_period, now)
        });
        self.mode = Mode::Running;
        self.clock.resume(now);
        log::info!("Restored saved game, score {}", self.board.score);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut BoardState {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn peer_mut(&mut self) -> Option<&mut PeerSync> {
        self.peer.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::{Payload, RemoteStatus};
    use crate::slot_x;
    use proptest::prelude::*;

    fn settings() -> Settings {
        Settings {
            seed: Some(12345),
            ..Settings::default()
        }
    }

    fn game(now: Instant) -> Game {
        Game::new(&settings(), 0, now)
    }

    /// Past the tick period
    fn later(now: Instant) -> Instant {
        now + Duration::from_millis(TICK_MILLIS + 1)
    }

    #[test]
    fn test_new_game_is_running() {
        let t0 = Instant::now();
        let game = game(t0);
        assert_eq!(game.mode(), Mode::Running);
        assert!(!game.is_online());
        assert!(game.board().current.is_some());
    }

    #[test]
    fn test_pause_resume_keeps_board_and_adds_grace() {
        let t0 = Instant::now();
        let mut game = game(t0);
        let board_before = game.board().clone();

        assert!(game.pause());
        assert!(!game.pause());
        assert_eq!(game.mode(), Mode::Paused);

        let t1 = t0 + Duration::from_secs(300);
        assert_eq!(game.tick(t1), TickOutcome::Idle);
        assert!(game.resume(t1));
        assert_eq!(game.mode(), Mode::Running);
        assert_eq!(game.clock().anchor(), t1 + Duration::from_millis(RESUME_GRACE_MILLIS));
        assert_eq!(game.board(), &board_before);

        // No catch-up: still idle until grace plus one period passes
        assert_eq!(game.tick(later(t1)), TickOutcome::Idle);
    }

    #[test]
    fn test_resume_only_from_paused() {
        let t0 = Instant::now();
        let mut game = game(t0);
        assert!(!game.resume(t0));
        assert_eq!(game.clock().anchor(), t0);
    }

    #[test]
    fn test_start_from_paused_does_not_reset() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.board_mut().score = 55;
        game.pause();

        game.start(t0);

        assert_eq!(game.mode(), Mode::Running);
        assert_eq!(game.board().score, 55);
    }

    #[test]
    fn test_start_from_over_resets() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.board_mut().score = 55;
        assert!(game.stop());
        assert!(!game.stop());
        assert_eq!(game.mode(), Mode::Over);

        game.start(t0);

        assert_eq!(game.mode(), Mode::Running);
        assert_eq!(game.board().score, 0);
    }

    #[test]
    fn test_keys_by_mode() {
        let t0 = Instant::now();
        let mut game = game(t0);
        let x = game.board().current.map(|b| b.pos.x).expect("current");

        assert!(game.key(Key::Left, t0));
        assert_eq!(game.board().current.map(|b| b.pos.x), Some(x - KEYBOARD_STEP));
        assert!(game.key(Key::Right, t0));
        assert_eq!(game.board().current.map(|b| b.pos.x), Some(x));
        assert!(!game.key(Key::Other, t0));
        assert!(game.key(Key::Fire, t0));
        assert!(game.board().shooting);

        assert!(game.key(Key::Up, t0));
        assert_eq!(game.mode(), Mode::Paused);
        assert!(game.key(Key::Other, t0));
        assert_eq!(game.mode(), Mode::Running);

        game.stop();
        assert!(game.key(Key::Left, t0));
        assert_eq!(game.mode(), Mode::Running);
        assert_eq!(game.board().score, 0);
    }

    #[test]
    fn test_tap_fires_and_drag_never_pushes_down() {
        let t0 = Instant::now();
        let mut game = game(t0);

        game.drag_scroll(7, -20);
        assert_eq!(game.board().pending_move, IVec2::new(7, 0));

        game.tap(t0);
        assert!(game.board().shooting);
    }

    #[test]
    fn test_tap_resumes_or_restarts_then_fires() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.board_mut().score = 40;

        game.pause();
        game.tap(t0);
        assert_eq!(game.mode(), Mode::Running);
        assert_eq!(game.board().score, 40);
        assert!(game.board().shooting);

        game.stop();
        game.tap(t0);
        assert_eq!(game.mode(), Mode::Running);
        assert_eq!(game.board().score, 0);
        assert!(game.board().shooting);
    }

    #[test]
    fn test_tick_is_rate_limited() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.board_mut().placed.clear();
        game.board_mut().current = Some(Ball::new(100, 200, 3));

        assert_eq!(game.tick(t0 + Duration::from_millis(TICK_MILLIS)), TickOutcome::Idle);
        let t1 = later(t0);
        assert_eq!(game.tick(t1), TickOutcome::Advanced(None));
        assert_eq!(game.board().current.map(|b| b.pos.y), Some(199));
        assert_eq!(game.tick(t1 + Duration::from_millis(1)), TickOutcome::Idle);
        // A long stall still yields a single step
        assert_eq!(game.tick(t1 + Duration::from_secs(5)), TickOutcome::Advanced(None));
        assert_eq!(game.board().current.map(|b| b.pos.y), Some(198));
    }

    #[test]
    fn test_game_over_takes_effect_next_tick() {
        let t0 = Instant::now();
        let mut game = game(t0);
        let board = game.board_mut();
        board.placed = vec![Ball::new(100, 170, 90)];
        board.current = Some(Ball::new(100, 200, 13));
        board.score = 10;

        let t1 = later(t0);
        let outcome = game.tick(t1);
        assert!(matches!(
            outcome,
            TickOutcome::Advanced(Some(Collision::Merged { game_over: true, .. }))
        ));
        assert!(game.board().is_game_over);
        assert_eq!(game.mode(), Mode::Running);

        // Observed immediately, without waiting for the clock
        let outcome = game.tick(t1);
        assert_eq!(outcome, TickOutcome::Ended { won: false, new_high_score: Some(10) });
        assert_eq!(game.mode(), Mode::Over);
        assert_eq!(game.board().high_score, 10);
    }

    #[test]
    fn test_game_over_without_new_high_score() {
        let t0 = Instant::now();
        let mut game = Game::new(&settings(), 500, t0);
        game.board_mut().is_game_over = true;

        assert_eq!(game.tick(t0), TickOutcome::Ended { won: false, new_high_score: None });
        assert_eq!(game.board().high_score, 500);
    }

    fn online_game(now: Instant) -> Game {
        let mut game = game(now);
        game.new_game(true, now);
        game
    }

    fn poll_now(game: &mut Game, now: Instant) -> PeerRequest {
        game.begin_poll(now + Duration::from_millis(POLL_MILLIS + 1))
            .expect("poll due")
    }

    fn respond(status: RemoteStatus, ball_value: Option<u32>) -> PeerResponse {
        PeerResponse {
            status: Some(status),
            ball_value,
        }
    }

    #[test]
    fn test_online_waits_for_opponent() {
        let t0 = Instant::now();
        let mut game = online_game(t0);

        assert_eq!(game.tick(later(t0)), TickOutcome::WaitingForOpponent);
        assert!(game.view().waiting_for_opponent);

        let request = poll_now(&mut game, t0);
        let verdict = game.apply_peer_response(&request, respond(RemoteStatus::InPlay, Some(15)), t0);

        assert_eq!(verdict, Some(Verdict::Started));
        let view = game.view();
        assert!(!view.waiting_for_opponent);
        assert_eq!(view.incoming, vec![Ball::in_slot(QUEUE_CAPACITY, 15)]);
        assert!(matches!(game.tick(later(t0)), TickOutcome::Advanced(_)));
    }

    #[test]
    fn test_poll_interval_and_payload() {
        let t0 = Instant::now();
        let mut game = online_game(t0);

        assert_eq!(game.begin_poll(t0 + Duration::from_millis(POLL_MILLIS)), None);

        game.peer_mut().expect("online").send_points(16);
        let request = poll_now(&mut game, t0);
        assert_eq!(request.payload, Payload::Number(16));
        assert_eq!(request.user_id, game.peer().expect("online").user_id);
    }

    #[test]
    fn test_divide_in_online_play_announces_points() {
        let t0 = Instant::now();
        let mut game = online_game(t0);
        let request = poll_now(&mut game, t0);
        game.apply_peer_response(&request, respond(RemoteStatus::InPlay, None), t0);

        let board = game.board_mut();
        board.placed = vec![Ball::new(100, 170, 20)];
        board.current = Some(Ball::new(100, 200, 5));
        game.tick(later(t0));

        assert_eq!(game.peer().expect("online").outgoing, VecDeque::from([16]));
        assert_eq!(game.board().score, 16);
    }

    #[test]
    fn test_remote_verdicts_end_session() {
        let t0 = Instant::now();
        let mut game = online_game(t0);
        let request = poll_now(&mut game, t0);
        game.apply_peer_response(&request, respond(RemoteStatus::InPlay, None), t0);
        game.apply_peer_response(&request, respond(RemoteStatus::OpponentDisconnected, None), t0);

        assert!(game.board().is_game_over);
        assert_eq!(game.tick(t0), TickOutcome::Ended { won: true, new_high_score: None });
        assert_eq!(game.mode(), Mode::Won);

        // Final report goes out once, then polling stops
        let request = poll_now(&mut game, t0);
        assert_eq!(request.payload, Payload::GameOver);
        let t1 = t0 + Duration::from_secs(10);
        game.finish_poll(t1);
        assert_eq!(game.begin_poll(t1 + Duration::from_secs(10)), None);

        // Late responses no longer change anything
        assert_eq!(
            game.apply_peer_response(&request, respond(RemoteStatus::LocalLost, None), t1),
            None
        );
    }

    #[test]
    fn test_local_lost_verdict() {
        let t0 = Instant::now();
        let mut game = online_game(t0);
        let request = poll_now(&mut game, t0);
        game.apply_peer_response(&request, respond(RemoteStatus::InPlay, None), t0);
        game.apply_peer_response(&request, respond(RemoteStatus::LocalLost, None), t0);

        assert_eq!(game.tick(t0), TickOutcome::Ended { won: false, new_high_score: None });
        assert_eq!(game.mode(), Mode::Over);
    }

    #[test]
    fn test_anomalous_status_restarts_with_new_identity() {
        let t0 = Instant::now();
        let mut game = online_game(t0);
        let old_id = game.peer().expect("online").user_id.clone();
        game.board_mut().score = 30;

        let request = poll_now(&mut game, t0);
        let verdict = game.apply_peer_response(&request, respond(RemoteStatus::LocalWon, None), t0);

        assert_eq!(verdict, Some(Verdict::Restart));
        assert_eq!(game.board().score, 0);
        let peer = game.peer().expect("still online");
        assert_ne!(peer.user_id, old_id);
        assert_eq!(peer.status, RemoteStatus::Pending);

        // A response addressed to the old identity is stale
        assert_eq!(
            game.apply_peer_response(&request, respond(RemoteStatus::InPlay, None), t0),
            None
        );
        assert!(!game.peer().expect("online").started);
    }

    #[test]
    fn test_new_local_game_drops_peer() {
        let t0 = Instant::now();
        let mut game = online_game(t0);
        game.new_game(false, t0);
        assert!(!game.is_online());
        assert_eq!(game.begin_poll(t0 + Duration::from_secs(60)), None);
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let t0 = Instant::now();
        let mut game = online_game(t0);
        game.set_move(3, 4);
        game.board_mut().score = 77;
        let snapshot = game.snapshot();

        let mut other = Game::new(&Settings { seed: Some(1), ..Settings::default() }, 0, t0);
        other.restore(snapshot.clone(), t0).expect("valid snapshot");

        assert_eq!(other.snapshot(), snapshot);
        assert_eq!(other.mode(), Mode::Running);
        assert!(other.is_online());
    }

    #[test]
    fn test_invalid_snapshot_leaves_game_untouched() {
        let t0 = Instant::now();
        let mut game = game(t0);
        let before = game.snapshot();

        let mut bad = before.clone();
        bad.queue.pop();
        assert!(game.restore(bad, t0).is_err());

        let mut empty = before.clone();
        empty.current = None;
        assert!(game.restore(empty, t0).is_err());

        assert_eq!(game.snapshot(), before);
    }

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Drag(i32, i32),
        Tap,
        Key(Key),
        Tick,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            2 => (-400i32..400, -400i32..400).prop_map(|(dx, dy)| Step::Drag(dx, dy)),
            1 => Just(Step::Drag(i32::MIN, i32::MAX)),
            2 => Just(Step::Tap),
            1 => Just(Step::Key(Key::Left)),
            1 => Just(Step::Key(Key::Right)),
            6 => Just(Step::Tick),
        ]
    }

    proptest! {
        #[test]
        fn board_invariants_hold_through_play(seed in any::<u64>(), steps in prop::collection::vec(step(), 1..200)) {
            let t0 = Instant::now();
            let mut game = Game::new(&Settings { seed: Some(seed), ..Settings::default() }, 0, t0);
            let mut now = t0;

            for step in steps {
                match step {
                    Step::Drag(dx, dy) => game.drag_scroll(dx, dy),
                    Step::Tap => game.tap(now),
                    Step::Key(key) => {
                        game.key(key, now);
                    }
                    Step::Tick => {
                        now = later(now);
                        game.tick(now);
                    }
                }

                let board = game.board();
                prop_assert!(board.placed.iter().all(|b| b.value > 1));
                prop_assert_eq!(board.queue.len(), QUEUE_CAPACITY);
                for (i, ball) in board.queue.iter().enumerate() {
                    prop_assert_eq!(ball.pos, IVec2::new(slot_x(i), QUEUE_Y));
                }
                if let Some(current) = board.current {
                    prop_assert!(!board.placed.contains(&current));
                    // Anything reachable in play is also restorable
                    prop_assert!(game.snapshot().validate().is_ok());
                }
            }
        }
    }
}
