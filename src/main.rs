//! Rising Numbers entry point
//!
//! Headless driver: reads commands from stdin, ticks the game and prints the
//! board whenever something other than the rising ball changes.
//!
//! Commands: `left`, `right`, `fire`, `up`, `tap`, `drag <dx> <dy>`, `pause`,
//! `resume`, `start`, `online`, `local`, `save`, `quit`.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use rising_numbers::input::Key;
use rising_numbers::peer::HttpTransport;
use rising_numbers::persistence::FileStore;
use rising_numbers::session::TickOutcome;
use rising_numbers::{GameHandle, Mode, RenderView, Settings};

enum Command {
    Key(Key),
    Tap,
    Drag(i32, i32),
    Pause,
    Resume,
    Start,
    NewGame { online: bool },
    Save,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match words.next()? {
        "tap" => Command::Tap,
        "drag" => {
            let dx = words.next()?.parse().ok()?;
            let dy = words.next()?.parse().ok()?;
            Command::Drag(dx, dy)
        }
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "start" => Command::Start,
        "online" => Command::NewGame { online: true },
        "local" => Command::NewGame { online: false },
        "save" => Command::Save,
        "quit" | "exit" => Command::Quit,
        other => match Key::from_name(other) {
            Key::Other => return None,
            key => Command::Key(key),
        },
    };
    Some(command)
}

fn print_view(view: &RenderView) {
    let status = match view.mode {
        Mode::Running if view.waiting_for_opponent => "waiting for opponent",
        Mode::Running => "running",
        Mode::Paused => "paused",
        Mode::Over => "game over",
        Mode::Won => "you won",
    };
    println!("score {} (best {}) [{status}]", view.score, view.high_score);
    if let Some(ball) = view.current {
        println!("  current {} at ({}, {})", ball.value, ball.pos.x, ball.pos.y);
    }
    let queue: Vec<String> = view.queue.iter().map(|b| b.value.to_string()).collect();
    println!("  next [{}]", queue.join(" "));
    if view.online {
        let incoming: Vec<String> = view.incoming.iter().map(|b| b.value.to_string()).collect();
        println!("  incoming [{}]", incoming.join(" "));
    }
    println!("  {} balls on board", view.placed.len());
}

/// Ignores the current ball, which moves every tick
fn same_board(last: &RenderView, view: &RenderView) -> bool {
    last.placed == view.placed
        && last.queue == view.queue
        && last.score == view.score
        && last.mode == view.mode
        && last.waiting_for_opponent == view.waiting_for_opponent
        && last.incoming == view.incoming
}

async fn read_commands(tx: mpsc::UnboundedSender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => log::warn!("Unknown command: {}", line.trim()),
            },
            Ok(None) => {
                let _ = tx.send(Command::Quit);
                break;
            }
            Err(e) => {
                log::error!("Failed to read stdin: {e}");
                let _ = tx.send(Command::Quit);
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Rising Numbers starting...");

    let settings = Settings::load();
    let store = Arc::new(FileStore::new(settings.data_dir.clone()));
    let transport = match HttpTransport::new(&settings.server_url, settings.request_timeout()) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            log::error!("Failed to set up match transport: {e}");
            return;
        }
    };

    let mut handle = GameHandle::new(&settings, store, transport);
    if handle.resume_saved().await {
        log::info!("Picked up saved game");
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(read_commands(tx));

    let mut running = true;
    let frame = settings.tick_period();
    let mut last_view: Option<RenderView> = None;

    while running {
        while let Ok(command) = rx.try_recv() {
            match command {
                Command::Key(key) => {
                    handle.key(key);
                }
                Command::Tap => handle.tap(),
                Command::Drag(dx, dy) => handle.drag_scroll(dx, dy),
                Command::Pause => {
                    handle.pause();
                }
                Command::Resume => {
                    handle.resume();
                }
                Command::Start => handle.start(),
                Command::NewGame { online } => handle.new_game(online).await,
                Command::Save => {
                    if let Err(e) = handle.suspend() {
                        log::error!("Failed to save game: {e}");
                    }
                }
                Command::Quit => running = false,
            }
        }

        if let TickOutcome::Ended { won, .. } = handle.tick(std::time::Instant::now()) {
            println!("{}", if won { "You won!" } else { "Game over" });
        }

        let mut view = handle.view();
        let shown = last_view.as_ref().is_some_and(|last| same_board(last, &view));
        if !shown {
            print_view(&view);
        }
        view.current = None;
        last_view = Some(view);

        tokio::time::sleep(frame).await;
    }

    handle.with(|g| g.focus_lost());
    if let Err(e) = handle.suspend() {
        log::error!("Failed to save game: {e}");
    }
    handle.shutdown().await;
    log::info!("Bye");
}
