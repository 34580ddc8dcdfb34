//! Ringstacker - Tower of Hanoi in the terminal
//!
//! Six rounds, three to eight disks. Stack fast. Make the board.

mod app;
mod cli;
mod game;
mod stats;
mod storage;
mod tui;

use app::{AppCoordinator, Effect, Screen, Session};
use clap::Parser;
use cli::{Cli, Command, PlayArgs};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use game::timer::format_millis;
use game::PEG_COUNT;
use ratatui::layout::Rect;
use stats::ScoreLedger;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::{Confetti, Tui};

/// Log file name inside the data directory
const LOG_FILE: &str = "ringstacker.log";

/// Environment variable holding the log filter
const LOG_ENV: &str = "RINGSTACKER_LOG";

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => Storage::data_dir().map_err(io::Error::other)?,
    };
    init_logging(&data_dir, &cli.log_level)?;

    let storage = Storage::open_in(&data_dir).map_err(io::Error::other)?;

    match cli.selected() {
        Command::Play(args) => play(storage, &args),
        Command::Scores => print_scores(storage),
        Command::ResetScores => reset_scores(storage),
    }
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(data_dir: &Path, level: &str) -> io::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    info!(data_dir = %data_dir.display(), "ringstacker starting");
    Ok(())
}

fn load_ledger(storage: Storage, max_entries: usize) -> io::Result<ScoreLedger> {
    ScoreLedger::load(Box::new(storage), max_entries).map_err(io::Error::other)
}

fn print_scores(storage: Storage) -> io::Result<()> {
    let ledger = load_ledger(storage, stats::MAX_ENTRIES)?;
    println!("{:>2}  {:<3}  {:>10}  {:>5}", "#", "WHO", "TIME", "MOVES");
    for (i, entry) in ledger.entries().iter().enumerate() {
        println!(
            "{:>2}  {:<3}  {:>10}  {:>5}",
            i + 1,
            entry.player,
            format_millis(entry.time),
            entry.moves
        );
    }
    Ok(())
}

fn reset_scores(storage: Storage) -> io::Result<()> {
    let mut ledger = load_ledger(storage, stats::MAX_ENTRIES)?;
    ledger.reset().map_err(io::Error::other)?;
    info!("leaderboard reset from the command line");
    println!("Leaderboard reset to {} example entries", ledger.entries().len());
    Ok(())
}

fn play(storage: Storage, args: &PlayArgs) -> io::Result<()> {
    let config = args.game_config();
    let ledger = load_ledger(storage, config.max_entries)?;
    let mut session = Session::new(config, ledger);
    if let Some(disks) = args.disks {
        session.set_disk_count(disks);
    }

    let mut app = AppCoordinator::new(session);
    let mut confetti = Confetti::new();

    // Initialize terminal
    let mut terminal = Tui::new()?;
    terminal.enter()?;

    // Fast enough for a hundredths clock and the confetti
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();
        terminal.draw(|frame| tui::render(frame, &app, &confetti, now))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut app, key.code, Instant::now());
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse, terminal.area()?, Instant::now());
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick(Instant::now());
            confetti.step();
            last_tick = Instant::now();
        }

        for effect in app.take_effects() {
            match effect {
                Effect::Bell => terminal.bell()?,
                Effect::Confetti => {
                    let board = tui::game_layout(terminal.area()?).board;
                    confetti.burst(board.width, board.height);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    terminal.exit()?;
    info!("ringstacker exiting");
    Ok(())
}

fn handle_key(app: &mut AppCoordinator, code: KeyCode, now: Instant) {
    match app.screen {
        Screen::Instructions => match code {
            KeyCode::Esc => app.quit(),
            _ => app.dismiss_instructions(),
        },
        Screen::Leaderboard => match code {
            KeyCode::Esc => app.quit(),
            KeyCode::Char('l') | KeyCode::Char('L') => app.toggle_leaderboard(),
            _ => {}
        },
        Screen::Game if app.is_entering_initials() => match code {
            KeyCode::Enter => app.initials_submit(),
            KeyCode::Backspace => app.initials_backspace(),
            KeyCode::Esc => app.initials_skip(),
            KeyCode::Char(c) if c.is_ascii_alphanumeric() => app.initials_char(c),
            _ => {}
        },
        Screen::Game if app.session.summary().is_some() => match code {
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter => app.new_game(),
            KeyCode::Char('l') | KeyCode::Char('L') => app.toggle_leaderboard(),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
            _ => {}
        },
        Screen::Game => match code {
            KeyCode::Left => app.cursor_left(),
            KeyCode::Right => app.cursor_right(),
            KeyCode::Char(' ') | KeyCode::Enter => app.press_cursor(now),
            KeyCode::Char(c @ '1'..='3') => {
                let peg = c as usize - '1' as usize;
                app.press_peg(peg, now);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => app.reset_round(),
            KeyCode::Char('q') | KeyCode::Char('Q') => app.quit_session(now),
            KeyCode::Char('n') | KeyCode::Char('N') => app.new_game(),
            KeyCode::Char('+') | KeyCode::Char('=') => app.change_difficulty(1),
            KeyCode::Char('-') => app.change_difficulty(-1),
            KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Tab => app.toggle_leaderboard(),
            KeyCode::Esc => {
                if app.session.puzzle().selection.is_some() {
                    app.cancel_selection();
                } else {
                    app.quit();
                }
            }
            _ => {}
        },
    }
}

/// Drag and drop: press picks up, release drops on the peg under the pointer.
fn handle_mouse(app: &mut AppCoordinator, mouse: MouseEvent, area: Rect, now: Instant) {
    if app.screen != Screen::Game || app.session.summary().is_some() {
        return;
    }
    let board = tui::game_layout(area).board;
    let peg = tui::peg_at(board, mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(peg) = peg {
                app.grab(peg);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if app.session.puzzle().selection.is_some() {
                app.release_on(peg.unwrap_or(PEG_COUNT), now);
            }
        }
        _ => {}
    }
}
