//! Application screen state management
//!
//! Turns player input into session operations:
//! - Instructions: shown once before the first game
//! - Game: the board, the initials prompt and the final summary
//! - Leaderboard: the saved best times
//!
//! Peg choice comes either from the keyboard cursor or from a mouse column
//! already mapped to a peg index by the renderer.

use super::state::{MoveOutcome, Outcome, Phase, Session, SessionEvent};
use crate::game::timer::format_elapsed;
use crate::game::{MAX_DISKS, MIN_DISKS, PEG_COUNT};
use crate::stats::INITIALS_LEN;
use std::time::Instant;

/// The current application screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Instructions,
    Game,
    Leaderboard,
}

/// Presentation side effects requested by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Audible cue
    Bell,
    /// Celebration burst over the board
    Confetti,
}

/// Main application coordinator
pub struct AppCoordinator {
    pub session: Session,
    /// Current screen
    pub screen: Screen,
    /// Peg highlighted for keyboard play
    pub cursor: usize,
    /// Initials typed so far
    pub initials_input: String,
    /// Status line text
    pub feedback: String,
    /// Whether the application should quit
    pub should_quit: bool,
    effects: Vec<Effect>,
}

impl AppCoordinator {
    /// Create a coordinator that opens on the instructions screen
    pub fn new(session: Session) -> Self {
        Self {
            session,
            screen: Screen::Instructions,
            cursor: 0,
            initials_input: String::new(),
            feedback: String::new(),
            should_quit: false,
            effects: Vec::new(),
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Drain requested effects
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Leave the instructions screen
    pub fn dismiss_instructions(&mut self) {
        if self.screen == Screen::Instructions {
            self.screen = Screen::Game;
        }
    }

    /// Flip between the board and the leaderboard
    pub fn toggle_leaderboard(&mut self) {
        self.screen = match self.screen {
            Screen::Leaderboard => Screen::Game,
            _ => Screen::Leaderboard,
        };
    }

    /// True while the final dialog is asking for initials
    pub fn is_entering_initials(&self) -> bool {
        self.session
            .summary()
            .is_some_and(|summary| summary.awaiting_initials)
    }

    /// Move the cursor left (wraps)
    pub fn cursor_left(&mut self) {
        self.cursor = (self.cursor + PEG_COUNT - 1) % PEG_COUNT;
    }

    /// Move the cursor right (wraps)
    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1) % PEG_COUNT;
    }

    /// Press on the cursor's peg
    pub fn press_cursor(&mut self, now: Instant) {
        self.press_peg(self.cursor, now);
    }

    /// Pick up from `peg`, or drop the held disk there.
    pub fn press_peg(&mut self, peg: usize, now: Instant) {
        if peg >= PEG_COUNT {
            return;
        }
        self.cursor = peg;
        if self.session.puzzle().selection.is_some() {
            self.release_on(peg, now);
        } else {
            self.grab(peg);
        }
    }

    /// Mouse button down over `peg`
    pub fn grab(&mut self, peg: usize) {
        if self.session.select(peg) {
            self.cursor = peg;
            self.feedback.clear();
        }
    }

    /// Mouse button up over `peg` (or outside every peg)
    pub fn release_on(&mut self, peg: usize, now: Instant) {
        if peg >= PEG_COUNT {
            self.session.cancel_selection();
            return;
        }
        self.cursor = peg;
        if let MoveOutcome::Cancelled = self.session.release(peg, now) {
            self.feedback.clear();
        }
        self.process_events();
    }

    /// Put the held disk back
    pub fn cancel_selection(&mut self) {
        self.session.cancel_selection();
    }

    /// Restart the current round's board
    pub fn reset_round(&mut self) {
        if self.session.reset_round() {
            self.feedback = "Round reset".to_string();
        }
    }

    /// Give up the current session
    pub fn quit_session(&mut self, now: Instant) {
        self.session.quit(now);
        self.process_events();
    }

    /// Start over at round 1
    pub fn new_game(&mut self) {
        self.session.new_game();
        self.reset_view();
        self.process_events();
    }

    /// Raise or lower the disk count, restarting the session
    pub fn change_difficulty(&mut self, delta: i8) {
        let current = self.session.puzzle().disk_count as i16;
        let target = (current + delta as i16).clamp(MIN_DISKS as i16, MAX_DISKS as i16) as u8;
        if target == self.session.puzzle().disk_count {
            return;
        }
        self.session.set_disk_count(target);
        self.reset_view();
        self.process_events();
    }

    /// Type a character into the initials prompt
    pub fn initials_char(&mut self, c: char) {
        if !self.is_entering_initials() {
            return;
        }
        if self.initials_input.chars().count() < INITIALS_LEN && !c.is_whitespace() {
            self.initials_input.push(c.to_ascii_uppercase());
        }
    }

    /// Delete the last typed initial
    pub fn initials_backspace(&mut self) {
        if self.is_entering_initials() {
            self.initials_input.pop();
        }
    }

    /// Submit the initials; the prompt stays open on bad input
    pub fn initials_submit(&mut self) {
        if !self.is_entering_initials() {
            return;
        }
        match self.session.submit_initials(&self.initials_input) {
            Ok(_) => {
                self.initials_input.clear();
                self.process_events();
            }
            Err(e) => {
                self.feedback = e.to_string();
            }
        }
    }

    /// Close the prompt without recording
    pub fn initials_skip(&mut self) {
        self.session.decline_initials();
        self.initials_input.clear();
    }

    /// Periodic update: fire due transitions and refresh feedback
    pub fn tick(&mut self, now: Instant) {
        self.session.tick(now);
        self.process_events();
    }

    fn reset_view(&mut self) {
        self.cursor = 0;
        self.initials_input.clear();
        self.feedback.clear();
        if self.screen == Screen::Leaderboard {
            self.screen = Screen::Game;
        }
    }

    fn process_events(&mut self) {
        for event in self.session.take_events() {
            match event {
                SessionEvent::MoveApplied { .. } => {
                    self.feedback.clear();
                }
                // The warning itself is shown from the session until it expires
                SessionEvent::IllegalMove(_) => {
                    self.feedback.clear();
                    self.effects.push(Effect::Bell);
                }
                SessionEvent::RoundWon {
                    round,
                    moves,
                    round_time,
                } => {
                    self.feedback = format!(
                        "Round {} solved in {} moves ({})",
                        round,
                        moves,
                        format_elapsed(round_time)
                    );
                    self.effects.push(Effect::Bell);
                    self.effects.push(Effect::Confetti);
                }
                SessionEvent::RoundAdvanced { round, disk_count } => {
                    self.cursor = 0;
                    self.feedback = format!("Round {}: {} disks", round, disk_count);
                }
                SessionEvent::SessionComplete { qualifies, .. } => {
                    self.feedback = if qualifies {
                        "New high score! Enter your initials".to_string()
                    } else {
                        "All rounds complete!".to_string()
                    };
                }
                SessionEvent::Quit { .. } => {
                    self.feedback = "Better luck next time!".to_string();
                }
                SessionEvent::ScoreRecorded { rank } => {
                    self.feedback = match rank {
                        Some(rank) => format!("Saved at #{}", rank + 1),
                        None => "Score saved".to_string(),
                    };
                }
                SessionEvent::NewGame { round, disk_count } => {
                    self.feedback = format!("Round {}: {} disks", round, disk_count);
                }
            }
        }
    }

    /// Headline for the final dialog
    pub fn summary_title(&self) -> Option<&'static str> {
        match self.session.phase() {
            Phase::SessionComplete(summary) => Some(match summary.outcome {
                Outcome::Completed => "Congratulations!",
                Outcome::Quit => "Better luck next time!",
            }),
            _ => None,
        }
    }
}
