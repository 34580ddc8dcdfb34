//! Session state machine
//!
//! Drives a player through the rounds: each round is one puzzle at a fixed
//! disk count, a win schedules either the next round or the end of the
//! session, and the session totals feed the leaderboard.

use super::schedule::Scheduled;
use crate::game::timer::SessionTimer;
use crate::game::validation::{apply_move, check_move, check_win, minimum_moves, IllegalMove};
use crate::game::{
    disk_count_for_round, round_for_disk_count, Disk, PuzzleState, MAX_DISKS, MIN_DISKS,
};
use crate::stats::{Initials, InitialsError, ScoreLedger, MAX_ENTRIES};
use crate::storage::StorageError;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Number of rounds in a full session
pub const DEFAULT_MAX_ROUNDS: u32 = 6;

/// Pause between a win and the next round (or the final summary)
pub const DEFAULT_TRANSITION_DELAY: Duration = Duration::from_millis(1000);

/// How long an illegal-move warning stays up
pub const DEFAULT_WARNING_DURATION: Duration = Duration::from_millis(1000);

/// Session tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub max_rounds: u32,
    pub max_entries: usize,
    pub transition_delay: Duration,
    pub warning_duration: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_entries: MAX_ENTRIES,
            transition_delay: DEFAULT_TRANSITION_DELAY,
            warning_duration: DEFAULT_WARNING_DURATION,
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Quit,
}

/// End-of-session figures shown in the final dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub outcome: Outcome,
    /// Round the player reached
    pub rounds: u32,
    pub total_moves: u32,
    pub total_time: Duration,
    /// Whether the time beats the current leaderboard
    pub qualifies: bool,
    /// True until initials are submitted or declined
    pub awaiting_initials: bool,
    /// Leaderboard position once recorded
    pub rank: Option<usize>,
}

impl Summary {
    pub fn total_millis(&self) -> u64 {
        self.total_time.as_millis() as u64
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Moves are accepted
    Playing,
    /// Round solved; a transition is pending
    Won,
    /// Session over, either by finishing the last round or quitting
    SessionComplete(Summary),
}

/// Result of a move attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// The move solved the puzzle
    Won,
    Rejected(IllegalMove),
    /// Disk dropped back on its own peg
    Cancelled,
    /// Nothing held, or the session is not accepting moves
    Ignored,
}

/// Notifications for the presentation layer (sounds, effects, dialogs)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    MoveApplied { from: usize, to: usize, disk: Disk },
    IllegalMove(IllegalMove),
    RoundWon { round: u32, moves: u32, round_time: Duration },
    RoundAdvanced { round: u32, disk_count: u8 },
    SessionComplete { total_time: Duration, total_moves: u32, qualifies: bool },
    Quit { total_time: Duration, total_moves: u32 },
    ScoreRecorded { rank: Option<usize> },
    NewGame { round: u32, disk_count: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    AdvanceRound,
    CompleteSession,
}

/// Errors from submitting initials
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no score is waiting for initials")]
    NotAwaitingInitials,
    #[error("session time does not make the leaderboard")]
    NotQualifying,
    #[error(transparent)]
    Initials(#[from] InitialsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One player's run through the rounds
pub struct Session {
    config: GameConfig,
    puzzle: PuzzleState,
    timer: SessionTimer,
    phase: Phase,
    ledger: ScoreLedger,
    transition: Scheduled<Transition>,
    warning: Scheduled<IllegalMove>,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Start a session at round 1
    pub fn new(config: GameConfig, ledger: ScoreLedger) -> Self {
        Self {
            config,
            puzzle: PuzzleState::new(),
            timer: SessionTimer::new(),
            phase: Phase::Playing,
            ledger,
            transition: Scheduled::new(),
            warning: Scheduled::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn puzzle(&self) -> &PuzzleState {
        &self.puzzle
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    #[cfg(test)]
    pub fn ledger_mut(&mut self) -> &mut ScoreLedger {
        &mut self.ledger
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Final figures, once the session is over
    pub fn summary(&self) -> Option<&Summary> {
        match &self.phase {
            Phase::SessionComplete(summary) => Some(summary),
            _ => None,
        }
    }

    /// The illegal move currently being warned about
    pub fn warning(&self) -> Option<&IllegalMove> {
        self.warning.peek()
    }

    /// Session time at `now` (all rounds so far)
    pub fn total_elapsed(&self, now: Instant) -> Duration {
        self.timer.total_elapsed(now)
    }

    /// Fewest moves for the current round
    pub fn minimum_moves(&self) -> u64 {
        minimum_moves(self.puzzle.disk_count)
    }

    /// Drain pending notifications
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pick up the top disk of `peg`. Empty pegs are a no-op.
    pub fn select(&mut self, peg: usize) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.puzzle.pick_up(peg).is_some()
    }

    /// Drop the held disk on `to`
    pub fn release(&mut self, to: usize, now: Instant) -> MoveOutcome {
        let Some(held) = self.puzzle.selection.take() else {
            return MoveOutcome::Ignored;
        };
        if !self.is_playing() {
            return MoveOutcome::Ignored;
        }
        if held.peg == to {
            return MoveOutcome::Cancelled;
        }
        self.try_move(held.peg, to, now)
    }

    /// Move the top disk of `from` onto `to`
    pub fn try_move(&mut self, from: usize, to: usize, now: Instant) -> MoveOutcome {
        if !self.is_playing() {
            return MoveOutcome::Ignored;
        }
        self.puzzle.clear_selection();

        if let Err(reason) = check_move(&self.puzzle, from, to) {
            debug!(from, to, ?reason, "move rejected");
            self.warning.arm(reason, now, self.config.warning_duration);
            self.events.push(SessionEvent::IllegalMove(reason));
            return MoveOutcome::Rejected(reason);
        }

        let disk = self.puzzle.pegs[from].top().unwrap_or_default();
        if !apply_move(&mut self.puzzle, from, to) {
            return MoveOutcome::Ignored;
        }

        // Clock runs from the first move of each round
        self.timer.start(now);
        debug!(from, to, disk, moves = self.puzzle.move_count, "move applied");
        self.events.push(SessionEvent::MoveApplied { from, to, disk });

        if check_win(&self.puzzle) {
            self.on_win(now);
            return MoveOutcome::Won;
        }
        MoveOutcome::Moved
    }

    /// Drop the held disk without moving it
    pub fn cancel_selection(&mut self) {
        self.puzzle.clear_selection();
    }

    /// Advance scheduled work: expire warnings, fire round transitions.
    pub fn tick(&mut self, now: Instant) {
        self.timer.sample(now);
        self.warning.take_due(now);

        match self.transition.take_due(now) {
            Some(Transition::AdvanceRound) => self.advance_round(),
            Some(Transition::CompleteSession) => self.complete_session(now),
            None => {}
        }
    }

    /// Re-stack the current round. Round, totals and the running clock are kept.
    pub fn reset_round(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.puzzle.reset_board();
        self.warning.cancel();
        info!(round = self.puzzle.round_number, "round reset");
        true
    }

    /// End the session early. Only allowed while playing.
    pub fn quit(&mut self, now: Instant) -> bool {
        if !self.is_playing() {
            return false;
        }

        self.timer.stop(now);
        self.transition.cancel();
        self.warning.cancel();
        self.puzzle.clear_selection();
        self.puzzle.total_moves += self.puzzle.move_count;

        let total_time = self.timer.total_elapsed(now);
        let total_moves = self.puzzle.total_moves;
        let qualifies = self.ledger.is_qualifying(total_time.as_millis() as u64);

        info!(round = self.puzzle.round_number, total_moves, ?total_time, "session quit");
        self.events.push(SessionEvent::Quit {
            total_time,
            total_moves,
        });
        self.phase = Phase::SessionComplete(Summary {
            outcome: Outcome::Quit,
            rounds: self.puzzle.round_number,
            total_moves,
            total_time,
            qualifies,
            awaiting_initials: false,
            rank: None,
        });
        true
    }

    /// Throw everything away and start again at round 1
    pub fn new_game(&mut self) {
        self.restart(PuzzleState::new());
    }

    /// Jump to the round that plays `disk_count` disks, as a fresh session.
    ///
    /// The count is clamped to the supported range; returns the count applied.
    pub fn set_disk_count(&mut self, disk_count: u8) -> u8 {
        let disk_count = disk_count.clamp(MIN_DISKS, MAX_DISKS);
        let round = round_for_disk_count(disk_count).min(self.config.max_rounds.max(1));
        info!(disk_count, round, "difficulty override");
        self.restart(PuzzleState::for_round(round));
        self.puzzle.disk_count
    }

    /// Record the finished session on the leaderboard
    pub fn submit_initials(&mut self, input: &str) -> Result<Option<usize>, SessionError> {
        let Phase::SessionComplete(summary) = &self.phase else {
            return Err(SessionError::NotAwaitingInitials);
        };
        if summary.outcome != Outcome::Completed {
            return Err(SessionError::NotAwaitingInitials);
        }
        if !summary.qualifies {
            return Err(SessionError::NotQualifying);
        }
        if !summary.awaiting_initials {
            return Err(SessionError::NotAwaitingInitials);
        }

        let initials = Initials::parse(input)?;
        let (time, moves) = (summary.total_millis(), summary.total_moves);
        let rank = self.ledger.add_score(&initials, time, moves)?;

        if let Phase::SessionComplete(summary) = &mut self.phase {
            summary.awaiting_initials = false;
            summary.rank = rank;
        }
        self.events.push(SessionEvent::ScoreRecorded { rank });
        Ok(rank)
    }

    /// Skip the initials prompt
    pub fn decline_initials(&mut self) {
        if let Phase::SessionComplete(summary) = &mut self.phase {
            summary.awaiting_initials = false;
        }
    }

    fn restart(&mut self, puzzle: PuzzleState) {
        self.transition.cancel();
        self.warning.cancel();
        self.timer = SessionTimer::new();
        self.puzzle = puzzle;
        self.phase = Phase::Playing;
        info!(
            round = self.puzzle.round_number,
            disks = self.puzzle.disk_count,
            "new game"
        );
        self.events.push(SessionEvent::NewGame {
            round: self.puzzle.round_number,
            disk_count: self.puzzle.disk_count,
        });
    }

    fn on_win(&mut self, now: Instant) {
        let round_time = self.timer.round_elapsed(now);
        self.timer.stop(now);
        self.warning.cancel();
        self.puzzle.won = true;
        self.phase = Phase::Won;

        let round = self.puzzle.round_number;
        let moves = self.puzzle.move_count;
        info!(round, moves, ?round_time, "round won");
        self.events.push(SessionEvent::RoundWon {
            round,
            moves,
            round_time,
        });

        let next = if round < self.config.max_rounds {
            Transition::AdvanceRound
        } else {
            Transition::CompleteSession
        };
        self.transition.arm(next, now, self.config.transition_delay);
    }

    fn advance_round(&mut self) {
        self.puzzle.total_moves += self.puzzle.move_count;
        self.puzzle.round_number += 1;
        self.puzzle.disk_count = disk_count_for_round(self.puzzle.round_number);
        self.puzzle.reset_board();
        self.phase = Phase::Playing;

        info!(
            round = self.puzzle.round_number,
            disks = self.puzzle.disk_count,
            total_moves = self.puzzle.total_moves,
            "round advanced"
        );
        self.events.push(SessionEvent::RoundAdvanced {
            round: self.puzzle.round_number,
            disk_count: self.puzzle.disk_count,
        });
    }

    fn complete_session(&mut self, now: Instant) {
        self.puzzle.total_moves += self.puzzle.move_count;

        let total_time = self.timer.total_elapsed(now);
        let total_moves = self.puzzle.total_moves;
        let qualifies = self.ledger.is_qualifying(total_time.as_millis() as u64);

        info!(total_moves, ?total_time, qualifies, "session complete");
        self.events.push(SessionEvent::SessionComplete {
            total_time,
            total_moves,
            qualifies,
        });
        self.phase = Phase::SessionComplete(Summary {
            outcome: Outcome::Completed,
            rounds: self.puzzle.round_number,
            total_moves,
            total_time,
            qualifies,
            awaiting_initials: qualifies,
            rank: None,
        });
    }
}
