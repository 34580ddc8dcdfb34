//! Local leaderboard
//!
//! Keeps the fastest full-session times, sorted ascending and capped at a
//! fixed number of entries. Every change is written through to the store.

use crate::storage::{LeaderboardStore, StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Default leaderboard capacity
pub const MAX_ENTRIES: usize = 5;

/// Length of a player's initials
pub const INITIALS_LEN: usize = 3;

/// One leaderboard row. Field names match the stored JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Three uppercase initials
    pub player: String,
    /// Session time in milliseconds
    pub time: u64,
    /// Total moves over the session
    pub moves: u32,
}

/// Rejected initials input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitialsError {
    #[error("initials must be exactly {INITIALS_LEN} characters, got {0}")]
    WrongLength(usize),
}

/// Validated player initials: exactly three characters, uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initials(String);

impl Initials {
    /// Trim, uppercase and check the length.
    pub fn parse(input: &str) -> Result<Self, InitialsError> {
        let upper = input.trim().to_uppercase();
        let len = upper.chars().count();
        if len != INITIALS_LEN {
            return Err(InitialsError::WrongLength(len));
        }
        Ok(Initials(upper))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored initials must already be in the form `Initials::parse` produces.
fn is_valid_player(player: &str) -> bool {
    Initials::parse(player).is_ok_and(|initials| initials.as_str() == player)
}

/// Example rows written on first run
pub fn seed_entries() -> Vec<LeaderboardEntry> {
    vec![
        LeaderboardEntry {
            player: "ACE".to_string(),
            time: 180_500,
            moves: 127,
        },
        LeaderboardEntry {
            player: "PRO".to_string(),
            time: 240_750,
            moves: 156,
        },
        LeaderboardEntry {
            player: "NEW".to_string(),
            time: 360_250,
            moves: 203,
        },
    ]
}

/// Bounded, time-sorted leaderboard backed by a store.
pub struct ScoreLedger {
    entries: Vec<LeaderboardEntry>,
    max_entries: usize,
    store: Box<dyn LeaderboardStore>,
}

impl ScoreLedger {
    /// Load from `store`, seeding (and saving) the example rows when nothing is stored.
    pub fn load(store: Box<dyn LeaderboardStore>, max_entries: usize) -> Result<Self, StorageError> {
        let mut ledger = ScoreLedger {
            entries: Vec::new(),
            max_entries,
            store,
        };

        match ledger.store.load()? {
            Some(entries) => {
                let mut entries: Vec<LeaderboardEntry> = entries
                    .into_iter()
                    .filter(|e| {
                        let valid = is_valid_player(&e.player);
                        if !valid {
                            warn!(player = %e.player, "skipping stored row with bad initials");
                        }
                        valid
                    })
                    .collect();
                entries.sort_by_key(|e| e.time);
                entries.truncate(max_entries);
                ledger.entries = entries;
            }
            None => {
                info!("no leaderboard found, seeding example entries");
                ledger.reset()?;
            }
        }

        Ok(ledger)
    }

    /// Replace every row with the example seed and persist.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        let mut seed = seed_entries();
        seed.truncate(self.max_entries);
        self.store.save(&seed)?;
        self.entries = seed;
        Ok(())
    }

    /// Rows, fastest first.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// True if a session taking `time_ms` would earn a row.
    pub fn is_qualifying(&self, time_ms: u64) -> bool {
        if self.entries.len() < self.max_entries {
            return true;
        }
        match self.entries.last() {
            Some(worst) => time_ms < worst.time,
            None => self.max_entries > 0,
        }
    }

    /// Insert a score, keep the table sorted and bounded, and persist.
    ///
    /// Returns the zero-based rank of the new row, or `None` if it was cut off.
    pub fn add_score(
        &mut self,
        initials: &Initials,
        time_ms: u64,
        moves: u32,
    ) -> Result<Option<usize>, StorageError> {
        let entry = LeaderboardEntry {
            player: initials.as_str().to_string(),
            time: time_ms,
            moves,
        };

        // Ties go after existing rows with the same time
        let rank = self.entries.partition_point(|e| e.time <= time_ms);
        let mut updated = self.entries.clone();
        updated.insert(rank, entry);
        updated.truncate(self.max_entries);

        // The table only changes once the store has it
        if let Err(e) = self.store.save(&updated) {
            warn!(error = %e, "failed to persist leaderboard");
            return Err(e);
        }
        self.entries = updated;

        let rank = (rank < self.max_entries).then_some(rank);
        info!(player = initials.as_str(), time_ms, moves, ?rank, "score recorded");
        Ok(rank)
    }
}
