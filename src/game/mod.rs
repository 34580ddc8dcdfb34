//! Game logic: pegs, disks, puzzle state, move rules, session timing

pub mod timer;
pub mod validation;

/// Number of pegs on the board. Fixed.
pub const PEG_COUNT: usize = 3;

/// Disk count of the first round.
pub const MIN_DISKS: u8 = 3;

/// Disk count of the last round.
pub const MAX_DISKS: u8 = 8;

/// Index of the peg the full stack must end up on.
pub const TERMINAL_PEG: usize = PEG_COUNT - 1;

/// A disk is identified solely by its size (1 is the smallest).
pub type Disk = u8;

/// Disk count for a round: round 1 plays 3 disks, round 6 plays 8.
pub fn disk_count_for_round(round: u32) -> u8 {
    let count = round.saturating_add(2).min(u32::from(MAX_DISKS));
    (count as u8).max(MIN_DISKS)
}

/// Round number for a disk count, clamped so it never drops below 1.
pub fn round_for_disk_count(disk_count: u8) -> u32 {
    u32::from(disk_count.saturating_sub(2)).max(1)
}

/// A stack of disks. The last element is the top and the only movable disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Peg {
    disks: Vec<Disk>,
}

impl Peg {
    /// Create a peg holding the full tower `[n, n-1, ..., 1]`.
    pub fn full(disk_count: u8) -> Self {
        Self {
            disks: (1..=disk_count).rev().collect(),
        }
    }

    /// Disks bottom to top.
    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    /// The movable disk, if any.
    pub fn top(&self) -> Option<Disk> {
        self.disks.last().copied()
    }

    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    /// True when sizes strictly decrease from bottom to top.
    pub fn is_ordered(&self) -> bool {
        self.disks.windows(2).all(|pair| pair[0] > pair[1])
    }

    pub(crate) fn push(&mut self, disk: Disk) {
        self.disks.push(disk);
    }

    pub(crate) fn pop(&mut self) -> Option<Disk> {
        self.disks.pop()
    }
}

/// The disk currently held by the player, and the peg it was lifted from.
///
/// The disk stays on its peg in the model; renderers draw it lifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub peg: usize,
    pub disk: Disk,
}

/// Per-round board plus the session-wide counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleState {
    pub pegs: [Peg; PEG_COUNT],
    pub disk_count: u8,
    pub selection: Option<Selection>,
    /// Moves made this round
    pub move_count: u32,
    /// Moves folded in from finished rounds
    pub total_moves: u32,
    pub round_number: u32,
    /// Set between win detection and the round transition
    pub won: bool,
}

impl Default for PuzzleState {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleState {
    /// Fresh session at round 1 with three disks on the first peg.
    pub fn new() -> Self {
        Self::for_round(1)
    }

    /// Fresh session starting at the given round.
    pub fn for_round(round_number: u32) -> Self {
        let disk_count = disk_count_for_round(round_number);
        Self {
            pegs: [Peg::full(disk_count), Peg::default(), Peg::default()],
            disk_count,
            selection: None,
            move_count: 0,
            total_moves: 0,
            round_number,
            won: false,
        }
    }

    /// Re-stack the board for the current disk count. Session counters survive.
    pub fn reset_board(&mut self) {
        self.pegs = [Peg::full(self.disk_count), Peg::default(), Peg::default()];
        self.selection = None;
        self.move_count = 0;
        self.won = false;
    }

    /// Hold the top disk of `peg`.
    ///
    /// Returns `None` and leaves the state untouched when the peg is empty or
    /// out of range, so callers can treat an empty-peg click as a no-op.
    pub fn pick_up(&mut self, peg: usize) -> Option<Selection> {
        let disk = self.pegs.get(peg)?.top()?;
        let selection = Selection { peg, disk };
        self.selection = Some(selection);
        Some(selection)
    }

    /// Drop whatever is held without moving it.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Total disks across all pegs.
    #[cfg(test)]
    pub fn disks_on_board(&self) -> usize {
        self.pegs.iter().map(Peg::len).sum()
    }
}
