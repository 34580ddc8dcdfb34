//! Terminal UI components using ratatui

mod effects;
mod terminal;
mod ui;

pub use effects::Confetti;
pub use terminal::Tui;
pub use ui::{game_layout, peg_at, render};
