//! Application state and core logic

pub mod schedule;
pub mod screen;
pub mod state;

pub use screen::{AppCoordinator, Effect, Screen};
pub use state::{GameConfig, Outcome, Session};
