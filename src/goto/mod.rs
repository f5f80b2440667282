//! Relative-goto navigation: move the cursor by a typed number of lines
//! (optionally to a column), with a live preview of the target while the
//! user is still typing.
//!
//! The pipeline per keystroke is `input::parse` → `sanitize::sanitize` →
//! `prompt`, sequenced by `session::GotoSession`. Everything in here is
//! pure computation over the host traits; rendering and key handling live
//! in the application layer.

pub mod input;
pub mod prompt;
pub mod sanitize;
pub mod session;

pub use sanitize::BufferShape;
pub use session::{GotoHost, GotoSession, RevealMode};

/// Direction a goto session navigates in. Fixed for the session's lifetime;
/// a negative line input reverses the move without changing the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    pub fn flipped(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}
