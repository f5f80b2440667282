/// Cursor state within a buffer.
#[derive(Debug, Clone, Default)]
pub struct CursorState {
    /// Current line (0-indexed).
    pub row: usize,
    /// Current column (0-indexed, byte offset within line).
    pub col: usize,
    /// Desired column for vertical movement ("sticky" column).
    pub desired_col: usize,
}

/// A zero-based location in a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl CursorState {
    pub fn position(&self) -> Position {
        Position {
            row: self.row,
            col: self.col,
        }
    }

    pub fn move_to(&mut self, row: usize, col: usize) {
        self.row = row;
        self.col = col;
        self.desired_col = col;
    }
}
