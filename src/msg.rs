use crossterm::event::KeyEvent;

/// Direction for basic cursor movement.
#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    LineStart,
    LineEnd,
}

/// All possible messages that drive state transitions.
#[derive(Debug)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Resize(u16, u16),

    // -- Goto session lifecycle (the full raw input is re-sent per keystroke)
    GotoValueChanged(String),
    GotoCommit(String),
    GotoCancel,

    // -- File I/O
    SaveBuffer,

    // -- System
    Tick,
    Quit,
}
