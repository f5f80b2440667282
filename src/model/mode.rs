/// Application interaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal mode — navigation and commands.
    #[default]
    Normal,
    /// Insert mode — text editing.
    Insert,
    /// Goto mode — the relative-goto input overlay is open.
    Goto,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Goto => "GOTO",
        }
    }
}
