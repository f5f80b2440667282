/// Numeric fields extracted from raw goto input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParsedInput {
    /// Signed line count; `None` until the user has typed a usable number.
    pub lines: Option<i64>,
    /// Optional 1-based column, as typed (clamping happens later).
    pub column: Option<i64>,
}

/// Parse raw input in the form `lines`, `lines,col`, `lines:col`,
/// `lines#col`, or whitespace-separated.
///
/// Tokens that do not parse as integers are skipped wherever they appear,
/// so `"abc:123:xyz:456"` reads as lines 123, column 456. Tokens past the
/// second number are ignored. There is no error case: garbage in means
/// `lines: None`, never a rejection mid-keystroke.
pub fn parse(raw: &str) -> ParsedInput {
    let mut numbers = raw
        .split(|c: char| c == ',' || c == ':' || c == '#' || c.is_whitespace())
        .filter_map(|token| token.parse::<i64>().ok());

    ParsedInput {
        lines: numbers.next(),
        column: numbers.next(),
    }
}
