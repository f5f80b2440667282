use ropey::Rope;
use std::path::PathBuf;
use std::time::Instant;

use super::cursor::CursorState;

/// Viewport state for scroll tracking.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub top_line: usize,
    pub height: u16,
    pub scroll_off: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            top_line: 0,
            height: 24,
            scroll_off: 5,
        }
    }
}

/// A single text buffer backed by a Rope.
pub struct Buffer {
    pub rope: Rope,
    pub path: Option<PathBuf>,
    pub dirty: bool,
    pub cursor: CursorState,
    pub viewport: Viewport,
    pub save_debounce: Option<Instant>,
}

impl Buffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            path: None,
            dirty: false,
            cursor: CursorState::default(),
            viewport: Viewport::default(),
            save_debounce: None,
        }
    }

    /// Create a buffer from file contents.
    pub fn from_file(path: PathBuf) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(&path)?;
        Ok(Self {
            rope: Rope::from_str(&text),
            path: Some(path),
            dirty: false,
            cursor: CursorState::default(),
            viewport: Viewport::default(),
            save_debounce: None,
        })
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the text of a specific line (without trailing newline).
    pub fn line_text(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(idx);
        let mut s: String = line.chunks().collect();
        if s.ends_with('\n') {
            s.pop();
        }
        if s.ends_with('\r') {
            s.pop();
        }
        Some(s)
    }

    /// Length of a line in characters, without its trailing newline.
    pub fn line_len(&self, idx: usize) -> usize {
        self.line_text(idx).map(|l| l.chars().count()).unwrap_or(0)
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, ch: char) {
        let char_idx = self.cursor_char_offset();
        self.rope.insert_char(char_idx, ch);
        self.cursor.col += 1;
        self.dirty = true;
    }

    /// Insert a newline at the cursor position.
    pub fn insert_newline(&mut self) {
        let char_idx = self.cursor_char_offset();
        self.rope.insert_char(char_idx, '\n');
        self.cursor.row += 1;
        self.cursor.col = 0;
        self.cursor.desired_col = 0;
        self.dirty = true;
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char_before(&mut self) {
        if self.cursor.col == 0 && self.cursor.row == 0 {
            return;
        }

        let char_idx = self.cursor_char_offset();
        if self.cursor.col == 0 {
            // Join with previous line by deleting its trailing newline
            let prev_line_len = self.line_len(self.cursor.row - 1);
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.row -= 1;
            self.cursor.col = prev_line_len;
        } else {
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.col -= 1;
        }

        self.dirty = true;
    }

    /// Char offset in the rope for the current cursor position. Columns are
    /// char counts, so this is safe on multibyte lines.
    fn cursor_char_offset(&self) -> usize {
        let line_start = self.rope.line_to_char(self.cursor.row);
        line_start + self.cursor.col
    }

    /// Ensure the cursor stays within valid bounds.
    pub fn clamp_cursor(&mut self) {
        let max_row = self.rope.len_lines().saturating_sub(1);
        self.cursor.row = self.cursor.row.min(max_row);
        self.cursor.col = self.cursor.col.min(self.line_len(self.cursor.row));
    }

    /// First and last buffer lines currently on screen.
    pub fn visible_lines(&self) -> (usize, usize) {
        let top = self.viewport.top_line;
        let last = self.line_count().saturating_sub(1);
        let bottom = (top + self.viewport.height.saturating_sub(1) as usize).min(last);
        (top, bottom)
    }

    pub fn is_line_visible(&self, row: usize) -> bool {
        let (top, bottom) = self.visible_lines();
        (top..=bottom).contains(&row)
    }

    /// Scroll so `row` sits in the middle of the viewport.
    pub fn center_line(&mut self, row: usize) {
        let half = self.viewport.height as usize / 2;
        let max_top = self.line_count().saturating_sub(1);
        self.viewport.top_line = row.saturating_sub(half).min(max_top);
    }

    /// Put `row` on the first visible line, with no scroll-off margin.
    pub fn set_top_line(&mut self, row: usize) {
        let max_top = self.line_count().saturating_sub(1);
        self.viewport.top_line = row.min(max_top);
    }

    /// Scroll the minimum needed to bring `row` into view, honoring the
    /// scroll-off margin.
    pub fn reveal_line(&mut self, row: usize) {
        let off = self.viewport.scroll_off as usize;
        let height = self.viewport.height as usize;

        if row < self.viewport.top_line + off {
            self.viewport.top_line = row.saturating_sub(off);
        }
        if row + off >= self.viewport.top_line + height {
            self.viewport.top_line = (row + off + 1).saturating_sub(height);
        }
    }

    /// Ensure the viewport keeps the cursor visible.
    pub fn scroll_to_cursor(&mut self) {
        self.reveal_line(self.cursor.row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn buffer_from(text: &str) -> Buffer {
        let mut buf = Buffer::new();
        buf.rope = Rope::from_str(text);
        buf
    }

    #[test]
    fn line_queries() {
        let buf = buffer_from("alpha\nbeta\n\ndelta");
        assert_eq!(buf.line_count(), 4);
        assert_eq!(buf.line_text(1).as_deref(), Some("beta"));
        assert_eq!(buf.line_len(1), 4);
        assert_eq!(buf.line_len(2), 0);
        assert_eq!(buf.line_text(9), None);
        assert_eq!(buf.line_len(9), 0);
    }

    #[test]
    fn clamp_cursor_pulls_back_into_bounds() {
        let mut buf = buffer_from("short\nlonger line");
        buf.cursor.move_to(7, 40);
        buf.clamp_cursor();
        assert_eq!(buf.cursor.row, 1);
        assert_eq!(buf.cursor.col, buf.line_len(1));
    }

    #[test]
    fn reveal_line_scrolls_minimally() {
        let mut buf = buffer_from(&"x\n".repeat(100));
        buf.viewport.height = 20;
        buf.viewport.scroll_off = 2;

        buf.reveal_line(50);
        // Line 50 must sit inside the viewport with the margin respected.
        let top = buf.viewport.top_line;
        assert!(top + 2 <= 50 && 50 < top + 20 - 2);

        let before = buf.viewport.top_line;
        buf.reveal_line(50);
        assert_eq!(buf.viewport.top_line, before);
    }

    #[test]
    fn center_line_puts_the_row_mid_viewport() {
        let mut buf = buffer_from(&"x\n".repeat(100));
        buf.viewport.height = 20;
        buf.center_line(60);
        assert_eq!(buf.viewport.top_line, 50);
        assert!(buf.is_line_visible(60));

        buf.center_line(3);
        assert_eq!(buf.viewport.top_line, 0);
    }

    #[test]
    fn multibyte_editing_uses_char_columns() {
        let mut buf = buffer_from("αβγ");
        assert_eq!(buf.line_len(0), 3);

        buf.cursor.move_to(0, 3);
        buf.insert_char('x');
        assert_eq!(buf.line_text(0).as_deref(), Some("αβγx"));
        assert_eq!(buf.cursor.col, 4);

        buf.delete_char_before();
        buf.delete_char_before();
        assert_eq!(buf.line_text(0).as_deref(), Some("αβ"));
        assert_eq!(buf.cursor.col, 2);
    }

    #[test]
    fn set_top_line_ignores_the_margin() {
        let mut buf = buffer_from(&"x\n".repeat(100));
        buf.viewport.height = 20;
        buf.viewport.scroll_off = 5;

        buf.set_top_line(30);
        assert_eq!(buf.viewport.top_line, 30);

        buf.set_top_line(500);
        assert_eq!(buf.viewport.top_line, 100);
    }

    #[test]
    fn from_file_reads_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "one\ntwo\nthree").unwrap();

        let buf = Buffer::from_file(file.path().to_path_buf()).unwrap();
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line_text(2).as_deref(), Some("three"));
        assert!(!buf.dirty);
    }

    #[test]
    fn editing_round_trip() {
        let mut buf = buffer_from("ab");
        buf.cursor.move_to(0, 2);
        buf.insert_char('c');
        buf.insert_newline();
        buf.insert_char('d');
        assert_eq!(buf.line_text(0).as_deref(), Some("abc"));
        assert_eq!(buf.line_text(1).as_deref(), Some("d"));

        buf.delete_char_before();
        buf.delete_char_before();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.cursor.position().col, 3);
        assert!(buf.dirty);
    }
}
