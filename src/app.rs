use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::goto::{self, BufferShape, GotoHost, GotoSession, RevealMode};
use crate::model::buffer::Buffer;
use crate::model::config::AppConfig;
use crate::model::cursor::Position;
use crate::model::mode::Mode;
use crate::msg::{Direction as MoveDir, Msg};

pub struct App {
    pub mode: Mode,
    pub buffer: Buffer,
    pub config: AppConfig,
    pub should_quit: bool,
    pub event_tx: mpsc::Sender<Msg>,
    goto_session: Option<GotoSession>,
    goto_input: String,
    goto_prompt: String,
    highlight_row: Option<usize>,
    pending_key: Option<char>,
}

impl App {
    pub fn new(config: AppConfig, event_tx: mpsc::Sender<Msg>, file: Option<PathBuf>) -> Result<Self> {
        let path = file.unwrap_or_else(|| config.scratch_path());

        let mut buffer = if path.exists() {
            Buffer::from_file(path)?
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut buf = Buffer::new();
            buf.path = Some(path);
            buf
        };
        buffer.viewport.scroll_off = config.editor.scroll_off;

        Ok(Self {
            mode: Mode::Normal,
            buffer,
            config,
            should_quit: false,
            event_tx,
            goto_session: None,
            goto_input: String::new(),
            goto_prompt: String::new(),
            highlight_row: None,
            pending_key: None,
        })
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key)?,
            Msg::GotoValueChanged(raw) => self.goto_value_changed(&raw),
            Msg::GotoCommit(raw) => self.goto_commit(&raw),
            Msg::GotoCancel => self.goto_cancel(),
            Msg::SaveBuffer => self.save_buffer(),
            Msg::Tick => self.handle_tick(),
            Msg::Quit => self.should_quit = true,
            Msg::Resize(_w, h) => {
                // header + status bar
                self.buffer.viewport.height = h.saturating_sub(2);
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.mode {
            Mode::Normal => self.handle_key_normal(key)?,
            Mode::Insert => self.handle_key_insert(key),
            Mode::Goto => self.handle_key_goto(key),
        }
        Ok(())
    }

    fn handle_key_normal(&mut self, key: KeyEvent) -> Result<()> {
        if self.pending_key.take() == Some('g') {
            match key.code {
                KeyCode::Char('k') | KeyCode::Up => {
                    self.open_goto(goto::Direction::Up);
                    return Ok(());
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.open_goto(goto::Direction::Down);
                    return Ok(());
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Char('g') if key.modifiers.is_empty() => {
                self.pending_key = Some('g');
            }
            KeyCode::Char('q') => {
                self.save_buffer();
                let _ = self.event_tx.send(Msg::Quit);
            }
            KeyCode::Char('i') => self.mode = Mode::Insert,
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let _ = self.event_tx.send(Msg::SaveBuffer);
            }
            KeyCode::Char('h') | KeyCode::Left => self.move_cursor(MoveDir::Left),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(MoveDir::Down),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(MoveDir::Up),
            KeyCode::Char('l') | KeyCode::Right => self.move_cursor(MoveDir::Right),
            KeyCode::Char('0') => self.move_cursor(MoveDir::LineStart),
            KeyCode::Char('$') => self.move_cursor(MoveDir::LineEnd),
            _ => {}
        }
        Ok(())
    }

    fn handle_key_insert(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                self.buffer.insert_newline();
                self.schedule_auto_save();
            }
            KeyCode::Backspace => {
                self.buffer.delete_char_before();
                self.schedule_auto_save();
            }
            KeyCode::Char(ch) => {
                self.buffer.insert_char(ch);
                self.schedule_auto_save();
            }
            KeyCode::Left => self.move_cursor(MoveDir::Left),
            KeyCode::Right => self.move_cursor(MoveDir::Right),
            KeyCode::Up => self.move_cursor(MoveDir::Up),
            KeyCode::Down => self.move_cursor(MoveDir::Down),
            _ => {}
        }
    }

    /// Goto-mode keys only edit the raw input and re-emit it as session
    /// events; the session itself is driven from `update`.
    fn handle_key_goto(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                let _ = self.event_tx.send(Msg::GotoCancel);
            }
            KeyCode::Enter => {
                let _ = self.event_tx.send(Msg::GotoCommit(self.goto_input.clone()));
            }
            KeyCode::Backspace => {
                self.goto_input.pop();
                let _ = self
                    .event_tx
                    .send(Msg::GotoValueChanged(self.goto_input.clone()));
            }
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.goto_input.push(ch);
                let _ = self
                    .event_tx
                    .send(Msg::GotoValueChanged(self.goto_input.clone()));
            }
            _ => {}
        }
    }

    // ── Goto session wiring ──────────────────────────────────────

    fn open_goto(&mut self, direction: goto::Direction) {
        let prefer_relative = self.config.goto.preview_relative_numbers;
        let host = GotoHostView {
            buffer: &mut self.buffer,
            highlight_row: &mut self.highlight_row,
        };
        let (session, hint) = GotoSession::open(direction, prefer_relative, &host);

        tracing::debug!(?direction, "goto session opened");
        self.goto_session = Some(session);
        self.goto_prompt = hint;
        self.goto_input.clear();
        self.mode = Mode::Goto;
    }

    fn goto_value_changed(&mut self, raw: &str) {
        // A session can resolve before queued events drain; drop strays.
        let Some(session) = self.goto_session.as_mut() else {
            return;
        };

        let mut host = GotoHostView {
            buffer: &mut self.buffer,
            highlight_row: &mut self.highlight_row,
        };
        self.goto_prompt = session.value_changed(raw, &mut host);
    }

    fn goto_commit(&mut self, raw: &str) {
        let Some(session) = self.goto_session.take() else {
            return;
        };

        let mut host = GotoHostView {
            buffer: &mut self.buffer,
            highlight_row: &mut self.highlight_row,
        };
        let final_pos = session.commit(raw, &mut host);

        tracing::debug!(row = final_pos.row, col = final_pos.col, "goto committed");
        self.close_goto();
    }

    fn goto_cancel(&mut self) {
        let Some(session) = self.goto_session.take() else {
            return;
        };

        let mut host = GotoHostView {
            buffer: &mut self.buffer,
            highlight_row: &mut self.highlight_row,
        };
        session.cancel(&mut host);

        tracing::debug!("goto canceled");
        self.close_goto();
    }

    fn close_goto(&mut self) {
        self.goto_input.clear();
        self.goto_prompt.clear();
        self.mode = Mode::Normal;
    }

    // ── Editing shell ────────────────────────────────────────────

    fn move_cursor(&mut self, dir: MoveDir) {
        match dir {
            MoveDir::Up => {
                if self.buffer.cursor.row > 0 {
                    self.buffer.cursor.row -= 1;
                    self.buffer.cursor.col = self.buffer.cursor.desired_col;
                }
            }
            MoveDir::Down => {
                if self.buffer.cursor.row < self.buffer.line_count().saturating_sub(1) {
                    self.buffer.cursor.row += 1;
                    self.buffer.cursor.col = self.buffer.cursor.desired_col;
                }
            }
            MoveDir::Left => {
                if self.buffer.cursor.col > 0 {
                    self.buffer.cursor.col -= 1;
                    self.buffer.cursor.desired_col = self.buffer.cursor.col;
                }
            }
            MoveDir::Right => {
                if self.buffer.cursor.col < self.buffer.line_len(self.buffer.cursor.row) {
                    self.buffer.cursor.col += 1;
                    self.buffer.cursor.desired_col = self.buffer.cursor.col;
                }
            }
            MoveDir::LineStart => {
                self.buffer.cursor.col = 0;
                self.buffer.cursor.desired_col = 0;
            }
            MoveDir::LineEnd => {
                let line_len = self.buffer.line_len(self.buffer.cursor.row);
                self.buffer.cursor.col = line_len;
                self.buffer.cursor.desired_col = line_len;
            }
        }
        self.buffer.clamp_cursor();
        self.buffer.scroll_to_cursor();
    }

    fn schedule_auto_save(&mut self) {
        let debounce_ms = self.config.general.auto_save_debounce_ms;
        self.buffer.save_debounce = Some(Instant::now() + Duration::from_millis(debounce_ms));
    }

    fn handle_tick(&mut self) {
        if let Some(deadline) = self.buffer.save_debounce
            && Instant::now() >= deadline
        {
            self.save_buffer();
        }
    }

    fn save_buffer(&mut self) {
        let Some(path) = self.buffer.path.clone() else {
            return;
        };

        self.buffer.save_debounce = None;
        self.buffer.dirty = false;
        spawn_buffer_save(path, self.buffer.rope.clone());
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(1),    // editor
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_editor(frame, chunks[1]);
        self.render_status_bar(frame, chunks[2]);

        if self.mode == Mode::Goto {
            self.render_goto_overlay(frame);
        }
    }

    fn gutter_width(&self) -> usize {
        if !self.config.editor.line_numbers {
            return 0;
        }
        self.buffer.line_count().to_string().len() + 1
    }

    fn relative_gutter(&self) -> bool {
        self.goto_session
            .as_ref()
            .is_some_and(GotoSession::prefer_relative_numbers)
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let (top, bottom) = self.buffer.visible_lines();
        let gutter_width = self.gutter_width();
        let text_width = (area.width as usize).saturating_sub(gutter_width);
        let relative = self.relative_gutter();
        let cursor_row = self.buffer.cursor.row;

        let highlight_style = Style::default().bg(Color::Rgb(42, 42, 64));
        let lines: Vec<Line> = (top..=bottom)
            .map(|row| {
                let mut spans = Vec::with_capacity(2);

                if gutter_width > 0 {
                    let number = if relative && row != cursor_row {
                        cursor_row.abs_diff(row)
                    } else {
                        row + 1
                    };
                    let style = if row == cursor_row {
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    spans.push(Span::styled(
                        format!("{number:>width$} ", width = gutter_width - 1),
                        style,
                    ));
                }

                let text = self.buffer.line_text(row).unwrap_or_default();
                if self.highlight_row == Some(row) {
                    // Pad to the full width so the highlight reads as a
                    // whole-line decoration.
                    spans.push(Span::styled(
                        format!("{text:<text_width$}"),
                        highlight_style,
                    ));
                } else {
                    spans.push(Span::styled(text, Style::default().fg(Color::Gray)));
                }

                Line::from(spans)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);

        // The preview may scroll the cursor off screen; only place the
        // terminal cursor while its row is visible.
        if cursor_row >= top && cursor_row <= bottom {
            let cursor_x = area.x + gutter_width as u16 + self.buffer.cursor.col as u16;
            let cursor_y = area.y + (cursor_row - top) as u16;
            if cursor_y < area.y + area.height {
                frame.set_cursor_position((cursor_x, cursor_y));
            }
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let file_name = self
            .buffer
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "[scratch]".to_string());

        let name_span = Span::styled(
            format!(" {file_name} "),
            Style::default()
                .bg(Color::Rgb(30, 30, 45))
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        let hints = Span::styled(
            "  gk: Go Up  gj: Go Down  i: Insert  Ctrl+S: Save  q: Quit ",
            Style::default()
                .bg(Color::Rgb(20, 20, 30))
                .fg(Color::DarkGray),
        );

        frame.render_widget(
            Paragraph::new(Line::from(vec![name_span, hints]))
                .style(Style::default().bg(Color::Rgb(20, 20, 30))),
            area,
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mode_style = match self.mode {
            Mode::Normal => Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Mode::Insert => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            Mode::Goto => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };

        let mode_span = Span::styled(format!(" {} ", self.mode.label()), mode_style);
        let dirty_marker = if self.buffer.dirty { " [+]" } else { "" };

        let info = Span::styled(
            format!(
                "{dirty_marker}  {}:{} ",
                self.buffer.cursor.row + 1,
                self.buffer.cursor.col + 1,
            ),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        );

        let bar = Line::from(vec![mode_span, info]);
        frame.render_widget(
            Paragraph::new(bar).style(Style::default().bg(Color::DarkGray)),
            area,
        );
    }

    fn render_goto_overlay(&self, frame: &mut Frame) {
        let Some(session) = self.goto_session.as_ref() else {
            return;
        };

        let area = centered_rect(64, 30, frame.area());
        let area = Rect {
            height: area.height.min(6),
            ..area
        };
        frame.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let input = Paragraph::new(self.goto_input.clone()).block(
            Block::default()
                .title(format!(" Go {} ", session.direction().label()))
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::Rgb(15, 15, 24))),
        );
        frame.render_widget(input, chunks[0]);

        let prompt = Paragraph::new(self.goto_prompt.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
                    .style(
                        Style::default()
                            .bg(Color::Rgb(15, 15, 24))
                            .fg(Color::Gray),
                    ),
            );
        frame.render_widget(prompt, chunks[1]);

        let cursor_x = chunks[0].x + 1 + self.goto_input.len() as u16;
        let cursor_y = chunks[0].y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

/// Borrowed slice of editor state that a goto session drives: the buffer
/// for shape/cursor/viewport, plus the highlight slot the renderer reads.
struct GotoHostView<'a> {
    buffer: &'a mut Buffer,
    highlight_row: &'a mut Option<usize>,
}

impl BufferShape for GotoHostView<'_> {
    fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    fn line_len(&self, row: usize) -> usize {
        self.buffer.line_len(row)
    }
}

impl GotoHost for GotoHostView<'_> {
    fn cursor(&self) -> Position {
        self.buffer.cursor.position()
    }

    fn set_cursor(&mut self, pos: Position) {
        self.buffer.cursor.move_to(pos.row, pos.col);
        self.buffer.clamp_cursor();
    }

    fn highlight_line(&mut self, pos: Option<Position>) {
        *self.highlight_row = pos.map(|p| p.row);
    }

    fn visible_range(&self) -> (Position, Position) {
        let (top, bottom) = self.buffer.visible_lines();
        (Position { row: top, col: 0 }, Position { row: bottom, col: 0 })
    }

    fn reveal(&mut self, pos: Position, mode: RevealMode) {
        match mode {
            RevealMode::CenterIfOutside => {
                if !self.buffer.is_line_visible(pos.row) {
                    self.buffer.center_line(pos.row);
                }
            }
            RevealMode::Default => self.buffer.reveal_line(pos.row),
            RevealMode::AtTop => self.buffer.set_top_line(pos.row),
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn spawn_buffer_save(path: PathBuf, rope: ropey::Rope) {
    std::thread::spawn(move || {
        use std::io::Write;
        let result = (|| -> Result<()> {
            let tmp = path.with_extension("tmp");
            let file = std::fs::File::create(&tmp)?;
            let mut writer = std::io::BufWriter::new(file);
            for chunk in rope.chunks() {
                writer.write_all(chunk.as_bytes())?;
            }
            writer.flush()?;
            std::fs::rename(&tmp, &path)?;
            Ok(())
        })();

        if let Err(e) = result {
            tracing::error!("save failed: {e}");
        }
    });
}
