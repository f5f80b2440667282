use crate::goto::Direction;
use crate::goto::input;
use crate::goto::prompt;
use crate::goto::sanitize::{self, BufferShape, SanitizedTarget};
use crate::model::cursor::Position;

/// How a reveal request may scroll the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    /// Center the position if it is outside the visible range.
    CenterIfOutside,
    /// Scroll the minimum needed to bring the position into view.
    Default,
    /// Put the position on the first visible line, with no margin.
    AtTop,
}

/// Editor-side capabilities a goto session drives. The session never holds
/// UI resources itself; it asks the host to highlight, scroll, and finally
/// move the cursor.
pub trait GotoHost: BufferShape {
    fn cursor(&self) -> Position;
    fn set_cursor(&mut self, pos: Position);
    /// Request a whole-line highlight at `pos`, or clear it with `None`.
    fn highlight_line(&mut self, pos: Option<Position>);
    /// Start and end of the currently visible range.
    fn visible_range(&self) -> (Position, Position);
    fn reveal(&mut self, pos: Position, mode: RevealMode);
}

/// One interactive goto invocation, from open to commit or cancel.
///
/// While open, `value_changed` is the only operation and its only effects
/// are ephemeral preview signals to the host. `commit` and `cancel` take
/// the session by value: a resolved session is gone, and late events have
/// nowhere to land.
#[derive(Debug)]
pub struct GotoSession {
    direction: Direction,
    start: Position,
    start_view_top: Position,
    final_pos: Position,
    prefer_relative_numbers: bool,
}

impl GotoSession {
    /// Open a session at the host's current cursor. Returns the session and
    /// the initial range-hint prompt.
    pub fn open(
        direction: Direction,
        prefer_relative_numbers: bool,
        host: &impl GotoHost,
    ) -> (Self, String) {
        let start = host.cursor();
        let (start_view_top, _) = host.visible_range();
        let hint = prompt::range_hint(direction, start, host);

        (
            Self {
                direction,
                start,
                start_view_top,
                final_pos: start,
                prefer_relative_numbers,
            },
            hint,
        )
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the caller should render relative line numbers while this
    /// session is open. Restoring the display afterwards is the caller's
    /// responsibility.
    pub fn prefer_relative_numbers(&self) -> bool {
        self.prefer_relative_numbers
    }

    /// The raw input was retyped; recompute the preview and return the
    /// prompt to display. Identical input against the same buffer produces
    /// the same prompt and the same host signals.
    pub fn value_changed<H: GotoHost>(&mut self, raw: &str, host: &mut H) -> String {
        // Highlights from earlier keystrokes must not outlive them.
        host.highlight_line(None);

        let Some(target) = self.sanitized(raw, host) else {
            return prompt::range_hint(self.direction, self.start, host);
        };

        if target.target.row != self.start.row {
            host.highlight_line(Some(target.target));
        }
        host.reveal(target.target, RevealMode::CenterIfOutside);

        prompt::describe_move(self.direction, &target)
    }

    /// Accept the input as typed. A valid target becomes the final position;
    /// anything else leaves the cursor where the session started, making an
    /// invalid commit indistinguishable from a cancel.
    pub fn commit<H: GotoHost>(mut self, raw: &str, host: &mut H) -> Position {
        if let Some(target) = self.sanitized(raw, host) {
            self.final_pos = target.target;
        }
        self.resolve(host)
    }

    /// Abandon the session, restoring the cursor and the viewport from
    /// before it opened.
    pub fn cancel<H: GotoHost>(self, host: &mut H) -> Position {
        host.reveal(self.start_view_top, RevealMode::AtTop);
        self.resolve(host)
    }

    fn resolve<H: GotoHost>(self, host: &mut H) -> Position {
        host.highlight_line(None);
        host.set_cursor(self.final_pos);
        host.reveal(self.final_pos, RevealMode::Default);
        self.final_pos
    }

    fn sanitized<H: GotoHost>(&self, raw: &str, host: &H) -> Option<SanitizedTarget> {
        sanitize::sanitize(self.direction, self.start, host, input::parse(raw))
    }
}
