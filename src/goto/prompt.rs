use crate::goto::Direction;
use crate::goto::sanitize::{self, BufferShape, SanitizedTarget};
use crate::model::cursor::Position;

/// Prompt shown while no valid input has been typed: where the cursor is,
/// and the inclusive signed range of offsets the buffer accepts.
pub fn range_hint(
    direction: Direction,
    current: Position,
    buffer: &impl BufferShape,
) -> String {
    let last_row = buffer.line_count() as i64 - 1;
    let (backward, forward) = sanitize::offset_limits(direction, current.row as i64, last_row);

    format!(
        "Current line: {}, character: {}. Type a number between {} and {} to navigate {} by.",
        current.row + 1,
        current.col + 1,
        backward,
        forward,
        direction.label(),
    )
}

/// Prompt describing a valid move. A negative line count flips the
/// displayed direction word; the magnitude is always shown unsigned.
pub fn describe_move(direction: Direction, target: &SanitizedTarget) -> String {
    let shown = if target.lines < 0 {
        direction.flipped()
    } else {
        direction
    };
    let magnitude = target.lines.unsigned_abs();

    if target.column.is_none() {
        format!(
            "Go {} {} line{} (to line {})",
            shown.label(),
            magnitude,
            plural(magnitude),
            target.target.row + 1,
        )
    } else {
        format!(
            "Go {} {} line{} (to line {} and character {}).",
            shown.label(),
            magnitude,
            plural(magnitude),
            target.target.row + 1,
            target.target.col + 1,
        )
    }
}

fn plural(n: u64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shape(usize);

    impl BufferShape for Shape {
        fn line_count(&self) -> usize {
            self.0
        }

        fn line_len(&self, _row: usize) -> usize {
            10
        }
    }

    fn at(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    fn target(lines: i64, column: Option<usize>, row: usize, col: usize) -> SanitizedTarget {
        SanitizedTarget {
            lines,
            column,
            target: at(row, col),
        }
    }

    #[test]
    fn hint_renders_smaller_limit_first_going_up() {
        assert_eq!(
            range_hint(Direction::Up, at(5, 3), &Shape(10)),
            "Current line: 6, character: 4. Type a number between -4 and 5 to navigate up by."
        );
    }

    #[test]
    fn hint_renders_smaller_limit_first_going_down() {
        assert_eq!(
            range_hint(Direction::Down, at(5, 3), &Shape(10)),
            "Current line: 6, character: 4. Type a number between -5 and 4 to navigate down by."
        );
    }

    #[test]
    fn move_without_column() {
        assert_eq!(
            describe_move(Direction::Up, &target(3, None, 2, 3)),
            "Go up 3 lines (to line 3)"
        );
    }

    #[test]
    fn move_with_column() {
        assert_eq!(
            describe_move(Direction::Down, &target(2, Some(5), 7, 4)),
            "Go down 2 lines (to line 8 and character 5)."
        );
    }

    #[test]
    fn single_line_is_not_pluralized() {
        assert_eq!(
            describe_move(Direction::Down, &target(1, None, 6, 0)),
            "Go down 1 line (to line 7)"
        );
    }

    #[test]
    fn negative_input_flips_the_direction_word() {
        assert_eq!(
            describe_move(Direction::Up, &target(-2, None, 7, 0)),
            "Go down 2 lines (to line 8)"
        );
        assert_eq!(
            describe_move(Direction::Down, &target(-2, None, 3, 0)),
            "Go up 2 lines (to line 4)"
        );
    }

    #[test]
    fn zero_keeps_the_session_direction_word() {
        assert_eq!(
            describe_move(Direction::Up, &target(0, None, 5, 0)),
            "Go up 0 lines (to line 6)"
        );
    }
}
