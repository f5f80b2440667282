use crate::goto::Direction;
use crate::goto::input::ParsedInput;
use crate::model::cursor::Position;

/// Read-only buffer view: just enough shape for goto computation.
pub trait BufferShape {
    fn line_count(&self) -> usize;
    /// Length of a line in characters, without its trailing newline.
    fn line_len(&self, row: usize) -> usize;
}

/// A goto target that is known to lie inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizedTarget {
    /// Signed line offset as typed; negative means "against the session
    /// direction".
    pub lines: i64,
    /// Clamped 1-based column, present only when the user asked for one.
    pub column: Option<usize>,
    pub target: Position,
}

/// Validate and clamp parsed input into an in-bounds target position.
///
/// Returns `None` when there is no line number yet or the offset would
/// leave the buffer. That is the whole failure model: nothing here panics
/// or reports an error, because half-typed input is the normal state of a
/// goto session.
pub fn sanitize(
    direction: Direction,
    current: Position,
    buffer: &impl BufferShape,
    parsed: ParsedInput,
) -> Option<SanitizedTarget> {
    let lines = parsed.lines?;

    let row = current.row as i64;
    let last_row = buffer.line_count() as i64 - 1;

    let (backward, forward) = offset_limits(direction, row, last_row);
    if lines < backward || lines > forward {
        return None;
    }

    let target_row = match direction {
        Direction::Up => row - lines,
        Direction::Down => row + lines,
    } as usize;
    let target_len = buffer.line_len(target_row);

    let Some(column) = parsed.column else {
        // No explicit column: keep the visual column, clamped to the target
        // line's end.
        return Some(SanitizedTarget {
            lines,
            column: None,
            target: Position {
                row: target_row,
                col: current.col.min(target_len),
            },
        });
    };

    // Columns are absolute and 1-based. Out-of-range values clamp rather
    // than reject, with line end + 1 as the trailing insertion point.
    let column = column.clamp(1, target_len as i64 + 1) as usize;

    Some(SanitizedTarget {
        lines,
        column: Some(column),
        target: Position {
            row: target_row,
            col: column - 1,
        },
    })
}

/// Inclusive signed range `[backward, forward]` of line offsets that keep
/// the target inside `[0, last_row]`. Positive offsets move with the
/// direction, negative ones against it.
pub(crate) fn offset_limits(direction: Direction, row: i64, last_row: i64) -> (i64, i64) {
    match direction {
        Direction::Up => (row - last_row, row),
        Direction::Down => (-row, last_row - row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goto::input;

    /// Buffer shape backed by a list of line lengths.
    struct Shape(Vec<usize>);

    impl BufferShape for Shape {
        fn line_count(&self) -> usize {
            self.0.len()
        }

        fn line_len(&self, row: usize) -> usize {
            self.0[row]
        }
    }

    fn ten_lines() -> Shape {
        // Line 2 is 5 chars long, line 8 is empty; the rest are roomy.
        Shape(vec![10, 10, 5, 10, 10, 10, 10, 10, 0, 10])
    }

    fn at(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    #[test]
    fn three_up_from_line_five() {
        let target = sanitize(
            Direction::Up,
            at(5, 3),
            &ten_lines(),
            input::parse("3"),
        )
        .unwrap();

        assert_eq!(target.lines, 3);
        assert_eq!(target.column, None);
        assert_eq!(target.target, at(2, 3));
    }

    #[test]
    fn visual_column_clamps_to_short_line() {
        // Line 2 only has 5 chars; a cursor at col 9 lands on its end.
        let target = sanitize(
            Direction::Up,
            at(5, 9),
            &ten_lines(),
            input::parse("3"),
        )
        .unwrap();

        assert_eq!(target.target, at(2, 5));
        assert_eq!(target.column, None);
    }

    #[test]
    fn explicit_column_clamps_to_insertion_point() {
        let target = sanitize(
            Direction::Up,
            at(5, 3),
            &ten_lines(),
            input::parse("3,100"),
        )
        .unwrap();

        // Line 2 is 5 chars, so column clamps to 6 (one past the end).
        assert_eq!(target.column, Some(6));
        assert_eq!(target.target, at(2, 5));
    }

    #[test]
    fn explicit_column_low_values_clamp_to_one() {
        for raw in ["3,0", "3,-7", "3,1"] {
            let target = sanitize(
                Direction::Up,
                at(5, 3),
                &ten_lines(),
                input::parse(raw),
            )
            .unwrap();
            assert_eq!(target.column, Some(1), "raw input {raw:?}");
            assert_eq!(target.target, at(2, 0));
        }
    }

    #[test]
    fn filler_tokens_do_not_change_the_result() {
        let buffer = ten_lines();
        let plain = sanitize(Direction::Up, at(5, 3), &buffer, input::parse("3"));
        let noisy = sanitize(Direction::Up, at(5, 3), &buffer, input::parse("abc:3:xyz"));
        assert_eq!(plain, noisy);
    }

    #[test]
    fn absent_lines_is_absent_target() {
        assert_eq!(
            sanitize(Direction::Up, at(5, 3), &ten_lines(), input::parse("abc")),
            None
        );
    }

    #[test]
    fn down_past_the_last_line_is_rejected() {
        // From line 8 of 10, the forward limit going down is 1.
        assert_eq!(
            sanitize(Direction::Down, at(8, 0), &ten_lines(), input::parse("5")),
            None
        );
        assert!(sanitize(Direction::Down, at(8, 0), &ten_lines(), input::parse("1")).is_some());
    }

    #[test]
    fn every_in_range_offset_lands_in_bounds() {
        let buffer = ten_lines();
        let last_row = buffer.line_count() as i64 - 1;

        for direction in [Direction::Up, Direction::Down] {
            for row in 0..buffer.line_count() {
                let (backward, forward) = offset_limits(direction, row as i64, last_row);
                for lines in backward..=forward {
                    let parsed = input::parse(&lines.to_string());
                    let target = sanitize(direction, at(row, 2), &buffer, parsed)
                        .unwrap_or_else(|| panic!("{direction:?} {lines} from row {row}"));
                    assert!(target.target.row < buffer.line_count());
                    assert!(target.target.col <= buffer.line_len(target.target.row));
                }

                // One step past either limit is rejected.
                for lines in [backward - 1, forward + 1] {
                    let parsed = input::parse(&lines.to_string());
                    assert_eq!(sanitize(direction, at(row, 2), &buffer, parsed), None);
                }
            }
        }
    }

    #[test]
    fn column_clamp_matches_the_contract() {
        // Resulting 0-based col is clamp(c - 1, 0, line_len).
        let buffer = ten_lines();
        for c in -3i64..=15 {
            let parsed = input::parse(&format!("3,{c}"));
            let target = sanitize(Direction::Up, at(5, 3), &buffer, parsed).unwrap();
            let expected = (c - 1).clamp(0, buffer.line_len(2) as i64) as usize;
            assert_eq!(target.target.col, expected, "column input {c}");
        }
    }

    #[test]
    fn negative_input_reverses_direction() {
        let buffer = ten_lines();
        for k in 1..=4i64 {
            let down = sanitize(
                Direction::Down,
                at(5, 3),
                &buffer,
                input::parse(&format!("-{k}")),
            )
            .unwrap();
            let up = sanitize(Direction::Up, at(5, 3), &buffer, input::parse(&k.to_string()))
                .unwrap();
            assert_eq!(down.target, up.target, "offset {k}");
        }
    }

    #[test]
    fn sanitize_is_idempotent() {
        let buffer = ten_lines();
        let parsed = input::parse("3,4");
        let first = sanitize(Direction::Up, at(5, 3), &buffer, parsed);
        let second = sanitize(Direction::Up, at(5, 3), &buffer, parsed);
        assert_eq!(first, second);
    }

    #[test]
    fn single_line_buffer_only_accepts_zero() {
        let buffer = Shape(vec![4]);
        assert!(sanitize(Direction::Down, at(0, 2), &buffer, input::parse("0")).is_some());
        assert_eq!(
            sanitize(Direction::Down, at(0, 2), &buffer, input::parse("1")),
            None
        );
        assert_eq!(
            sanitize(Direction::Up, at(0, 2), &buffer, input::parse("1")),
            None
        );
    }
}
