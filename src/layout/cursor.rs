//! Row-packing cursor
//!
//! The cursor is a plain value: each step takes the previous cursor and the
//! next item's footprint and returns the new cursor together with the item's
//! origin. Nothing is mutated behind the caller's back, so the transition can
//! be tested in isolation.

use serde_json::Value;

use crate::size::Size;

/// A 2D point in document coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Author-supplied filmstrip signal from the `frame` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHint {
    /// Column missing, null or empty
    Absent,
    /// Frame 1: the start of a filmstrip
    First,
    /// Any later frame: stays on the current row
    Continue,
}

impl FrameHint {
    /// Interpret a `frame` cell
    ///
    /// Numbers and numeric strings equal to 1 are [`FrameHint::First`];
    /// surrounding whitespace is ignored for strings.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => FrameHint::Absent,
            Some(Value::String(s)) if s.is_empty() => FrameHint::Absent,
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(n) if n == 1.0 => FrameHint::First,
                _ => FrameHint::Continue,
            },
            Some(Value::Number(n)) if n.as_f64() == Some(1.0) => FrameHint::First,
            Some(_) => FrameHint::Continue,
        }
    }

    /// Whether a same-size item with this hint still starts a new row
    pub fn starts_row(self) -> bool {
        !matches!(self, FrameHint::Continue)
    }
}

/// Compute the origin of the next item
///
/// Wraps to a new row (`x = 0`, `y` advanced by the previous height plus the
/// gap) when the footprint changes in both dimensions, or when the frame hint
/// does not continue a filmstrip. Otherwise moves right by the item's width
/// plus the gap on the same row.
pub fn next_position(prev: Size, current: Size, gap: f64, frame: FrameHint, at: Point) -> Point {
    let resized = prev.width != current.width && prev.height != current.height;

    if resized || frame.starts_row() {
        return Point::new(0.0, at.y + prev.height + gap);
    }

    Point::new(at.x + current.width + gap, at.y)
}

/// Layout state threaded through the row loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub prev_width: f64,
    pub prev_height: f64,
    pub x: f64,
    pub y: f64,
}

impl LayoutCursor {
    /// Seed the cursor from the first item
    ///
    /// The position starts one gap outside the origin so that the first
    /// wrap lands the first item exactly at `(0, 0)`.
    pub fn seed(first: Size, gap: f64) -> Self {
        Self {
            prev_width: first.width,
            prev_height: first.height,
            x: -first.width - gap,
            y: -first.height - gap,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Place one item and return the updated cursor with its origin
    pub fn advance(self, size: Size, frame: FrameHint, gap: f64) -> (Self, Point) {
        let prev = Size::new(self.prev_width, self.prev_height);
        let at = next_position(prev, size, gap, frame, self.position());

        tracing::debug!(
            width = size.width,
            height = size.height,
            ?frame,
            x = at.x,
            y = at.y,
            "placed item"
        );

        let next = Self {
            prev_width: size.width,
            prev_height: size.height,
            x: at.x,
            y: at.y,
        };
        (next, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GAP: f64 = 20.0;

    #[test]
    fn test_seed_is_one_gap_outside_origin() {
        let cursor = LayoutCursor::seed(Size::new(300.0, 250.0), GAP);
        assert_eq!(
            cursor,
            LayoutCursor {
                prev_width: 300.0,
                prev_height: 250.0,
                x: -320.0,
                y: -270.0
            }
        );
    }

    #[test]
    fn test_filmstrip_sequence() {
        let cursor = LayoutCursor::seed(Size::new(300.0, 250.0), GAP);

        let (cursor, first) = cursor.advance(Size::new(300.0, 250.0), FrameHint::First, GAP);
        assert_eq!(first, Point::new(0.0, 0.0));

        let (cursor, second) = cursor.advance(Size::new(300.0, 250.0), FrameHint::Continue, GAP);
        assert_eq!(second, Point::new(320.0, 0.0));

        let (cursor, third) = cursor.advance(Size::new(160.0, 600.0), FrameHint::First, GAP);
        assert_eq!(third, Point::new(0.0, 270.0));
        assert_eq!(cursor.prev_width, 160.0);
        assert_eq!(cursor.prev_height, 600.0);
    }

    #[test]
    fn test_size_change_wraps_even_when_continuing() {
        let at = next_position(
            Size::new(300.0, 250.0),
            Size::new(160.0, 600.0),
            GAP,
            FrameHint::Continue,
            Point::new(320.0, 0.0),
        );
        assert_eq!(at, Point::new(0.0, 270.0));
    }

    #[test]
    fn test_single_dimension_change_continues_row() {
        // Only the height differs, so a continuing frame stays on the row
        let at = next_position(
            Size::new(300.0, 250.0),
            Size::new(300.0, 600.0),
            GAP,
            FrameHint::Continue,
            Point::new(0.0, 0.0),
        );
        assert_eq!(at, Point::new(320.0, 0.0));
    }

    #[test]
    fn test_absent_frame_wraps() {
        let at = next_position(
            Size::new(300.0, 250.0),
            Size::new(300.0, 250.0),
            GAP,
            FrameHint::Absent,
            Point::new(320.0, 0.0),
        );
        assert_eq!(at, Point::new(0.0, 270.0));
    }

    #[test]
    fn test_wrap_uses_previous_height() {
        let at = next_position(
            Size::new(728.0, 90.0),
            Size::new(300.0, 250.0),
            GAP,
            FrameHint::First,
            Point::new(0.0, 100.0),
        );
        assert_eq!(at, Point::new(0.0, 210.0));
    }

    #[test]
    fn test_frame_hint_from_value() {
        assert_eq!(FrameHint::from_value(None), FrameHint::Absent);
        assert_eq!(FrameHint::from_value(Some(&json!(null))), FrameHint::Absent);
        assert_eq!(FrameHint::from_value(Some(&json!(""))), FrameHint::Absent);
        assert_eq!(FrameHint::from_value(Some(&json!(1))), FrameHint::First);
        assert_eq!(FrameHint::from_value(Some(&json!("1"))), FrameHint::First);
        assert_eq!(FrameHint::from_value(Some(&json!(" 1 "))), FrameHint::First);
        assert_eq!(FrameHint::from_value(Some(&json!(1.0))), FrameHint::First);
        assert_eq!(FrameHint::from_value(Some(&json!(2))), FrameHint::Continue);
        assert_eq!(FrameHint::from_value(Some(&json!("3"))), FrameHint::Continue);
        assert_eq!(FrameHint::from_value(Some(&json!("b"))), FrameHint::Continue);
    }

    #[test]
    fn test_starts_row() {
        assert!(FrameHint::Absent.starts_row());
        assert!(FrameHint::First.starts_row());
        assert!(!FrameHint::Continue.starts_row());
    }
}
