//! Placement of the floating calendar surface.
//!
//! The surface is measured off-screen first, then placed relative to the
//! trigger so that it stays inside the viewport whenever it fits at all.
//! When it fits nowhere it still opens below the trigger: a clipped calendar
//! beats a hidden one.

use serde::{Deserialize, Serialize};

/// Gap kept between the surface and the viewport edges.
pub const MARGIN: f64 = 8.0;

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

/// Viewport-relative bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Below,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizontal {
    /// Left edges aligned.
    Start,
    /// Right edges aligned.
    End,
    /// Pinned against the viewport's right margin.
    Clamped,
}

/// Where the surface goes, with the rule that put it there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl Position {
    /// Rectangle the surface occupies at this position.
    pub fn rect(&self, surface: Size) -> Rect {
        Rect::new(self.left, self.top, surface.width, surface.height)
    }
}

/// Places a `surface` next to `trigger` inside `viewport`.
///
/// Vertically the surface goes below the trigger when there is room for it
/// plus [`MARGIN`], otherwise above when there is room there, otherwise below
/// anyway. Horizontally it is left-aligned with the trigger when it fits,
/// otherwise right-aligned with it, otherwise pinned to
/// `max(MARGIN, viewport.width - surface.width - MARGIN)`.
///
/// ```
/// use agrilend_picker::{compute_position, Horizontal, Rect, Size, Vertical};
///
/// let trigger = Rect::new(900.0, 700.0, 200.0, 36.0);
/// let pos = compute_position(trigger, Size::new(300.0, 320.0), Size::new(1024.0, 768.0));
///
/// assert_eq!(pos.vertical, Vertical::Above);
/// assert_eq!(pos.top, 380.0);
/// assert_eq!(pos.horizontal, Horizontal::End);
/// assert_eq!(pos.left, 800.0);
/// ```
pub fn compute_position(trigger: Rect, surface: Size, viewport: Size) -> Position {
    let space_below = viewport.height - trigger.bottom();
    let space_above = trigger.top;

    let (top, vertical) = if space_below >= surface.height + MARGIN {
        (trigger.bottom(), Vertical::Below)
    } else if space_above >= surface.height + MARGIN {
        (trigger.top - surface.height, Vertical::Above)
    } else {
        (trigger.bottom(), Vertical::Below)
    };

    let space_right = viewport.width - trigger.left;
    let right_aligned = trigger.right() - surface.width;

    let (left, horizontal) = if space_right >= surface.width + MARGIN {
        (trigger.left, Horizontal::Start)
    } else if right_aligned >= MARGIN {
        (right_aligned, Horizontal::End)
    } else {
        (
            MARGIN.max(viewport.width - surface.width - MARGIN),
            Horizontal::Clamped,
        )
    };

    log::trace!("placed {vertical:?}/{horizontal:?} at ({left}, {top})");

    Position {
        left,
        top,
        vertical,
        horizontal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size {
        width: 1024.0,
        height: 768.0,
    };
    const CALENDAR: Size = Size {
        width: 300.0,
        height: 320.0,
    };

    #[test]
    fn prefers_below_and_left_aligned() {
        let trigger = Rect::new(100.0, 50.0, 200.0, 36.0);
        let pos = compute_position(trigger, CALENDAR, VIEWPORT);
        assert_eq!(pos.vertical, Vertical::Below);
        assert_eq!(pos.top, 86.0);
        assert_eq!(pos.horizontal, Horizontal::Start);
        assert_eq!(pos.left, 100.0);
    }

    #[test]
    fn flips_above_near_the_bottom() {
        let trigger = Rect::new(100.0, 600.0, 200.0, 36.0);
        let pos = compute_position(trigger, CALENDAR, VIEWPORT);
        assert_eq!(pos.vertical, Vertical::Above);
        assert_eq!(pos.top, 280.0);
    }

    #[test]
    fn margin_counts_against_space_below() {
        // Exactly height + margin below.
        let trigger = Rect::new(0.0, 404.0, 100.0, 36.0);
        let pos = compute_position(trigger, CALENDAR, VIEWPORT);
        assert_eq!(pos.vertical, Vertical::Below);

        let trigger = Rect::new(0.0, 405.0, 100.0, 36.0);
        let pos = compute_position(trigger, CALENDAR, VIEWPORT);
        assert_eq!(pos.vertical, Vertical::Above);
    }

    #[test]
    fn falls_back_to_below_when_nothing_fits() {
        let small = Size::new(400.0, 300.0);
        let trigger = Rect::new(10.0, 120.0, 100.0, 36.0);
        let pos = compute_position(trigger, CALENDAR, small);
        assert_eq!(pos.vertical, Vertical::Below);
        assert_eq!(pos.top, 156.0);
    }

    #[test]
    fn right_aligns_near_the_right_edge() {
        let trigger = Rect::new(900.0, 50.0, 100.0, 36.0);
        let pos = compute_position(trigger, CALENDAR, VIEWPORT);
        assert_eq!(pos.horizontal, Horizontal::End);
        assert_eq!(pos.left, 700.0);
    }

    #[test]
    fn clamps_when_neither_alignment_fits() {
        let narrow = Size::new(320.0, 768.0);
        let trigger = Rect::new(200.0, 50.0, 60.0, 36.0);
        let pos = compute_position(trigger, CALENDAR, narrow);
        assert_eq!(pos.horizontal, Horizontal::Clamped);
        assert_eq!(pos.left, 12.0);

        let tiny = Size::new(200.0, 768.0);
        let pos = compute_position(trigger, CALENDAR, tiny);
        assert_eq!(pos.left, MARGIN);
    }

    #[test]
    fn rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 30.0)));
        assert!(!r.contains(Point::new(9.9, 15.0)));
    }
}
