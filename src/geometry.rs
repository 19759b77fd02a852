// SPDX-License-Identifier: MPL-2.0
//! Integer diagram geometry: points, sizes, rectangles and angle helpers.
//!
//! Shape coordinates are whole diagram units; rotation angles are stored in
//! tenths of a degree so that common fractions (22.5°, 0.1°) survive
//! serialization without float drift.

/// Full turn in tenths of a degree.
pub const FULL_TURN_TENTHS: i32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned integer rectangle; `right`/`bottom` are exclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Corner points in clockwise order starting at the top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }

    pub fn offset(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }
}

/// Converts a tenths-of-degree angle to degrees.
#[must_use]
pub fn tenths_of_degree_to_degrees(angle: i32) -> f32 {
    angle as f32 / 10.0
}

/// Normalizes a tenths-of-degree angle into `0..3600`.
#[must_use]
pub fn normalize_angle(angle: i32) -> i32 {
    ((angle % FULL_TURN_TENTHS) + FULL_TURN_TENTHS) % FULL_TURN_TENTHS
}

/// Rotates `point` around `center` by `degrees`, rounding to whole units.
///
/// Positive angles rotate clockwise in the diagram's y-down coordinate
/// system, matching the texture transforms built for rendering.
#[must_use]
pub fn rotate_point(center: Point, degrees: f32, point: Point) -> Point {
    if degrees == 0.0 {
        return point;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = (point.x - center.x) as f32;
    let dy = (point.y - center.y) as f32;
    Point {
        x: center.x + (dx * cos - dy * sin).round() as i32,
        y: center.y + (dx * sin + dy * cos).round() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_corners_are_clockwise_from_top_left() {
        let r = Rect::new(-100, -75, 200, 150);
        let c = r.corners();
        assert_eq!(c[0], Point::new(-100, -75));
        assert_eq!(c[1], Point::new(100, -75));
        assert_eq!(c[2], Point::new(100, 75));
        assert_eq!(c[3], Point::new(-100, 75));
    }

    #[test]
    fn rotate_point_quarter_turn() {
        let p = rotate_point(Point::new(0, 0), 90.0, Point::new(10, 0));
        assert_eq!(p, Point::new(0, 10));
    }

    #[test]
    fn rotate_point_around_offset_center() {
        let p = rotate_point(Point::new(100, 100), 180.0, Point::new(110, 100));
        assert_eq!(p, Point::new(90, 100));
    }

    #[test]
    fn rotate_point_zero_angle_is_identity() {
        let p = Point::new(3, -7);
        assert_eq!(rotate_point(Point::new(50, 50), 0.0, p), p);
    }

    #[test]
    fn tenths_of_degree_conversion() {
        assert!((tenths_of_degree_to_degrees(450) - 45.0).abs() < f32::EPSILON);
        assert!((tenths_of_degree_to_degrees(1) - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn normalize_angle_wraps_both_directions() {
        assert_eq!(normalize_angle(3700), 100);
        assert_eq!(normalize_angle(-100), 3500);
        assert_eq!(normalize_angle(0), 0);
        assert_eq!(normalize_angle(3600), 0);
    }
}
