use serde::Serialize;

/// A point in screen space (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Linearly remap `value` from `[from_min, from_max]` onto `[to_min, to_max]`.
///
/// No clamping: values outside the source range extrapolate. The ranges may
/// be reversed (`from_min > from_max`), which is how the growth rules map
/// "colder" onto "larger".
pub fn interp(value: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    to_min + (value - from_min) * (to_max - to_min) / (from_max - from_min)
}

/// Rotate `point` about `center` by `angle` radians.
///
/// Positive angles turn counter-clockwise as seen on screen.
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point {
        x: dx * cos + dy * sin + center.x,
        y: -(dx * sin) + dy * cos + center.y,
    }
}

/// Rotate both endpoints of a segment about `center`.
pub fn rotate_segment(segment: (Point, Point), center: Point, angle: f64) -> (Point, Point) {
    (
        rotate_point(segment.0, center, angle),
        rotate_point(segment.1, center, angle),
    )
}
