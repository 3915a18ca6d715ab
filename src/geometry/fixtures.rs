//! Shapes shared by unit tests.

use crate::color::EdgeColor;
use crate::math::Vec2;

use super::{Contour, EdgeSegment, Shape};

/// Closed polygon through `points` in the given order.
pub(crate) fn polygon(points: &[(f64, f64)]) -> Contour {
    let n = points.len();
    Contour::new(
        (0..n)
            .map(|i| {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % n];
                EdgeSegment::linear(Vec2::new(ax, ay), Vec2::new(bx, by), EdgeColor::WHITE)
            })
            .collect(),
    )
}

/// Counter-clockwise axis-aligned square.
pub(crate) fn square(x: f64, y: f64, size: f64) -> Contour {
    polygon(&[(x, y), (x + size, y), (x + size, y + size), (x, y + size)])
}

/// Unit square outline at the origin.
pub(crate) fn unit_square() -> Shape {
    Shape::new(vec![square(0.0, 0.0, 1.0)])
}

/// Counter-clockwise circle made of four quadratic arcs through the exact quadrant
/// midpoints. Segments are WHITE.
pub(crate) fn circle(center: Vec2, radius: f64) -> Shape {
    let k = std::f64::consts::SQRT_2 - 0.5;
    let quadrant = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];
    let edges = (0..4)
        .map(|i| {
            let (ax, ay) = quadrant[i];
            let (bx, by) = quadrant[(i + 1) % 4];
            let control = Vec2::new(ax + bx, ay + by) * k;
            EdgeSegment::quadratic(
                center + Vec2::new(ax, ay) * radius,
                center + control * radius,
                center + Vec2::new(bx, by) * radius,
                EdgeColor::WHITE,
            )
        })
        .collect();
    Shape::new(vec![Contour::new(edges)])
}

/// Glyph-like outline: a triangle with sharp corners and a triangular hole.
pub(crate) fn triangle_with_hole() -> Shape {
    Shape::new(vec![
        polygon(&[(0.0, 0.0), (4.0, 0.0), (2.0, 3.5)]),
        polygon(&[(1.5, 1.0), (2.0, 2.0), (2.5, 1.0)]),
    ])
}
