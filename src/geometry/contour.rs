use crate::math::{sign, Vec2};

use super::segment::{Curve, EdgeSegment};
use super::equation::{solve_cubic, solve_quadratic};

/// Closed loop of segments; the end of each segment is the start of the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub edges: Vec<EdgeSegment>,
}

impl Contour {
    pub fn new(edges: Vec<EdgeSegment>) -> Self {
        Self { edges }
    }

    pub fn add_edge(&mut self, edge: EdgeSegment) {
        self.edges.push(edge);
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Index of the first segment whose end is not the start of its successor.
    pub fn first_gap(&self) -> Option<usize> {
        let n = self.edges.len();
        (0..n).find(|&i| self.edges[i].end() != self.edges[(i + 1) % n].start())
    }

    /// Orientation: -1 for counter-clockwise outlines, +1 for clockwise holes, 0 when degenerate.
    pub fn winding(&self) -> i32 {
        let mut total = 0.0;
        match self.edges.as_slice() {
            [] => return 0,
            [edge] => {
                let a = edge.point(0.0);
                let b = edge.point(1.0 / 3.0);
                let c = edge.point(2.0 / 3.0);
                total += shoelace(a, b) + shoelace(b, c) + shoelace(c, a);
            }
            [first, second] => {
                let a = first.point(0.0);
                let b = first.point(0.5);
                let c = second.point(0.0);
                let d = second.point(0.5);
                total += shoelace(a, b) + shoelace(b, c) + shoelace(c, d) + shoelace(d, a);
            }
            edges => {
                let mut prev = edges[edges.len() - 1].point(0.0);
                for edge in edges {
                    let cur = edge.point(0.0);
                    total += shoelace(prev, cur);
                    prev = cur;
                }
            }
        }
        sign(total)
    }

    /// Signed crossing count of a +X ray from `point`; counter-clockwise loops count +1.
    pub fn winding_number(&self, point: Vec2) -> i32 {
        self.edges
            .iter()
            .map(|edge| segment_crossings(edge, point))
            .sum()
    }

    /// Axis-aligned bounds of all segments, `None` for an empty contour.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        self.edges.iter().map(EdgeSegment::bounds).reduce(|(min_a, max_a), (min_b, max_b)| {
            (min_a.min(min_b), max_a.max(max_b))
        })
    }

    /// Same loop traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            edges: self.edges.iter().rev().map(EdgeSegment::reversed).collect(),
        }
    }
}

fn shoelace(a: Vec2, b: Vec2) -> f64 {
    (b.x - a.x) * (a.y + b.y)
}

/// Crossings of the +X ray from `pt` with one segment. Parameters are taken half-open
/// (`0 <= t < 1`) so a ray through a shared vertex counts once.
fn segment_crossings(edge: &EdgeSegment, pt: Vec2) -> i32 {
    match *edge.curve() {
        Curve::Linear([p0, p1]) => {
            let upward = p0.y <= pt.y && p1.y > pt.y;
            let downward = p1.y <= pt.y && p0.y > pt.y;
            if !upward && !downward {
                return 0;
            }
            let t = (pt.y - p0.y) / (p1.y - p0.y);
            if p0.x + t * (p1.x - p0.x) > pt.x {
                if upward {
                    1
                } else {
                    -1
                }
            } else {
                0
            }
        }
        Curve::Quadratic([p0, p1, p2]) => {
            let a = p0.y - 2.0 * p1.y + p2.y;
            let b = 2.0 * (p1.y - p0.y);
            let mut roots = [0.0f64; 2];
            let count = solve_quadratic(a, b, p0.y - pt.y, &mut roots);
            let mut winding = 0;
            for &t in &roots[..count] {
                if (0.0..1.0).contains(&t) && edge.point(t).x > pt.x {
                    let slope = 2.0 * a * t + b;
                    winding += sign(slope);
                }
            }
            winding
        }
        Curve::Cubic([p0, p1, p2, p3]) => {
            let a = -p0.y + 3.0 * p1.y - 3.0 * p2.y + p3.y;
            let b = 3.0 * p0.y - 6.0 * p1.y + 3.0 * p2.y;
            let c = 3.0 * (p1.y - p0.y);
            let mut roots = [0.0f64; 3];
            let count = solve_cubic(a, b, c, p0.y - pt.y, &mut roots);
            let mut winding = 0;
            for &t in &roots[..count] {
                if (0.0..1.0).contains(&t) && edge.point(t).x > pt.x {
                    let slope = 3.0 * a * t * t + 2.0 * b * t + c;
                    winding += sign(slope);
                }
            }
            winding
        }
    }
}
