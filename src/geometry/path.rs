//! Path commands from outline decomposers and polyline flattening.

use crate::color::EdgeColor;
use crate::math::Vec2;

use super::contour::Contour;
use super::segment::{Curve, EdgeSegment};
use super::shape::Shape;

const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// Drawing command as produced by font or vector outline decomposers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo(Vec2, Vec2),
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

#[derive(Default)]
struct ContourBuilder {
    start: Option<Vec2>,
    current: Vec2,
    edges: Vec<EdgeSegment>,
}

impl ContourBuilder {
    fn begin(&mut self, point: Vec2) {
        self.start = Some(point);
        self.current = point;
    }

    /// Returns false when there is no current point yet; the command then only moves.
    fn has_current(&mut self, point: Vec2) -> bool {
        if self.start.is_some() {
            return true;
        }
        self.begin(point);
        false
    }

    fn push(&mut self, edge: EdgeSegment) {
        self.current = edge.end();
        self.edges.push(edge);
    }

    fn finish(&mut self, contours: &mut Vec<Contour>) {
        if let Some(start) = self.start.take() {
            if !self.edges.is_empty() && self.current != start {
                self.edges
                    .push(EdgeSegment::linear(self.current, start, EdgeColor::WHITE));
            }
        }
        if !self.edges.is_empty() {
            contours.push(Contour::new(std::mem::take(&mut self.edges)));
        }
    }
}

impl Shape {
    /// Builds a shape from drawing commands.
    ///
    /// Every `MoveTo` or `Close` ends the current contour, open contours are closed with a
    /// straight line and zero-length lines are dropped. Segments start out WHITE.
    pub fn from_commands<I>(commands: I) -> Shape
    where
        I: IntoIterator<Item = PathCommand>,
    {
        let mut contours = Vec::new();
        let mut builder = ContourBuilder::default();
        for command in commands {
            match command {
                PathCommand::MoveTo(p) => {
                    builder.finish(&mut contours);
                    builder.begin(p);
                }
                PathCommand::LineTo(p) => {
                    if builder.has_current(p) && p != builder.current {
                        builder.push(EdgeSegment::linear(builder.current, p, EdgeColor::WHITE));
                    }
                }
                PathCommand::QuadTo(c, p) => {
                    if builder.has_current(p) {
                        builder.push(EdgeSegment::quadratic(
                            builder.current,
                            c,
                            p,
                            EdgeColor::WHITE,
                        ));
                    }
                }
                PathCommand::CubicTo(c1, c2, p) => {
                    if builder.has_current(p) {
                        builder.push(EdgeSegment::cubic(
                            builder.current,
                            c1,
                            c2,
                            p,
                            EdgeColor::WHITE,
                        ));
                    }
                }
                PathCommand::Close => builder.finish(&mut contours),
            }
        }
        builder.finish(&mut contours);
        Shape::new(contours)
    }
}

/// Flattens a closed contour into polyline vertices (the closing vertex is not repeated).
pub(crate) fn flatten_contour(contour: &Contour, tolerance: f64) -> Vec<Vec2> {
    let mut out = Vec::new();
    for edge in &contour.edges {
        out.push(edge.start());
        match *edge.curve() {
            Curve::Linear(_) => {}
            Curve::Quadratic([p0, p1, p2]) => flatten_quad(p0, p1, p2, tolerance, 0, &mut out),
            Curve::Cubic([p0, p1, p2, p3]) => {
                flatten_cubic(p0, p1, p2, p3, tolerance, 0, &mut out)
            }
        }
    }
    out
}

// Pushes interior vertices only; the end point is pushed by the next segment.
fn flatten_quad(p0: Vec2, p1: Vec2, p2: Vec2, tolerance: f64, depth: u32, out: &mut Vec<Vec2>) {
    if depth >= MAX_SUBDIVISION_DEPTH || distance_point_line(p1, p0, p2) <= tolerance {
        return;
    }

    let p01 = p0.lerp(p1, 0.5);
    let p12 = p1.lerp(p2, 0.5);
    let p012 = p01.lerp(p12, 0.5);

    flatten_quad(p0, p01, p012, tolerance, depth + 1, out);
    out.push(p012);
    flatten_quad(p012, p12, p2, tolerance, depth + 1, out);
}

fn flatten_cubic(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    tolerance: f64,
    depth: u32,
    out: &mut Vec<Vec2>,
) {
    let flat = distance_point_line(p1, p0, p3).max(distance_point_line(p2, p0, p3)) <= tolerance;
    if depth >= MAX_SUBDIVISION_DEPTH || flat {
        return;
    }

    let p01 = p0.lerp(p1, 0.5);
    let p12 = p1.lerp(p2, 0.5);
    let p23 = p2.lerp(p3, 0.5);
    let p012 = p01.lerp(p12, 0.5);
    let p123 = p12.lerp(p23, 0.5);
    let p0123 = p012.lerp(p123, 0.5);

    flatten_cubic(p0, p01, p012, p0123, tolerance, depth + 1, out);
    out.push(p0123);
    flatten_cubic(p0123, p123, p23, p3, tolerance, depth + 1, out);
}

fn distance_point_line(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len = ab.length();
    if len == 0.0 {
        ap.length()
    } else {
        ab.cross(ap).abs() / len
    }
}
