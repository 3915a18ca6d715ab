use serde::{Deserialize, Serialize};

use crate::error::ShapeError;
use crate::math::{Mat3, Vec2};

use super::contour::Contour;
use super::path::flatten_contour;
use super::segment::EdgeSegment;

// Flattening tolerance for topology checks, relative to the shape's bounding diagonal.
const TOPOLOGY_TOLERANCE: f64 = 1.0e-3;

/// Handle to one segment of a shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId {
    pub contour: usize,
    pub segment: usize,
}

/// Vector outline made of closed contours. Geometry operations return new shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub contours: Vec<Contour>,
}

impl Shape {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    pub fn add_contour(&mut self, contour: Contour) {
        self.contours.push(contour);
    }

    /// Looks up a segment by handle.
    pub fn segment(&self, id: SegmentId) -> Option<&EdgeSegment> {
        self.contours.get(id.contour)?.edges.get(id.segment)
    }

    /// Total number of segments.
    pub fn edge_count(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Checks that every non-empty contour is closed and every control point finite.
    pub fn validate(&self) -> Result<(), ShapeError> {
        for (contour_index, contour) in self.contours.iter().enumerate() {
            if let Some(segment) = contour.edges.iter().position(|edge| !edge.is_finite()) {
                return Err(ShapeError::NonFinitePoint {
                    contour: contour_index,
                    segment,
                });
            }
            if let Some(segment) = contour.first_gap() {
                return Err(ShapeError::OpenContour {
                    contour: contour_index,
                    segment,
                });
            }
        }
        Ok(())
    }

    /// Rejects degenerate and self-intersecting contours, and top-level contours that are
    /// not outlines. Unless `allow_overlaps` is set, also rejects contours crossing each
    /// other and nested contours whose orientation does not match their depth (even depth
    /// must be an outline, odd depth a hole).
    pub fn check_topology(&self, allow_overlaps: bool) -> Result<(), ShapeError> {
        let tolerance = self
            .bounds()
            .map(|(min, max)| (max - min).length() * TOPOLOGY_TOLERANCE)
            .unwrap_or(0.0);
        let polylines: Vec<Option<Vec<Vec2>>> = self
            .contours
            .iter()
            .map(|contour| (!contour.is_empty()).then(|| flatten_contour(contour, tolerance)))
            .collect();

        for (index, contour) in self.contours.iter().enumerate() {
            let Some(polyline) = &polylines[index] else {
                continue;
            };
            if contour.winding() == 0 {
                return Err(ShapeError::DegenerateContour { contour: index });
            }
            if polyline_self_intersects(polyline) {
                return Err(ShapeError::SelfIntersection { contour: index });
            }
        }
        if !allow_overlaps {
            for first in 0..polylines.len() {
                for second in first + 1..polylines.len() {
                    if let (Some(a), Some(b)) = (&polylines[first], &polylines[second]) {
                        if polylines_cross(a, b) {
                            return Err(ShapeError::CrossingContours { first, second });
                        }
                    }
                }
            }
        }

        for (index, contour) in self.contours.iter().enumerate() {
            let Some(polyline) = &polylines[index] else {
                continue;
            };
            let anchor = polyline[0];
            let depth = polylines
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .filter_map(|(_, other)| other.as_ref())
                .filter(|other| polygon_contains(other, anchor))
                .count();
            // Overlapping outlines may nest at any depth, but nothing encloses a
            // top-level contour, so it must be an outline.
            if allow_overlaps && depth > 0 {
                continue;
            }
            let winding = contour.winding();
            let expected = if depth % 2 == 0 { -1 } else { 1 };
            if winding != expected {
                return Err(ShapeError::InconsistentWinding {
                    contour: index,
                    depth,
                    winding,
                });
            }
        }
        Ok(())
    }

    /// Non-zero winding number of all contours at `point`.
    pub fn winding_number(&self, point: Vec2) -> i32 {
        self.contours.iter().map(|c| c.winding_number(point)).sum()
    }

    /// True when `point` is inside the filled outline (non-zero rule).
    pub fn contains(&self, point: Vec2) -> bool {
        self.winding_number(point) != 0
    }

    /// Axis-aligned bounds of all segments, `None` for an empty shape.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        self.contours
            .iter()
            .filter_map(Contour::bounds)
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
    }

    /// Copy with every control point mapped through `transform`. Mirroring transforms
    /// reverse the contours so outlines stay outlines.
    pub fn transformed(&self, transform: &Mat3) -> Shape {
        let mirrored = transform.determinant() < 0.0;
        let contours = self
            .contours
            .iter()
            .map(|contour| {
                let mapped = Contour::new(
                    contour
                        .edges
                        .iter()
                        .map(|edge| edge.transformed(transform))
                        .collect(),
                );
                if mirrored {
                    mapped.reversed()
                } else {
                    mapped
                }
            })
            .collect();
        Shape::new(contours)
    }

    /// Copy scaled about the origin.
    pub fn scaled(&self, scale: Vec2) -> Shape {
        self.transformed(&Mat3::scale(scale.x, scale.y))
    }

    /// Copy translated by `offset`.
    pub fn offset(&self, offset: Vec2) -> Shape {
        self.transformed(&Mat3::translate(offset.x, offset.y))
    }

    /// Copy translated by `offset`, then scaled.
    pub fn scale_and_offset(&self, scale: Vec2, offset: Vec2) -> Shape {
        self.transformed(&Mat3::scale(scale.x, scale.y).mul(Mat3::translate(offset.x, offset.y)))
    }

    /// Copy in which single-segment contours are split into thirds, so every contour
    /// has at least three segments to color.
    pub fn normalized(&self) -> Shape {
        let contours = self
            .contours
            .iter()
            .map(|contour| match contour.edges.as_slice() {
                [edge] => Contour::new(edge.split_in_thirds().to_vec()),
                _ => contour.clone(),
            })
            .collect();
        Shape::new(contours)
    }
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b - a).cross(c - a)
}

/// Proper crossing of segments `ab` and `cd` (touching and collinear overlap excluded).
fn segments_cross(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    if a.max(b).x < c.min(d).x
        || c.max(d).x < a.min(b).x
        || a.max(b).y < c.min(d).y
        || c.max(d).y < a.min(b).y
    {
        return false;
    }
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

fn polyline_self_intersects(points: &[Vec2]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        // Skip the neighbours sharing a vertex with edge i.
        for j in i + 2..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if segments_cross(a, b, points[j], points[(j + 1) % n]) {
                return true;
            }
        }
    }
    false
}

fn polylines_cross(a: &[Vec2], b: &[Vec2]) -> bool {
    let (na, nb) = (a.len(), b.len());
    (0..na).any(|i| {
        let (p, q) = (a[i], a[(i + 1) % na]);
        (0..nb).any(|j| segments_cross(p, q, b[j], b[(j + 1) % nb]))
    })
}

/// Even-odd point in polygon test.
fn polygon_contains(polygon: &[Vec2], point: Vec2) -> bool {
    let n = polygon.len();
    let mut inside = false;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests;
