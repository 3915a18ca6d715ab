//! Assigns channel colors to segments so that corners survive median reconstruction.

use tracing::trace;

use crate::color::EdgeColor;
use crate::geometry::{Contour, Shape};
use crate::math::Vec2;

/// Default corner angle threshold in radians.
pub const DEFAULT_ANGLE_THRESHOLD: f64 = 3.0;

/// Pseudo-random choices consumed from a 64-bit seed.
struct ColorSeed(u64);

impl ColorSeed {
    fn extract2(&mut self) -> u32 {
        let v = (self.0 & 1) as u32;
        self.0 >>= 1;
        v
    }

    fn extract3(&mut self) -> usize {
        let v = (self.0 % 3) as usize;
        self.0 /= 3;
        v
    }

    fn init_color(&mut self) -> EdgeColor {
        EdgeColor::PRIMARY_PAIRS[self.extract3()]
    }

    /// Rotates a two-channel color to one of the other two.
    fn switch_color(&mut self, color: EdgeColor) -> EdgeColor {
        let shifted = u32::from(color.bits()) << (1 + self.extract2());
        EdgeColor::from_bits_truncate(((shifted | shifted >> 3) & 0b111) as u8)
    }

    /// Like `switch_color`, but never returns a color that shares two channels with `banned`.
    fn switch_color_avoiding(&mut self, color: EdgeColor, banned: EdgeColor) -> EdgeColor {
        let combined = color & banned;
        if combined.channel_count() == 1 {
            combined ^ EdgeColor::WHITE
        } else {
            self.switch_color(color)
        }
    }
}

fn is_corner(a_dir: Vec2, b_dir: Vec2, cross_threshold: f64) -> bool {
    a_dir.dot(b_dir) <= 0.0 || a_dir.cross(b_dir).abs() > cross_threshold
}

/// Maps position `position` of `n` to -1, 0 or 1, split into three roughly equal runs.
fn symmetrical_trichotomy(position: usize, n: usize) -> i32 {
    (3.0 + 2.875 * position as f64 / (n - 1) as f64 - 1.4375 + 0.5) as i32 - 3
}

/// Indices of segments whose start is a corner.
fn corners(contour: &Contour, cross_threshold: f64) -> Vec<usize> {
    let mut found = Vec::new();
    let Some(last) = contour.edges.last() else {
        return found;
    };
    let mut prev_direction = last.direction(1.0);
    for (index, edge) in contour.edges.iter().enumerate() {
        if is_corner(
            prev_direction.normalize(false),
            edge.direction(0.0).normalize(false),
            cross_threshold,
        ) {
            found.push(index);
        }
        prev_direction = edge.direction(1.0);
    }
    found
}

/// Colors the segments of a copy of `shape`.
///
/// Corners are vertices where the tangent turns by more than `PI - angle_threshold`.
/// Smooth contours become WHITE. Across every corner the two segments share exactly one
/// channel. Contours with a single corner and fewer than three segments are split into
/// thirds. The result is fully determined by `seed`.
pub fn edge_coloring_simple(shape: &Shape, angle_threshold: f64, seed: u64) -> Shape {
    let cross_threshold = angle_threshold.sin();
    let mut seed = ColorSeed(seed);
    let mut color = seed.init_color();
    let mut colored = shape.clone();

    for (contour_index, contour) in colored.contours.iter_mut().enumerate() {
        if contour.is_empty() {
            continue;
        }
        let corners = corners(contour, cross_threshold);
        trace!(
            "Contour {}: {} segments, {} corners",
            contour_index,
            contour.len(),
            corners.len()
        );

        match corners.as_slice() {
            [] => {
                for edge in &mut contour.edges {
                    edge.color = EdgeColor::WHITE;
                }
            }
            [corner] => {
                color = seed.switch_color(color);
                let first = color;
                color = seed.switch_color(color);
                let colors = [first, EdgeColor::WHITE, color];
                color_teardrop(contour, *corner, colors);
            }
            _ => {
                let corner_count = corners.len();
                let start = corners[0];
                let m = contour.len();
                let mut spline = 0;
                color = seed.switch_color(color);
                let initial_color = color;
                for i in 0..m {
                    let index = (start + i) % m;
                    if spline + 1 < corner_count && corners[spline + 1] == index {
                        spline += 1;
                        color = if spline == corner_count - 1 {
                            seed.switch_color_avoiding(color, initial_color)
                        } else {
                            seed.switch_color(color)
                        };
                    }
                    contour.edges[index].color = color;
                }
            }
        }
    }
    colored
}

fn color_teardrop(contour: &mut Contour, corner: usize, colors: [EdgeColor; 3]) {
    let m = contour.len();
    if m >= 3 {
        for i in 0..m {
            let slot = (1 + symmetrical_trichotomy(i, m)) as usize;
            contour.edges[(corner + i) % m].color = colors[slot];
        }
        return;
    }

    // Fewer segments than colors: split into thirds, starting at the corner.
    // Two segments give six parts, colored in pairs.
    contour.edges = (0..m)
        .flat_map(|i| contour.edges[(corner + i) % m].split_in_thirds())
        .enumerate()
        .map(|(i, part)| part.with_color(colors[i / m]))
        .collect();
}
