use bitflags::bitflags;
use rayon::prelude::*;

use crate::bitmap::Bitmap;
use crate::color::EdgeColor;
use crate::distance::{ContourCombiner, PseudoDistanceSelector, ShapeDistanceFinder};
use crate::geometry::Shape;
use crate::math::{median, mix, Vec2};
use crate::projection::Projection;

use super::classifier::{
    has_diagonal_artifact, has_linear_artifact, ArtifactClassifier, BaseArtifactClassifier,
    ShapeDistanceChecker, TexelContext,
};

// Slack on the edge protection radius so edges exactly between texels still count.
const PROTECTION_RADIUS_TOLERANCE: f64 = 1.001;

bitflags! {
    /// Per-texel state of the corrector.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
    pub(super) struct StencilFlags: u8 {
        /// Texel will be collapsed to its median.
        const ERROR = 0b01;
        /// Texel carries a corner or an edge and is only corrected on sign inversion.
        const PROTECTED = 0b10;
    }
}

/// Artifact thresholds, in stored units, per neighbour direction.
#[derive(Debug, Copy, Clone)]
struct Spans {
    horizontal: f64,
    vertical: f64,
    diagonal: f64,
}

/// Marks and repairs texels whose channel disagreement creates artifacts under bilinear
/// interpolation.
pub(super) struct ErrorCorrector<'a> {
    stencil: Vec<StencilFlags>,
    width: u32,
    height: u32,
    projection: &'a Projection,
    inv_range: f64,
    min_deviation_ratio: f64,
    min_improve_ratio: f64,
}

impl<'a> ErrorCorrector<'a> {
    pub(super) fn new(
        width: u32,
        height: u32,
        projection: &'a Projection,
        inv_range: f64,
        min_deviation_ratio: f64,
        min_improve_ratio: f64,
    ) -> Self {
        Self {
            stencil: vec![StencilFlags::empty(); width as usize * height as usize],
            width,
            height,
            projection,
            inv_range,
            min_deviation_ratio,
            min_improve_ratio,
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn mark(&mut self, x: u32, y: u32, flags: StencilFlags) {
        let index = self.index(x, y);
        self.stencil[index] |= flags;
    }

    pub(super) fn count(&self, flags: StencilFlags) -> usize {
        self.stencil.iter().filter(|s| s.contains(flags)).count()
    }

    /// Protects the four texels around every corner, i.e. every vertex whose adjacent
    /// segments share at most one channel.
    pub(super) fn protect_corners(&mut self, shape: &Shape) {
        let (width, height) = (i64::from(self.width), i64::from(self.height));
        for contour in &shape.contours {
            let Some(mut prev) = contour.edges.last() else {
                continue;
            };
            for edge in &contour.edges {
                if prev.color.is_corner_with(edge.color) {
                    let p = self.projection.project(edge.start());
                    let l = (p.x - 0.5).floor() as i64;
                    let b = (p.y - 0.5).floor() as i64;
                    for (x, y) in [(l, b), (l + 1, b), (l, b + 1), (l + 1, b + 1)] {
                        if (0..width).contains(&x) && (0..height).contains(&y) {
                            self.mark(x as u32, y as u32, StencilFlags::PROTECTED);
                        }
                    }
                }
                prev = edge;
            }
        }
    }

    /// Protects the channels that carry an edge passing between adjacent texels.
    pub(super) fn protect_edges(&mut self, bitmap: &Bitmap) {
        let (width, height) = (self.width, self.height);
        let radius = |v: Vec2| {
            (PROTECTION_RADIUS_TOLERANCE * self.projection.unproject_vector(v).length()) as f32
        };
        let horizontal = radius(Vec2::new(self.inv_range, 0.0));
        let vertical = radius(Vec2::new(0.0, self.inv_range));
        let diagonal = radius(Vec2::splat(self.inv_range));

        let protect_pair = |corrector: &mut Self, a: (u32, u32), b: (u32, u32), radius: f32| {
            let ta = bitmap.texel(a.0, a.1);
            let tb = bitmap.texel(b.0, b.1);
            let am = median(ta[0], ta[1], ta[2]);
            let bm = median(tb[0], tb[1], tb[2]);
            if (am - 0.5).abs() + (bm - 0.5).abs() < radius {
                let mask = edge_between_texels(ta, tb);
                if has_extreme_channel(ta, am, mask) {
                    corrector.mark(a.0, a.1, StencilFlags::PROTECTED);
                }
                if has_extreme_channel(tb, bm, mask) {
                    corrector.mark(b.0, b.1, StencilFlags::PROTECTED);
                }
            }
        };

        for y in 0..height {
            for x in 0..width.saturating_sub(1) {
                protect_pair(self, (x, y), (x + 1, y), horizontal);
            }
        }
        for y in 0..height.saturating_sub(1) {
            for x in 0..width {
                protect_pair(self, (x, y), (x, y + 1), vertical);
            }
        }
        for y in 0..height.saturating_sub(1) {
            for x in 0..width.saturating_sub(1) {
                protect_pair(self, (x, y), (x + 1, y + 1), diagonal);
                protect_pair(self, (x + 1, y), (x, y + 1), diagonal);
            }
        }
    }

    pub(super) fn protect_all(&mut self) {
        for flags in &mut self.stencil {
            *flags |= StencilFlags::PROTECTED;
        }
    }

    fn spans(&self) -> Spans {
        let span = |v: Vec2| self.min_deviation_ratio * self.projection.unproject_vector(v).length();
        Spans {
            horizontal: span(Vec2::new(self.inv_range, 0.0)),
            vertical: span(Vec2::new(0.0, self.inv_range)),
            diagonal: span(Vec2::splat(self.inv_range)),
        }
    }

    /// Flags texels with artifacts towards any of their eight neighbours, judging from the
    /// bitmap alone.
    pub(super) fn find_errors(&mut self, bitmap: &Bitmap) {
        let spans = self.spans();
        let width = self.width as usize;
        self.stencil
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let y = y as u32;
                for (x, flags) in row.iter_mut().enumerate() {
                    let protected = flags.contains(StencilFlags::PROTECTED);
                    let found = texel_has_artifact(bitmap, x as u32, y, spans, |_, span| {
                        BaseArtifactClassifier::new(span, protected)
                    });
                    if found {
                        *flags |= StencilFlags::ERROR;
                    }
                }
            });
    }

    /// Flags texels whose artifacts are confirmed by comparing against the exact pseudo
    /// distance of `shape`. Texels already flagged are skipped.
    pub(super) fn find_errors_checked<C>(&mut self, bitmap: &Bitmap, shape: &Shape)
    where
        C: ContourCombiner<Selector = PseudoDistanceSelector>,
    {
        let spans = self.spans();
        let width = self.width as usize;
        let projection = self.projection;
        let inv_range = self.inv_range;
        let min_improve_ratio = self.min_improve_ratio;
        let texel_size = projection.unproject_vector(Vec2::splat(1.0));
        self.stencil
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let checker = ShapeDistanceChecker::new(
                    ShapeDistanceFinder::<C>::new(shape),
                    bitmap,
                    texel_size,
                    inv_range,
                    min_improve_ratio,
                );
                let y = y as u32;
                for (x, flags) in row.iter_mut().enumerate() {
                    if flags.contains(StencilFlags::ERROR) {
                        continue;
                    }
                    let x = x as u32;
                    let sdf_coord = Vec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                    let c = bitmap.texel(x, y);
                    let texel = TexelContext {
                        shape_coord: projection.unproject(sdf_coord),
                        sdf_coord,
                        msd: [c[0], c[1], c[2]],
                        protected: flags.contains(StencilFlags::PROTECTED),
                    };
                    let found = texel_has_artifact(bitmap, x, y, spans, |direction, span| {
                        checker.classifier(&texel, direction, span)
                    });
                    if found {
                        *flags |= StencilFlags::ERROR;
                    }
                }
            });
    }

    /// Collapses every flagged texel to its median. Returns the number of texels changed.
    pub(super) fn apply(&self, bitmap: &mut Bitmap) -> usize {
        let channels = bitmap.channels;
        let mut corrected = 0;
        for (texel, flags) in bitmap.pixels.chunks_exact_mut(channels).zip(&self.stencil) {
            if flags.contains(StencilFlags::ERROR) {
                let m = median(texel[0], texel[1], texel[2]);
                texel[..3].fill(m);
                corrected += 1;
            }
        }
        corrected
    }
}

/// Runs the linear and diagonal artifact tests between the texel at `(x, y)` and each of
/// its neighbours. `classifier` builds the classifier for a neighbour direction and span.
fn texel_has_artifact<K, F>(bitmap: &Bitmap, x: u32, y: u32, spans: Spans, classifier: F) -> bool
where
    K: ArtifactClassifier,
    F: Fn(Vec2, f64) -> K,
{
    let c = bitmap.texel(x, y);
    let cm = median(c[0], c[1], c[2]);
    let has_l = x > 0;
    let has_b = y > 0;
    let has_r = x + 1 < bitmap.width;
    let has_t = y + 1 < bitmap.height;
    let (l, b, r, t) = (x.wrapping_sub(1), y.wrapping_sub(1), x + 1, y + 1);

    let linear = |present: bool, nx: u32, ny: u32, direction: Vec2, span: f64| {
        present && has_linear_artifact(&classifier(direction, span), cm, c, bitmap.texel(nx, ny))
    };
    let diagonal = |present: bool, dx: u32, dy: u32, direction: Vec2| {
        present
            && has_diagonal_artifact(
                &classifier(direction, spans.diagonal),
                cm,
                c,
                bitmap.texel(dx, y),
                bitmap.texel(x, dy),
                bitmap.texel(dx, dy),
            )
    };

    linear(has_l, l, y, Vec2::new(-1.0, 0.0), spans.horizontal)
        || linear(has_b, x, b, Vec2::new(0.0, -1.0), spans.vertical)
        || linear(has_r, r, y, Vec2::new(1.0, 0.0), spans.horizontal)
        || linear(has_t, x, t, Vec2::new(0.0, 1.0), spans.vertical)
        || diagonal(has_l && has_b, l, b, Vec2::new(-1.0, -1.0))
        || diagonal(has_r && has_b, r, b, Vec2::new(1.0, -1.0))
        || diagonal(has_l && has_t, l, t, Vec2::new(-1.0, 1.0))
        || diagonal(has_r && has_t, r, t, Vec2::new(1.0, 1.0))
}

/// Whether the 0.5 crossing of `channel` between `a` and `b` is where the median crosses.
fn edge_between_texels_channel(a: &[f32], b: &[f32], channel: usize) -> bool {
    let t = f64::from(a[channel] - 0.5) / f64::from(a[channel] - b[channel]);
    if t > 0.0 && t < 1.0 {
        let c: [f32; 3] = std::array::from_fn(|i| mix(a[i], b[i], t));
        return median(c[0], c[1], c[2]) == c[channel];
    }
    false
}

/// Channels along which an edge runs between texels `a` and `b`.
fn edge_between_texels(a: &[f32], b: &[f32]) -> EdgeColor {
    (0..3)
        .filter(|&channel| edge_between_texels_channel(a, b, channel))
        .fold(EdgeColor::BLACK, |mask, channel| mask | EdgeColor::channel(channel))
}

/// Whether any channel in `mask` differs from the median `m`, i.e. sits at an extreme.
fn has_extreme_channel(msd: &[f32], m: f32, mask: EdgeColor) -> bool {
    (0..3).any(|channel| mask.contains(EdgeColor::channel(channel)) && msd[channel] != m)
}
