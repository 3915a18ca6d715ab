//! Artifact detection between neighbouring texels.

use std::cell::RefCell;

use bitflags::bitflags;

use crate::bitmap::Bitmap;
use crate::distance::{ContourCombiner, PseudoDistanceSelector, ShapeDistanceFinder};
use crate::geometry::equation::solve_quadratic;
use crate::math::{median, mix, Vec2};

// Channel crossings this close to a texel are singular and skipped.
const ARTIFACT_T_EPSILON: f64 = 0.01;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub(super) struct ClassifierFlags: u8 {
        const CANDIDATE = 0b01;
        const ARTIFACT = 0b10;
    }
}

pub(super) trait ArtifactClassifier {
    /// Tests the median `xm` interpolated at `xt` against the medians `am` at `at` and
    /// `bm` at `bt`.
    fn range_test(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> ClassifierFlags;

    /// Final decision for an interpolated median `m` at `t`.
    fn evaluate(&self, t: f64, m: f32, flags: ClassifierFlags) -> bool;
}

/// Bitmap-only classifier.
#[derive(Debug, Copy, Clone)]
pub(super) struct BaseArtifactClassifier {
    span: f64,
    protected: bool,
}

impl BaseArtifactClassifier {
    pub(super) fn new(span: f64, protected: bool) -> Self {
        Self { span, protected }
    }
}

impl ArtifactClassifier for BaseArtifactClassifier {
    fn range_test(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> ClassifierFlags {
        // Protected texels only count sign inversions; others any median outside its bounds.
        let inverted = (am > 0.5 && bm > 0.5 && xm <= 0.5) || (am < 0.5 && bm < 0.5 && xm >= 0.5);
        if inverted || (!self.protected && median(am, bm, xm) != xm) {
            let ax_span = (xt - at) * self.span;
            let bx_span = (bt - xt) * self.span;
            let (am, bm, xm) = (f64::from(am), f64::from(bm), f64::from(xm));
            let in_range = xm >= am - ax_span
                && xm <= am + ax_span
                && xm >= bm - bx_span
                && xm <= bm + bx_span;
            if !in_range {
                return ClassifierFlags::CANDIDATE | ClassifierFlags::ARTIFACT;
            }
            return ClassifierFlags::CANDIDATE;
        }
        ClassifierFlags::empty()
    }

    fn evaluate(&self, _t: f64, _m: f32, flags: ClassifierFlags) -> bool {
        flags.contains(ClassifierFlags::ARTIFACT)
    }
}

/// The texel under inspection by a [`ShapeDistanceChecker`].
#[derive(Debug, Copy, Clone)]
pub(super) struct TexelContext {
    /// Texel center in shape coordinates.
    pub shape_coord: Vec2,
    /// Texel center in bitmap coordinates.
    pub sdf_coord: Vec2,
    pub msd: [f32; 3],
    pub protected: bool,
}

/// Verifies artifact candidates against the exact pseudo distance of the shape.
pub(super) struct ShapeDistanceChecker<'a, C: ContourCombiner<Selector = PseudoDistanceSelector>> {
    finder: RefCell<ShapeDistanceFinder<'a, C>>,
    bitmap: &'a Bitmap,
    inv_range: f64,
    min_improve_ratio: f64,
    texel_size: Vec2,
}

impl<'a, C: ContourCombiner<Selector = PseudoDistanceSelector>> ShapeDistanceChecker<'a, C> {
    pub(super) fn new(
        finder: ShapeDistanceFinder<'a, C>,
        bitmap: &'a Bitmap,
        texel_size: Vec2,
        inv_range: f64,
        min_improve_ratio: f64,
    ) -> Self {
        Self {
            finder: RefCell::new(finder),
            bitmap,
            inv_range,
            min_improve_ratio,
            texel_size,
        }
    }

    pub(super) fn classifier<'c>(
        &'c self,
        texel: &'c TexelContext,
        direction: Vec2,
        span: f64,
    ) -> CheckedClassifier<'c, 'a, C> {
        CheckedClassifier {
            base: BaseArtifactClassifier::new(span, texel.protected),
            checker: self,
            texel,
            direction,
        }
    }
}

/// Classifier that confirms candidates only when correcting the texel brings the
/// interpolated median closer to the exact distance.
pub(super) struct CheckedClassifier<'c, 'a, C: ContourCombiner<Selector = PseudoDistanceSelector>> {
    base: BaseArtifactClassifier,
    checker: &'c ShapeDistanceChecker<'a, C>,
    texel: &'c TexelContext,
    direction: Vec2,
}

impl<C: ContourCombiner<Selector = PseudoDistanceSelector>> ArtifactClassifier
    for CheckedClassifier<'_, '_, C>
{
    fn range_test(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> ClassifierFlags {
        self.base.range_test(at, bt, xt, am, bm, xm)
    }

    fn evaluate(&self, t: f64, _m: f32, flags: ClassifierFlags) -> bool {
        if !flags.contains(ClassifierFlags::CANDIDATE) {
            return false;
        }
        if flags.contains(ClassifierFlags::ARTIFACT) {
            return true;
        }
        let checker = self.checker;
        let t_vector = self.direction * t;
        let mut old_msd = [0.0f32; 4];
        checker
            .bitmap
            .sample(self.texel.sdf_coord + t_vector, &mut old_msd);
        // Value the neighbourhood would interpolate to if this texel were set to its median.
        let a_weight = (1.0 - t_vector.x.abs()) * (1.0 - t_vector.y.abs());
        let msd = self.texel.msd;
        let a_psd = median(msd[0], msd[1], msd[2]);
        let new_msd: [f32; 3] = std::array::from_fn(|i| {
            (f64::from(old_msd[i]) + a_weight * f64::from(a_psd - msd[i])) as f32
        });
        let old_psd = median(old_msd[0], old_msd[1], old_msd[2]);
        let new_psd = median(new_msd[0], new_msd[1], new_msd[2]);
        let reference = checker
            .finder
            .borrow_mut()
            .distance(self.texel.shape_coord + t_vector * checker.texel_size);
        let ref_psd = (checker.inv_range * reference + 0.5) as f32;
        checker.min_improve_ratio * f64::from((new_psd - ref_psd).abs())
            < f64::from((old_psd - ref_psd).abs())
    }
}

fn interpolated_median(a: &[f32], b: &[f32], t: f64) -> f32 {
    median(mix(a[0], b[0], t), mix(a[1], b[1], t), mix(a[2], b[2], t))
}

fn interpolated_median_quadratic(a: &[f32], l: &[f32; 3], q: &[f32; 3], t: f64) -> f32 {
    let value = |i: usize| t * (t * f64::from(q[i]) + f64::from(l[i])) + f64::from(a[i]);
    median(value(0), value(1), value(2)) as f32
}

/// Artifact where the channel difference goes from `da` at `a` to `db` at `b`.
fn has_linear_artifact_inner<K: ArtifactClassifier>(
    classifier: &K,
    am: f32,
    bm: f32,
    a: &[f32],
    b: &[f32],
    da: f32,
    db: f32,
) -> bool {
    let t = f64::from(da) / f64::from(da - db);
    if t > ARTIFACT_T_EPSILON && t < 1.0 - ARTIFACT_T_EPSILON {
        let xm = interpolated_median(a, b, t);
        return classifier.evaluate(t, xm, classifier.range_test(0.0, 1.0, t, am, bm, xm));
    }
    false
}

#[allow(clippy::too_many_arguments)]
fn has_diagonal_artifact_inner<K: ArtifactClassifier>(
    classifier: &K,
    am: f32,
    dm: f32,
    a: &[f32],
    l: &[f32; 3],
    q: &[f32; 3],
    da: f32,
    dbc: f32,
    dd: f32,
    t_ex0: f64,
    t_ex1: f64,
) -> bool {
    let mut roots = [0.0f64; 2];
    let count = solve_quadratic(
        f64::from(dd - dbc + da),
        f64::from(dbc - da - da),
        f64::from(da),
        &mut roots,
    );
    for &t in &roots[..count] {
        // Crossings at the texels themselves are the common case, not artifacts.
        if t <= ARTIFACT_T_EPSILON || t >= 1.0 - ARTIFACT_T_EPSILON {
            continue;
        }
        let xm = interpolated_median_quadratic(a, l, q, t);
        let mut flags = classifier.range_test(0.0, 1.0, t, am, dm, xm);
        // Also test against the medians at the local channel extremes.
        for t_ex in [t_ex0, t_ex1] {
            if t_ex > 0.0 && t_ex < 1.0 {
                let mut t_end = [0.0, 1.0];
                let mut em = [am, dm];
                let side = usize::from(t_ex > t);
                t_end[side] = t_ex;
                em[side] = interpolated_median_quadratic(a, l, q, t_ex);
                flags |= classifier.range_test(t_end[0], t_end[1], t, em[0], em[1], xm);
            }
        }
        if classifier.evaluate(t, xm, flags) {
            return true;
        }
    }
    false
}

/// Artifact between texel `a` (median `am`) and its horizontal or vertical neighbour `b`.
/// Only the texel farther from the edge is reported.
pub(super) fn has_linear_artifact<K: ArtifactClassifier>(
    classifier: &K,
    am: f32,
    a: &[f32],
    b: &[f32],
) -> bool {
    let bm = median(b[0], b[1], b[2]);
    (am - 0.5).abs() >= (bm - 0.5).abs()
        && (has_linear_artifact_inner(classifier, am, bm, a, b, a[1] - a[0], b[1] - b[0])
            || has_linear_artifact_inner(classifier, am, bm, a, b, a[2] - a[1], b[2] - b[1])
            || has_linear_artifact_inner(classifier, am, bm, a, b, a[0] - a[2], b[0] - b[2]))
}

/// Artifact under bilinear interpolation between texel `a` and its diagonal neighbour `d`,
/// with `b` and `c` the other two texels of the quad.
pub(super) fn has_diagonal_artifact<K: ArtifactClassifier>(
    classifier: &K,
    am: f32,
    a: &[f32],
    b: &[f32],
    c: &[f32],
    d: &[f32],
) -> bool {
    let dm = median(d[0], d[1], d[2]);
    if (am - 0.5).abs() < (dm - 0.5).abs() {
        return false;
    }
    let abc: [f32; 3] = std::array::from_fn(|i| a[i] - b[i] - c[i]);
    // Linear and quadratic terms of the bilinear interpolation along the diagonal.
    let l: [f32; 3] = std::array::from_fn(|i| -a[i] - abc[i]);
    let q: [f32; 3] = std::array::from_fn(|i| d[i] + abc[i]);
    let t_ex: [f64; 3] = std::array::from_fn(|i| -0.5 * f64::from(l[i]) / f64::from(q[i]));
    let pair = |i: usize, j: usize, ex0: usize, ex1: usize| {
        has_diagonal_artifact_inner(
            classifier,
            am,
            dm,
            a,
            &l,
            &q,
            a[j] - a[i],
            b[j] - b[i] + c[j] - c[i],
            d[j] - d[i],
            t_ex[ex0],
            t_ex[ex1],
        )
    };
    pair(0, 1, 0, 1) || pair(1, 2, 1, 2) || pair(2, 0, 2, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_texels_only_flag_inversions() {
        let open = BaseArtifactClassifier::new(0.01, false);
        let protected = BaseArtifactClassifier::new(0.01, true);
        // Median outside [am, bm] without changing side of the edge.
        let flags = open.range_test(0.0, 1.0, 0.5, 0.6, 0.7, 0.9);
        assert_eq!(flags, ClassifierFlags::CANDIDATE | ClassifierFlags::ARTIFACT);
        assert!(protected.range_test(0.0, 1.0, 0.5, 0.6, 0.7, 0.9).is_empty());
        // Inversion counts for both.
        assert!(protected
            .range_test(0.0, 1.0, 0.5, 0.6, 0.7, 0.4)
            .contains(ClassifierFlags::ARTIFACT));
    }

    #[test]
    fn small_deviation_is_only_a_candidate() {
        let classifier = BaseArtifactClassifier::new(1.0, false);
        let flags = classifier.range_test(0.0, 1.0, 0.5, 0.6, 0.7, 0.75);
        assert_eq!(flags, ClassifierFlags::CANDIDATE);
        assert!(!classifier.evaluate(0.5, 0.75, flags));
    }

    #[test]
    fn crossing_channels_produce_linear_artifact() {
        // Red and green swap between the texels, dragging the median to the wrong side.
        let a = [0.9f32, 0.1, 0.7];
        let b = [0.1f32, 0.9, 0.7];
        let classifier = BaseArtifactClassifier::new(0.01, false);
        let am = median(a[0], a[1], a[2]);
        assert!(has_linear_artifact(&classifier, am, &a, &b));

        let uniform = [0.7f32, 0.7, 0.7];
        let other = [0.6f32, 0.6, 0.6];
        assert!(!has_linear_artifact(&classifier, 0.7, &uniform, &other));
    }
}
