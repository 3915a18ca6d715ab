//! Edge segments: lines and Bézier curves with exact distance queries.
//!
//! Signed distances are positive to the left of the direction of travel, so
//! counter-clockwise outlines (in a y-up frame) are positive inside.

use crate::color::EdgeColor;
use crate::distance::SignedDistance;
use crate::math::{non_zero_sign, Mat3, Vec2};

use super::equation::{solve_cubic, solve_quadratic};

// Starting parameters for the cubic Newton search (plus one), and steps per start.
const CUBIC_SEARCH_STARTS: usize = 4;
const CUBIC_SEARCH_STEPS: usize = 4;

/// Control points of one segment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Curve {
    Linear([Vec2; 2]),
    Quadratic([Vec2; 3]),
    Cubic([Vec2; 4]),
}

/// A single line or curve of a contour together with its channel mask.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeSegment {
    /// Channels this segment contributes to.
    pub color: EdgeColor,
    curve: Curve,
}

impl EdgeSegment {
    /// Straight line from `p0` to `p1`.
    pub fn linear(p0: Vec2, p1: Vec2, color: EdgeColor) -> Self {
        Self {
            color,
            curve: Curve::Linear([p0, p1]),
        }
    }

    /// Quadratic Bézier. A control point coincident with an endpoint is moved to
    /// the midpoint of the endpoints.
    pub fn quadratic(p0: Vec2, p1: Vec2, p2: Vec2, color: EdgeColor) -> Self {
        let p1 = if p1 == p0 || p1 == p2 {
            (p0 + p2) * 0.5
        } else {
            p1
        };
        Self {
            color,
            curve: Curve::Quadratic([p0, p1, p2]),
        }
    }

    /// Cubic Bézier.
    pub fn cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, color: EdgeColor) -> Self {
        Self {
            color,
            curve: Curve::Cubic([p0, p1, p2, p3]),
        }
    }

    /// Control point storage.
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Control points in order.
    pub fn control_points(&self) -> &[Vec2] {
        match &self.curve {
            Curve::Linear(p) => p,
            Curve::Quadratic(p) => p,
            Curve::Cubic(p) => p,
        }
    }

    /// Copy of the segment with a different color.
    pub fn with_color(mut self, color: EdgeColor) -> Self {
        self.color = color;
        self
    }

    /// Start point.
    pub fn start(&self) -> Vec2 {
        self.control_points()[0]
    }

    /// End point.
    pub fn end(&self) -> Vec2 {
        let p = self.control_points();
        p[p.len() - 1]
    }

    /// True when every control point is finite.
    pub fn is_finite(&self) -> bool {
        self.control_points().iter().all(|p| p.is_finite())
    }

    /// Position at parameter `t`.
    pub fn point(&self, t: f64) -> Vec2 {
        match self.curve {
            Curve::Linear([p0, p1]) => p0.lerp(p1, t),
            Curve::Quadratic([p0, p1, p2]) => p0.lerp(p1, t).lerp(p1.lerp(p2, t), t),
            Curve::Cubic([p0, p1, p2, p3]) => {
                let p12 = p1.lerp(p2, t);
                p0.lerp(p1, t)
                    .lerp(p12, t)
                    .lerp(p12.lerp(p2.lerp(p3, t), t), t)
            }
        }
    }

    /// Direction of the tangent at parameter `t` (not normalized).
    pub fn direction(&self, t: f64) -> Vec2 {
        match self.curve {
            Curve::Linear([p0, p1]) => p1 - p0,
            Curve::Quadratic([p0, p1, p2]) => {
                let tangent = (p1 - p0).lerp(p2 - p1, t);
                if tangent.is_zero() {
                    return p2 - p0;
                }
                tangent
            }
            Curve::Cubic([p0, p1, p2, p3]) => {
                let tangent = (p1 - p0)
                    .lerp(p2 - p1, t)
                    .lerp((p2 - p1).lerp(p3 - p2, t), t);
                if tangent.is_zero() {
                    if t == 0.0 {
                        return p2 - p0;
                    }
                    if t == 1.0 {
                        return p3 - p1;
                    }
                }
                tangent
            }
        }
    }

    /// Change of the tangent direction at parameter `t`.
    pub fn direction_change(&self, t: f64) -> Vec2 {
        match self.curve {
            Curve::Linear(_) => Vec2::ZERO,
            Curve::Quadratic([p0, p1, p2]) => (p2 - p1) - (p1 - p0),
            Curve::Cubic([p0, p1, p2, p3]) => ((p2 - p1) - (p1 - p0)).lerp((p3 - p2) - (p2 - p1), t),
        }
    }

    /// Signed distance from `origin` to the segment and the parameter of the closest point.
    ///
    /// The parameter falls outside `[0, 1]` when an endpoint is closest; it then tells
    /// on which side of the endpoint the origin lies, and `dot` holds the |cos| of the
    /// angle between the endpoint tangent and the direction to `origin`.
    pub fn signed_distance(&self, origin: Vec2) -> (SignedDistance, f64) {
        match self.curve {
            Curve::Linear([p0, p1]) => linear_signed_distance(p0, p1, origin),
            Curve::Quadratic([p0, p1, p2]) => self.quadratic_signed_distance(p0, p1, p2, origin),
            Curve::Cubic([p0, p1, p2, p3]) => self.cubic_signed_distance(p0, p1, p2, p3, origin),
        }
    }

    fn quadratic_signed_distance(
        &self,
        p0: Vec2,
        p1: Vec2,
        p2: Vec2,
        origin: Vec2,
    ) -> (SignedDistance, f64) {
        let qa = p0 - origin;
        let ab = p1 - p0;
        let br = p2 - p1 - ab;
        let a = br.dot(br);
        let b = 3.0 * ab.dot(br);
        let c = 2.0 * ab.dot(ab) + qa.dot(br);
        let d = qa.dot(ab);
        let mut roots = [0.0f64; 3];
        let count = solve_cubic(a, b, c, d, &mut roots);

        let mut ep_dir = self.direction(0.0);
        let mut min_distance = non_zero_sign(qa.cross(ep_dir)) * qa.length();
        let mut param = -qa.dot(ep_dir) / ep_dir.dot(ep_dir);
        {
            ep_dir = self.direction(1.0);
            let end_offset = p2 - origin;
            let distance = end_offset.length();
            if distance < min_distance.abs() {
                min_distance = non_zero_sign(end_offset.cross(ep_dir)) * distance;
                param = (origin - p1).dot(ep_dir) / ep_dir.dot(ep_dir);
            }
        }
        for &t in &roots[..count] {
            if t > 0.0 && t < 1.0 {
                let qe = qa + ab * (2.0 * t) + br * (t * t);
                let distance = qe.length();
                if distance <= min_distance.abs() {
                    min_distance = non_zero_sign(qe.cross(ab + br * t)) * distance;
                    param = t;
                }
            }
        }

        self.finish_distance(min_distance, param, qa, p2 - origin)
    }

    fn cubic_signed_distance(
        &self,
        p0: Vec2,
        p1: Vec2,
        p2: Vec2,
        p3: Vec2,
        origin: Vec2,
    ) -> (SignedDistance, f64) {
        let qa = p0 - origin;
        let ab = p1 - p0;
        let br = p2 - p1 - ab;
        let as_ = (p3 - p2) - (p2 - p1) - br;

        let mut ep_dir = self.direction(0.0);
        let mut min_distance = non_zero_sign(qa.cross(ep_dir)) * qa.length();
        let mut param = -qa.dot(ep_dir) / ep_dir.dot(ep_dir);
        {
            ep_dir = self.direction(1.0);
            let end_offset = p3 - origin;
            let distance = end_offset.length();
            if distance < min_distance.abs() {
                min_distance = non_zero_sign(end_offset.cross(ep_dir)) * distance;
                param = (ep_dir - end_offset).dot(ep_dir) / ep_dir.dot(ep_dir);
            }
        }
        let offset_at = |t: f64| qa + ab * (3.0 * t) + br * (3.0 * t * t) + as_ * (t * t * t);
        for i in 0..=CUBIC_SEARCH_STARTS {
            let mut t = i as f64 / CUBIC_SEARCH_STARTS as f64;
            let mut qe = offset_at(t);
            for _ in 0..CUBIC_SEARCH_STEPS {
                let d1 = ab * 3.0 + br * (6.0 * t) + as_ * (3.0 * t * t);
                let d2 = br * 6.0 + as_ * (6.0 * t);
                t -= qe.dot(d1) / (d1.dot(d1) + qe.dot(d2));
                if t <= 0.0 || t >= 1.0 {
                    break;
                }
                qe = offset_at(t);
                let distance = qe.length();
                if distance < min_distance.abs() {
                    min_distance = non_zero_sign(qe.cross(d1)) * distance;
                    param = t;
                }
            }
        }

        self.finish_distance(min_distance, param, qa, p3 - origin)
    }

    /// Attaches the endpoint obliqueness to a curve distance.
    fn finish_distance(
        &self,
        min_distance: f64,
        param: f64,
        start_offset: Vec2,
        end_offset: Vec2,
    ) -> (SignedDistance, f64) {
        if (0.0..=1.0).contains(&param) {
            return (SignedDistance::new(min_distance, 0.0), param);
        }
        let dot = if param < 0.5 {
            self.direction(0.0)
                .normalize(false)
                .dot(start_offset.normalize(false))
                .abs()
        } else {
            self.direction(1.0)
                .normalize(false)
                .dot(end_offset.normalize(false))
                .abs()
        };
        (SignedDistance::new(min_distance, dot), param)
    }

    /// Replaces an endpoint distance with the distance to the tangent line extended
    /// past that endpoint, when the origin lies beyond it and the result is not farther.
    pub fn distance_to_perpendicular_distance(
        &self,
        distance: &mut SignedDistance,
        origin: Vec2,
        param: f64,
    ) {
        if param < 0.0 {
            let dir = self.direction(0.0).normalize(false);
            let aq = origin - self.point(0.0);
            let ts = aq.dot(dir);
            if ts < 0.0 {
                let perpendicular = dir.cross(aq);
                if perpendicular.abs() <= distance.distance.abs() {
                    distance.distance = perpendicular;
                    distance.dot = 0.0;
                }
            }
        } else if param > 1.0 {
            let dir = self.direction(1.0).normalize(false);
            let bq = origin - self.point(1.0);
            let ts = bq.dot(dir);
            if ts > 0.0 {
                let perpendicular = dir.cross(bq);
                if perpendicular.abs() <= distance.distance.abs() {
                    distance.distance = perpendicular;
                    distance.dot = 0.0;
                }
            }
        }
    }

    /// Splits the segment at t = 1/3 and t = 2/3. The pieces keep the segment's color.
    pub fn split_in_thirds(&self) -> [EdgeSegment; 3] {
        let color = self.color;
        let a = self.point(1.0 / 3.0);
        let b = self.point(2.0 / 3.0);
        match self.curve {
            Curve::Linear([p0, p1]) => [
                Self::linear(p0, a, color),
                Self::linear(a, b, color),
                Self::linear(b, p1, color),
            ],
            Curve::Quadratic([p0, p1, p2]) => [
                Self::quadratic(p0, p0.lerp(p1, 1.0 / 3.0), a, color),
                Self::quadratic(
                    a,
                    p0.lerp(p1, 5.0 / 9.0).lerp(p1.lerp(p2, 4.0 / 9.0), 0.5),
                    b,
                    color,
                ),
                Self::quadratic(b, p1.lerp(p2, 2.0 / 3.0), p2, color),
            ],
            Curve::Cubic([p0, p1, p2, p3]) => {
                let third = 1.0 / 3.0;
                let two_thirds = 2.0 / 3.0;
                [
                    Self::cubic(
                        p0,
                        if p0 == p1 { p0 } else { p0.lerp(p1, third) },
                        p0.lerp(p1, third).lerp(p1.lerp(p2, third), third),
                        a,
                        color,
                    ),
                    Self::cubic(
                        a,
                        p0.lerp(p1, third)
                            .lerp(p1.lerp(p2, third), third)
                            .lerp(p1.lerp(p2, third).lerp(p2.lerp(p3, third), third), two_thirds),
                        p0.lerp(p1, two_thirds)
                            .lerp(p1.lerp(p2, two_thirds), two_thirds)
                            .lerp(
                                p1.lerp(p2, two_thirds).lerp(p2.lerp(p3, two_thirds), two_thirds),
                                third,
                            ),
                        b,
                        color,
                    ),
                    Self::cubic(
                        b,
                        p1.lerp(p2, two_thirds).lerp(p2.lerp(p3, two_thirds), two_thirds),
                        if p2 == p3 { p3 } else { p2.lerp(p3, two_thirds) },
                        p3,
                        color,
                    ),
                ]
            }
        }
    }

    /// Same curve traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        let curve = match self.curve {
            Curve::Linear([p0, p1]) => Curve::Linear([p1, p0]),
            Curve::Quadratic([p0, p1, p2]) => Curve::Quadratic([p2, p1, p0]),
            Curve::Cubic([p0, p1, p2, p3]) => Curve::Cubic([p3, p2, p1, p0]),
        };
        Self {
            color: self.color,
            curve,
        }
    }

    /// Copy of the segment with every control point mapped through `transform`.
    pub fn transformed(&self, transform: &Mat3) -> Self {
        let map = |p: Vec2| transform.transform_point(p);
        match self.curve {
            Curve::Linear([p0, p1]) => Self::linear(map(p0), map(p1), self.color),
            Curve::Quadratic([p0, p1, p2]) => {
                Self::quadratic(map(p0), map(p1), map(p2), self.color)
            }
            Curve::Cubic([p0, p1, p2, p3]) => {
                Self::cubic(map(p0), map(p1), map(p2), map(p3), self.color)
            }
        }
    }

    /// Tight axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let mut min = self.start().min(self.end());
        let mut max = self.start().max(self.end());
        let mut include = |t: f64| {
            if t > 0.0 && t < 1.0 {
                let p = self.point(t);
                min = min.min(p);
                max = max.max(p);
            }
        };
        match self.curve {
            Curve::Linear(_) => {}
            Curve::Quadratic([p0, p1, p2]) => {
                let bot = (p1 - p0) - (p2 - p1);
                if bot.x != 0.0 {
                    include((p1.x - p0.x) / bot.x);
                }
                if bot.y != 0.0 {
                    include((p1.y - p0.y) / bot.y);
                }
            }
            Curve::Cubic([p0, p1, p2, p3]) => {
                let a0 = p1 - p0;
                let a1 = (p2 - p1 - a0) * 2.0;
                let a2 = p3 - p2 * 3.0 + p1 * 3.0 - p0;
                let mut roots = [0.0f64; 2];
                let count = solve_quadratic(a2.x, a1.x, a0.x, &mut roots);
                for &t in &roots[..count] {
                    include(t);
                }
                let count = solve_quadratic(a2.y, a1.y, a0.y, &mut roots);
                for &t in &roots[..count] {
                    include(t);
                }
            }
        }
        (min, max)
    }
}

fn linear_signed_distance(p0: Vec2, p1: Vec2, origin: Vec2) -> (SignedDistance, f64) {
    let aq = origin - p0;
    let ab = p1 - p0;
    let denom = ab.dot(ab);
    if denom == 0.0 {
        // Zero-length line: point distance, signed against the fallback direction (0, 1) and
        // maximally oblique so any proper segment wins a tie against it.
        let fallback = Vec2::new(0.0, 1.0);
        return (
            SignedDistance::new(non_zero_sign(fallback.cross(aq)) * aq.length(), 1.0),
            0.0,
        );
    }
    let param = aq.dot(ab) / denom;
    let eq = if param > 0.5 { p1 - origin } else { p0 - origin };
    let endpoint_distance = eq.length();
    if param > 0.0 && param < 1.0 {
        let ortho_distance = ab.orthonormal(true, false).dot(aq);
        if ortho_distance.abs() < endpoint_distance {
            return (SignedDistance::new(ortho_distance, 0.0), param);
        }
    }
    (
        SignedDistance::new(
            non_zero_sign(ab.cross(aq)) * endpoint_distance,
            ab.normalize(false).dot(eq.normalize(false)).abs(),
        ),
        param,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1.0e-9;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn linear_distance_positive_on_left() {
        let edge = EdgeSegment::linear(v(0.0, 0.0), v(1.0, 0.0), EdgeColor::WHITE);
        let (above, t) = edge.signed_distance(v(0.5, 0.5));
        assert!((above.distance - 0.5).abs() < EPS);
        assert_eq!(above.dot, 0.0);
        assert!((t - 0.5).abs() < EPS);
        let (below, _) = edge.signed_distance(v(0.5, -0.25));
        assert!((below.distance + 0.25).abs() < EPS);
    }

    #[test]
    fn linear_endpoint_hit_reports_obliqueness() {
        let edge = EdgeSegment::linear(v(0.0, 0.0), v(1.0, 0.0), EdgeColor::WHITE);
        let (distance, t) = edge.signed_distance(v(2.0, 0.0));
        assert!(t > 1.0);
        assert!((distance.distance.abs() - 1.0).abs() < EPS);
        assert!((distance.dot - 1.0).abs() < EPS);
    }

    #[test]
    fn point_on_quadratic_has_zero_distance() {
        let edge = EdgeSegment::quadratic(v(0.0, 0.0), v(1.0, 2.0), v(2.0, 0.0), EdgeColor::WHITE);
        for &t in &[0.1, 0.3, 0.5, 0.77] {
            let (distance, param) = edge.signed_distance(edge.point(t));
            assert!(distance.distance.abs() < 1.0e-7, "t={t}: {distance:?}");
            assert!((param - t).abs() < 1.0e-4);
        }
    }

    #[test]
    fn quadratic_sign_matches_side() {
        // Arc bulging downwards, travelling in +x: the region above is on the left.
        let edge = EdgeSegment::quadratic(v(0.0, 0.0), v(0.5, -0.2), v(1.0, 0.0), EdgeColor::WHITE);
        assert!(edge.signed_distance(v(0.5, 0.5)).0.distance > 0.0);
        assert!(edge.signed_distance(v(0.5, -1.0)).0.distance < 0.0);
    }

    #[test]
    fn point_on_cubic_has_zero_distance() {
        let edge = EdgeSegment::cubic(
            v(0.0, 0.0),
            v(0.0, 1.0),
            v(1.0, 1.0),
            v(1.0, 0.0),
            EdgeColor::WHITE,
        );
        for &t in &[0.2, 0.5, 0.8] {
            let (distance, _) = edge.signed_distance(edge.point(t));
            assert!(distance.distance.abs() < 1.0e-6, "t={t}: {distance:?}");
        }
        // The arch opens downwards and travels left to right: its inside is below.
        assert!(edge.signed_distance(v(0.5, 0.3)).0.distance < 0.0);
        assert!(edge.signed_distance(v(0.5, 1.5)).0.distance > 0.0);
    }

    #[test]
    fn degenerate_quadratic_control_is_normalized() {
        let edge = EdgeSegment::quadratic(v(0.0, 0.0), v(0.0, 0.0), v(2.0, 2.0), EdgeColor::WHITE);
        assert_eq!(edge.control_points()[1], v(1.0, 1.0));
        assert!(edge.direction(0.0).length() > 0.0);
    }

    #[test]
    fn split_in_thirds_reproduces_curve() {
        let edges = [
            EdgeSegment::linear(v(0.0, 0.0), v(3.0, 1.0), EdgeColor::CYAN),
            EdgeSegment::quadratic(v(0.0, 0.0), v(1.0, 3.0), v(3.0, 0.0), EdgeColor::CYAN),
            EdgeSegment::cubic(v(0.0, 0.0), v(1.0, 3.0), v(2.0, -2.0), v(3.0, 1.0), EdgeColor::CYAN),
        ];
        for edge in edges {
            let parts = edge.split_in_thirds();
            assert_eq!(parts[0].start(), edge.start());
            assert_eq!(parts[2].end(), edge.end());
            assert_eq!(parts[0].end(), parts[1].start());
            assert_eq!(parts[1].end(), parts[2].start());
            for (i, part) in parts.iter().enumerate() {
                assert_eq!(part.color, EdgeColor::CYAN);
                for k in 0..=4 {
                    let local = k as f64 / 4.0;
                    let global = (i as f64 + local) / 3.0;
                    let diff = part.point(local) - edge.point(global);
                    assert!(diff.length() < 1.0e-9, "{edge:?} part {i} at {local}");
                }
            }
        }
    }

    #[test]
    fn perpendicular_distance_extends_tangent() {
        let edge = EdgeSegment::linear(v(0.0, 0.0), v(1.0, 0.0), EdgeColor::WHITE);
        let origin = v(2.0, 0.5);
        let (mut distance, param) = edge.signed_distance(origin);
        assert!(param > 1.0);
        edge.distance_to_perpendicular_distance(&mut distance, origin, param);
        assert!((distance.distance - 0.5).abs() < EPS);
        assert_eq!(distance.dot, 0.0);
    }

    #[test]
    fn quadratic_bounds_include_extremum() {
        let edge = EdgeSegment::quadratic(v(0.0, 0.0), v(1.0, 2.0), v(2.0, 0.0), EdgeColor::WHITE);
        let (min, max) = edge.bounds();
        assert_eq!(min, v(0.0, 0.0));
        assert!((max.y - 1.0).abs() < EPS);
        assert!((max.x - 2.0).abs() < EPS);
    }
}
