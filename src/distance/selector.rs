//! Edge selectors: accumulate the nearest segments seen from one query point.

use crate::color::EdgeColor;
use crate::geometry::{EdgeSegment, SegmentId, Shape};
use crate::math::{non_zero_sign, Vec2};

use super::types::{
    DistanceValue, MultiAndTrueDistance, MultiDistance, PseudoEdgeCache, SignedDistance,
    TrueEdgeCache,
};

// Cached distances are widened by this factor of the query point displacement.
const DISTANCE_DELTA_FACTOR: f64 = 1.001;

/// Accumulates segment distances for one query point at a time.
///
/// Caches let successive queries at nearby points skip segments that cannot beat the
/// current minimum.
pub trait EdgeSelector: Default + Clone + Send {
    type Distance: DistanceValue;
    type Cache: Default + Clone + Send;

    /// Starts a new query at `point`, keeping the previous result as a widened bound.
    fn reset(&mut self, point: Vec2);

    /// Registers `edge` (handle `id`) with its neighbours in the contour.
    fn add_edge(
        &mut self,
        cache: &mut Self::Cache,
        id: SegmentId,
        prev: &EdgeSegment,
        edge: &EdgeSegment,
        next: &EdgeSegment,
    );

    /// Keeps the better of each tracked value; ties keep `self`.
    fn merge(&mut self, other: &Self);

    /// Resolved distance for the current query point.
    fn distance(&self, shape: &Shape) -> Self::Distance;
}

/// Plain nearest-segment distance.
#[derive(Debug, Clone, Default)]
pub struct TrueDistanceSelector {
    point: Vec2,
    min_distance: SignedDistance,
}

impl EdgeSelector for TrueDistanceSelector {
    type Distance = f64;
    type Cache = TrueEdgeCache;

    fn reset(&mut self, point: Vec2) {
        let delta = DISTANCE_DELTA_FACTOR * (point - self.point).length();
        self.min_distance.distance += non_zero_sign(self.min_distance.distance) * delta;
        self.point = point;
    }

    fn add_edge(
        &mut self,
        cache: &mut TrueEdgeCache,
        _id: SegmentId,
        _prev: &EdgeSegment,
        edge: &EdgeSegment,
        _next: &EdgeSegment,
    ) {
        let delta = DISTANCE_DELTA_FACTOR * (self.point - cache.point).length();
        if cache.abs_distance - delta <= self.min_distance.distance.abs() {
            let (distance, _) = edge.signed_distance(self.point);
            debug_assert!(distance.distance.is_finite(), "non-finite distance from {edge:?}");
            if distance.closer_than(&self.min_distance) {
                self.min_distance = distance;
            }
            cache.point = self.point;
            cache.abs_distance = distance.distance.abs();
        }
    }

    fn merge(&mut self, other: &Self) {
        if other.min_distance.closer_than(&self.min_distance) {
            self.min_distance = other.min_distance;
        }
    }

    fn distance(&self, _shape: &Shape) -> f64 {
        self.min_distance.distance
    }
}

/// Single-channel pseudo distance state shared by all pseudo distance selectors.
#[derive(Debug, Clone)]
pub struct ChannelSelector {
    min_true_distance: SignedDistance,
    min_negative_pseudo: f64,
    min_positive_pseudo: f64,
    near_edge: Option<SegmentId>,
    near_edge_param: f64,
}

impl Default for ChannelSelector {
    fn default() -> Self {
        Self {
            min_true_distance: SignedDistance::INFINITE,
            min_negative_pseudo: -SignedDistance::INFINITE.distance.abs(),
            min_positive_pseudo: SignedDistance::INFINITE.distance.abs(),
            near_edge: None,
            near_edge_param: 0.0,
        }
    }
}

impl ChannelSelector {
    /// Distance of `ep` to the tangent line through an endpoint, if `ep` lies in the
    /// extension domain along `edge_dir` and the result beats `distance`.
    pub fn pseudo_distance(distance: &mut f64, ep: Vec2, edge_dir: Vec2) -> bool {
        let ts = ep.dot(edge_dir);
        if ts > 0.0 {
            let pseudo = edge_dir.cross(ep);
            if pseudo.abs() < distance.abs() {
                *distance = pseudo;
                return true;
            }
        }
        false
    }

    /// Widens the stored minimum by `delta` and reopens the pseudo distance bounds.
    pub fn reset(&mut self, delta: f64) {
        self.min_true_distance.distance += non_zero_sign(self.min_true_distance.distance) * delta;
        self.min_negative_pseudo = -self.min_true_distance.distance.abs();
        self.min_positive_pseudo = self.min_true_distance.distance.abs();
        self.near_edge = None;
        self.near_edge_param = 0.0;
    }

    /// Whether a segment with `cache` measured from `point` could change the result.
    pub fn is_relevant(&self, cache: &PseudoEdgeCache, point: Vec2) -> bool {
        let delta = DISTANCE_DELTA_FACTOR * (point - cache.point).length();
        let domain_relevant = |domain: f64, pseudo: f64| {
            domain > 0.0
                && if pseudo < 0.0 {
                    pseudo + delta >= self.min_negative_pseudo
                } else {
                    pseudo - delta <= self.min_positive_pseudo
                }
        };
        cache.abs_distance - delta <= self.min_true_distance.distance.abs()
            || cache.a_domain_distance.abs() < delta
            || cache.b_domain_distance.abs() < delta
            || domain_relevant(cache.a_domain_distance, cache.a_pseudo_distance)
            || domain_relevant(cache.b_domain_distance, cache.b_pseudo_distance)
    }

    /// Records a true distance; earlier segments win ties.
    pub fn add_true_distance(&mut self, id: SegmentId, distance: SignedDistance, param: f64) {
        debug_assert!(distance.distance.is_finite(), "non-finite distance from {id:?}");
        if distance.closer_than(&self.min_true_distance) {
            self.min_true_distance = distance;
            self.near_edge = Some(id);
            self.near_edge_param = param;
        }
    }

    /// Folds a pseudo distance into the matching bound.
    pub fn add_pseudo_distance(&mut self, distance: f64) {
        if distance <= 0.0 && distance > self.min_negative_pseudo {
            self.min_negative_pseudo = distance;
        }
        if distance >= 0.0 && distance < self.min_positive_pseudo {
            self.min_positive_pseudo = distance;
        }
    }

    pub fn merge(&mut self, other: &Self) {
        if other.min_true_distance.closer_than(&self.min_true_distance) {
            self.min_true_distance = other.min_true_distance;
            self.near_edge = other.near_edge;
            self.near_edge_param = other.near_edge_param;
        }
        if other.min_negative_pseudo > self.min_negative_pseudo {
            self.min_negative_pseudo = other.min_negative_pseudo;
        }
        if other.min_positive_pseudo < self.min_positive_pseudo {
            self.min_positive_pseudo = other.min_positive_pseudo;
        }
    }

    /// Pseudo distance at `point`, refined by the perpendicular distance to the nearest segment.
    pub fn compute_distance(&self, point: Vec2, shape: &Shape) -> f64 {
        let mut min_distance = if self.min_true_distance.distance < 0.0 {
            self.min_negative_pseudo
        } else {
            self.min_positive_pseudo
        };
        if let Some(edge) = self.near_edge.and_then(|id| shape.segment(id)) {
            let mut distance = self.min_true_distance;
            edge.distance_to_perpendicular_distance(&mut distance, point, self.near_edge_param);
            if distance.distance.abs() < min_distance.abs() {
                min_distance = distance.distance;
            }
        }
        min_distance
    }

    pub fn true_distance(&self) -> SignedDistance {
        self.min_true_distance
    }
}

/// Endpoint geometry of one segment as seen from the query point.
struct EndpointDomains {
    ap: Vec2,
    bp: Vec2,
    a_dir: Vec2,
    b_dir: Vec2,
    a_domain: f64,
    b_domain: f64,
}

impl EndpointDomains {
    fn new(point: Vec2, prev: &EdgeSegment, edge: &EdgeSegment, next: &EdgeSegment) -> Self {
        let ap = point - edge.point(0.0);
        let bp = point - edge.point(1.0);
        let a_dir = edge.direction(0.0).normalize(true);
        let b_dir = edge.direction(1.0).normalize(true);
        let prev_dir = prev.direction(1.0).normalize(true);
        let next_dir = next.direction(0.0).normalize(true);
        Self {
            ap,
            bp,
            a_dir,
            b_dir,
            a_domain: ap.dot((prev_dir + a_dir).normalize(true)),
            b_domain: -bp.dot((b_dir + next_dir).normalize(true)),
        }
    }

    /// Evaluates both extension domains, handing accepted pseudo distances to `accept`
    /// and recording the candidates in `cache`.
    fn update(&self, cache: &mut PseudoEdgeCache, true_distance: f64, mut accept: impl FnMut(f64)) {
        if self.a_domain > 0.0 {
            let mut pd = true_distance;
            if ChannelSelector::pseudo_distance(&mut pd, self.ap, -self.a_dir) {
                pd = -pd;
                accept(pd);
            }
            cache.a_pseudo_distance = pd;
        }
        if self.b_domain > 0.0 {
            let mut pd = true_distance;
            if ChannelSelector::pseudo_distance(&mut pd, self.bp, self.b_dir) {
                accept(pd);
            }
            cache.b_pseudo_distance = pd;
        }
        cache.a_domain_distance = self.a_domain;
        cache.b_domain_distance = self.b_domain;
    }
}

/// Single-channel pseudo distance (PSDF).
#[derive(Debug, Clone, Default)]
pub struct PseudoDistanceSelector {
    point: Vec2,
    channel: ChannelSelector,
}

impl EdgeSelector for PseudoDistanceSelector {
    type Distance = f64;
    type Cache = PseudoEdgeCache;

    fn reset(&mut self, point: Vec2) {
        let delta = DISTANCE_DELTA_FACTOR * (point - self.point).length();
        self.channel.reset(delta);
        self.point = point;
    }

    fn add_edge(
        &mut self,
        cache: &mut PseudoEdgeCache,
        id: SegmentId,
        prev: &EdgeSegment,
        edge: &EdgeSegment,
        next: &EdgeSegment,
    ) {
        if !self.channel.is_relevant(cache, self.point) {
            return;
        }
        let (distance, param) = edge.signed_distance(self.point);
        self.channel.add_true_distance(id, distance, param);
        cache.point = self.point;
        cache.abs_distance = distance.distance.abs();

        let domains = EndpointDomains::new(self.point, prev, edge, next);
        let channel = &mut self.channel;
        domains.update(cache, distance.distance, |pd| channel.add_pseudo_distance(pd));
    }

    fn merge(&mut self, other: &Self) {
        self.channel.merge(&other.channel);
    }

    fn distance(&self, shape: &Shape) -> f64 {
        self.channel.compute_distance(self.point, shape)
    }
}

/// Independent pseudo distances for the red, green and blue channels (MSDF).
#[derive(Debug, Clone, Default)]
pub struct MultiDistanceSelector {
    point: Vec2,
    channels: [ChannelSelector; 3],
}

impl MultiDistanceSelector {
    fn channels_of(color: EdgeColor) -> impl Iterator<Item = usize> {
        (0..3).filter(move |&i| color.contains(EdgeColor::channel(i)))
    }

    /// Nearest true distance over all channels.
    pub fn true_distance(&self) -> SignedDistance {
        let mut distance = self.channels[0].true_distance();
        for channel in &self.channels[1..] {
            if channel.true_distance().closer_than(&distance) {
                distance = channel.true_distance();
            }
        }
        distance
    }

    fn multi_distance(&self, shape: &Shape) -> MultiDistance {
        MultiDistance {
            r: self.channels[0].compute_distance(self.point, shape),
            g: self.channels[1].compute_distance(self.point, shape),
            b: self.channels[2].compute_distance(self.point, shape),
        }
    }
}

impl EdgeSelector for MultiDistanceSelector {
    type Distance = MultiDistance;
    type Cache = PseudoEdgeCache;

    fn reset(&mut self, point: Vec2) {
        let delta = DISTANCE_DELTA_FACTOR * (point - self.point).length();
        for channel in &mut self.channels {
            channel.reset(delta);
        }
        self.point = point;
    }

    fn add_edge(
        &mut self,
        cache: &mut PseudoEdgeCache,
        id: SegmentId,
        prev: &EdgeSegment,
        edge: &EdgeSegment,
        next: &EdgeSegment,
    ) {
        let relevant = Self::channels_of(edge.color)
            .any(|i| self.channels[i].is_relevant(cache, self.point));
        if !relevant {
            return;
        }
        let (distance, param) = edge.signed_distance(self.point);
        for i in Self::channels_of(edge.color) {
            self.channels[i].add_true_distance(id, distance, param);
        }
        cache.point = self.point;
        cache.abs_distance = distance.distance.abs();

        let domains = EndpointDomains::new(self.point, prev, edge, next);
        let channels = &mut self.channels;
        domains.update(cache, distance.distance, |pd| {
            for i in Self::channels_of(edge.color) {
                channels[i].add_pseudo_distance(pd);
            }
        });
    }

    fn merge(&mut self, other: &Self) {
        for (channel, other) in self.channels.iter_mut().zip(&other.channels) {
            channel.merge(other);
        }
    }

    fn distance(&self, shape: &Shape) -> MultiDistance {
        self.multi_distance(shape)
    }
}

/// MSDF channels plus the true distance in alpha (MTSDF).
#[derive(Debug, Clone, Default)]
pub struct MultiAndTrueDistanceSelector {
    inner: MultiDistanceSelector,
}

impl EdgeSelector for MultiAndTrueDistanceSelector {
    type Distance = MultiAndTrueDistance;
    type Cache = PseudoEdgeCache;

    fn reset(&mut self, point: Vec2) {
        self.inner.reset(point);
    }

    fn add_edge(
        &mut self,
        cache: &mut PseudoEdgeCache,
        id: SegmentId,
        prev: &EdgeSegment,
        edge: &EdgeSegment,
        next: &EdgeSegment,
    ) {
        self.inner.add_edge(cache, id, prev, edge, next);
    }

    fn merge(&mut self, other: &Self) {
        self.inner.merge(&other.inner);
    }

    fn distance(&self, shape: &Shape) -> MultiAndTrueDistance {
        let multi = self.inner.multi_distance(shape);
        MultiAndTrueDistance {
            r: multi.r,
            g: multi.g,
            b: multi.b,
            a: self.inner.true_distance().distance,
        }
    }
}
