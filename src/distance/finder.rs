use crate::geometry::{EdgeSegment, SegmentId, Shape};
use crate::math::Vec2;

use super::combiner::ContourCombiner;
use super::selector::EdgeSelector;

type DistanceOf<C> = <<C as ContourCombiner>::Selector as EdgeSelector>::Distance;
type CacheOf<C> = <<C as ContourCombiner>::Selector as EdgeSelector>::Cache;

/// Distance queries against one shape, with a per-segment cache that pays off when
/// successive queries are close together (e.g. walking along a bitmap row).
pub struct ShapeDistanceFinder<'a, C: ContourCombiner> {
    shape: &'a Shape,
    combiner: C,
    caches: Vec<CacheOf<C>>,
}

impl<'a, C: ContourCombiner> ShapeDistanceFinder<'a, C> {
    pub fn new(shape: &'a Shape) -> Self {
        Self {
            shape,
            combiner: C::new(shape),
            caches: vec![<CacheOf<C>>::default(); shape.edge_count()],
        }
    }

    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    /// Distance from `origin` to the shape.
    pub fn distance(&mut self, origin: Vec2) -> DistanceOf<C> {
        let shape = self.shape;
        let combiner = &mut self.combiner;
        let mut caches = self.caches.iter_mut();
        visit_edges(shape, combiner, origin, |selector, id, prev, edge, next| {
            if let Some(cache) = caches.next() {
                selector.add_edge(cache, id, prev, edge, next);
            }
        });
        self.combiner.distance(shape)
    }

    /// Single query without keeping any cache.
    pub fn one_shot_distance(shape: &Shape, origin: Vec2) -> DistanceOf<C> {
        let mut combiner = C::new(shape);
        visit_edges(shape, &mut combiner, origin, |selector, id, prev, edge, next| {
            let mut cache = <CacheOf<C>>::default();
            selector.add_edge(&mut cache, id, prev, edge, next);
        });
        combiner.distance(shape)
    }
}

/// Resets `combiner` at `origin` and feeds every segment, with its neighbours, to the
/// selector of its contour. Each contour starts with its last segment.
fn visit_edges<C, F>(shape: &Shape, combiner: &mut C, origin: Vec2, mut add: F)
where
    C: ContourCombiner,
    F: FnMut(&mut C::Selector, SegmentId, &EdgeSegment, &EdgeSegment, &EdgeSegment),
{
    combiner.reset(origin);
    for (contour_index, contour) in shape.contours.iter().enumerate() {
        let edges = &contour.edges;
        let n = edges.len();
        if n == 0 {
            continue;
        }
        let selector = combiner.edge_selector(contour_index);
        let mut prev = if n >= 2 { n - 2 } else { 0 };
        let mut cur = n - 1;
        for next in 0..n {
            let id = SegmentId {
                contour: contour_index,
                segment: cur,
            };
            add(selector, id, &edges[prev], &edges[cur], &edges[next]);
            prev = cur;
            cur = next;
        }
    }
}
