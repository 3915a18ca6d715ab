//! Contour combiners: decide how per-contour selectors form the shape distance.

use crate::geometry::Shape;
use crate::math::Vec2;

use super::selector::EdgeSelector;
use super::types::DistanceValue;

/// Owns the selectors that segments are registered with and combines their results.
pub trait ContourCombiner: Send {
    type Selector: EdgeSelector;

    fn new(shape: &Shape) -> Self;

    /// Starts a new query at `point`.
    fn reset(&mut self, point: Vec2);

    /// Selector receiving the segments of contour `contour`.
    fn edge_selector(&mut self, contour: usize) -> &mut Self::Selector;

    fn distance(&self, shape: &Shape) -> <Self::Selector as EdgeSelector>::Distance;
}

/// One selector for the whole shape; correct for shapes without overlapping contours.
#[derive(Debug, Clone)]
pub struct SimpleContourCombiner<S> {
    selector: S,
}

impl<S: EdgeSelector> ContourCombiner for SimpleContourCombiner<S> {
    type Selector = S;

    fn new(_shape: &Shape) -> Self {
        Self {
            selector: S::default(),
        }
    }

    fn reset(&mut self, point: Vec2) {
        self.selector.reset(point);
    }

    fn edge_selector(&mut self, _contour: usize) -> &mut S {
        &mut self.selector
    }

    fn distance(&self, shape: &Shape) -> S::Distance {
        self.selector.distance(shape)
    }
}

/// One selector per contour, resolved with contour orientation so overlapping
/// contours do not cut into each other.
#[derive(Debug, Clone)]
pub struct OverlappingContourCombiner<S> {
    point: Vec2,
    // +1 for outlines, -1 for holes, 0 for degenerate contours.
    polarities: Vec<i32>,
    selectors: Vec<S>,
}

impl<S: EdgeSelector> ContourCombiner for OverlappingContourCombiner<S> {
    type Selector = S;

    fn new(shape: &Shape) -> Self {
        Self {
            point: Vec2::ZERO,
            polarities: shape.contours.iter().map(|c| -c.winding()).collect(),
            selectors: vec![S::default(); shape.contours.len()],
        }
    }

    fn reset(&mut self, point: Vec2) {
        self.point = point;
        for selector in &mut self.selectors {
            selector.reset(point);
        }
    }

    fn edge_selector(&mut self, contour: usize) -> &mut S {
        &mut self.selectors[contour]
    }

    fn distance(&self, shape: &Shape) -> S::Distance {
        let mut shape_selector = S::default();
        let mut inner_selector = S::default();
        let mut outer_selector = S::default();
        shape_selector.reset(self.point);
        inner_selector.reset(self.point);
        outer_selector.reset(self.point);

        let contour_distances: Vec<S::Distance> =
            self.selectors.iter().map(|s| s.distance(shape)).collect();

        for ((selector, distance), &polarity) in self
            .selectors
            .iter()
            .zip(&contour_distances)
            .zip(&self.polarities)
        {
            shape_selector.merge(selector);
            if polarity > 0 && distance.resolve() >= 0.0 {
                inner_selector.merge(selector);
            }
            if polarity < 0 && distance.resolve() <= 0.0 {
                outer_selector.merge(selector);
            }
        }

        let shape_distance = shape_selector.distance(shape);
        let inner_distance = inner_selector.distance(shape);
        let outer_distance = outer_selector.distance(shape);
        let inner_scalar = inner_distance.resolve();
        let outer_scalar = outer_distance.resolve();

        let mut distance;
        let polarity;
        if inner_scalar >= 0.0 && inner_scalar.abs() <= outer_scalar.abs() {
            distance = inner_distance;
            polarity = 1;
            for (contour, _) in contour_distances
                .iter()
                .zip(&self.polarities)
                .filter(|(_, &p)| p > 0)
            {
                let resolved = contour.resolve();
                if resolved.abs() < outer_scalar.abs() && resolved > distance.resolve() {
                    distance = *contour;
                }
            }
        } else if outer_scalar <= 0.0 && outer_scalar.abs() < inner_scalar.abs() {
            distance = outer_distance;
            polarity = -1;
            for (contour, _) in contour_distances
                .iter()
                .zip(&self.polarities)
                .filter(|(_, &p)| p < 0)
            {
                let resolved = contour.resolve();
                if resolved.abs() < inner_scalar.abs() && resolved < distance.resolve() {
                    distance = *contour;
                }
            }
        } else {
            return shape_distance;
        }

        for (contour, _) in contour_distances
            .iter()
            .zip(&self.polarities)
            .filter(|(_, &p)| p != polarity)
        {
            let resolved = contour.resolve();
            if resolved * distance.resolve() >= 0.0 && resolved.abs() < distance.resolve().abs() {
                distance = *contour;
            }
        }
        if distance.resolve() == shape_distance.resolve() {
            distance = shape_distance;
        }
        distance
    }
}
