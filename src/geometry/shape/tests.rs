use super::*;
use crate::color::EdgeColor;
use crate::geometry::fixtures::{circle, polygon, square, triangle_with_hole, unit_square};

#[test]
fn test_valid_shapes_pass_all_checks() {
    for shape in [unit_square(), circle(Vec2::ZERO, 1.0), triangle_with_hole()] {
        assert_eq!(shape.validate(), Ok(()));
        assert_eq!(shape.check_topology(false), Ok(()));
    }
}

#[test]
fn test_open_contour_rejected() {
    let mut contour = square(0.0, 0.0, 1.0);
    contour.edges.pop();
    let shape = Shape::new(vec![contour]);
    assert_eq!(
        shape.validate(),
        Err(ShapeError::OpenContour {
            contour: 0,
            segment: 2
        })
    );
}

#[test]
fn test_non_finite_point_rejected() {
    let mut contour = square(0.0, 0.0, 1.0);
    contour.edges[1] = EdgeSegment::linear(
        Vec2::new(1.0, 0.0),
        Vec2::new(f64::NAN, 1.0),
        EdgeColor::WHITE,
    );
    let shape = Shape::new(vec![Contour::default(), contour]);
    assert_eq!(
        shape.validate(),
        Err(ShapeError::NonFinitePoint {
            contour: 1,
            segment: 1
        })
    );
}

#[test]
fn test_degenerate_contour_rejected() {
    let shape = Shape::new(vec![polygon(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)])]);
    assert_eq!(
        shape.check_topology(true),
        Err(ShapeError::DegenerateContour { contour: 0 })
    );
}

#[test]
fn test_self_intersection_rejected() {
    let bowtie = polygon(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 1.0)]);
    let shape = Shape::new(vec![bowtie]);
    assert_eq!(
        shape.check_topology(true),
        Err(ShapeError::SelfIntersection { contour: 0 })
    );
}

#[test]
fn test_crossing_contours_need_overlap_support() {
    let shape = Shape::new(vec![square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]);
    assert_eq!(
        shape.check_topology(false),
        Err(ShapeError::CrossingContours {
            first: 0,
            second: 1
        })
    );
    assert_eq!(shape.check_topology(true), Ok(()));
}

#[test]
fn test_hole_orientation_checked() {
    let inner_ccw = square(1.0, 1.0, 1.0);
    let shape = Shape::new(vec![square(0.0, 0.0, 3.0), inner_ccw.clone()]);
    assert_eq!(
        shape.check_topology(false),
        Err(ShapeError::InconsistentWinding {
            contour: 1,
            depth: 1,
            winding: -1
        })
    );

    let shape = Shape::new(vec![square(0.0, 0.0, 3.0), inner_ccw.reversed()]);
    assert_eq!(shape.check_topology(false), Ok(()));
    assert!(shape.contains(Vec2::new(0.5, 0.5)));
    assert!(!shape.contains(Vec2::new(1.5, 1.5)));
    assert!(!shape.contains(Vec2::new(3.5, 1.5)));
}

#[test]
fn test_top_level_hole_rejected_with_overlaps() {
    let reversed = Shape::new(vec![square(0.0, 0.0, 1.0).reversed()]);
    let expected = Err(ShapeError::InconsistentWinding {
        contour: 0,
        depth: 0,
        winding: 1,
    });
    assert_eq!(reversed.check_topology(true), expected);
    assert_eq!(reversed.check_topology(false), expected);

    // Nested outlines with the same orientation are a valid overlap.
    let stacked = Shape::new(vec![square(0.0, 0.0, 3.0), square(1.0, 1.0, 1.0)]);
    assert_eq!(stacked.check_topology(true), Ok(()));
}

#[test]
fn test_contains_curved_outline() {
    let shape = circle(Vec2::new(2.0, 2.0), 1.0);
    assert!(shape.contains(Vec2::new(2.0, 2.0)));
    assert!(shape.contains(Vec2::new(2.9, 2.0)));
    assert!(!shape.contains(Vec2::new(3.1, 2.0)));
    assert!(!shape.contains(Vec2::new(2.8, 2.8)));
}

#[test]
fn test_transforms_return_new_shapes() {
    let shape = unit_square();
    let moved = shape.scale_and_offset(Vec2::new(2.0, 3.0), Vec2::new(1.0, 1.0));
    let (min, max) = moved.bounds().unwrap();
    assert_eq!(min, Vec2::new(2.0, 3.0));
    assert_eq!(max, Vec2::new(4.0, 6.0));
    // Original untouched.
    assert_eq!(shape.bounds().unwrap().1, Vec2::new(1.0, 1.0));

    let mirrored = shape.scaled(Vec2::new(-1.0, 1.0));
    assert_eq!(mirrored.contours[0].winding(), -1);
    assert_eq!(mirrored.validate(), Ok(()));
}

#[test]
fn test_normalized_splits_single_segment_contours() {
    let p = Vec2::ZERO;
    let teardrop = Contour::new(vec![EdgeSegment::cubic(
        p,
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 2.0),
        p,
        EdgeColor::WHITE,
    )]);
    let shape = Shape::new(vec![teardrop, square(3.0, 0.0, 1.0)]).normalized();
    assert_eq!(shape.contours[0].len(), 3);
    assert_eq!(shape.contours[1].len(), 4);
    assert_eq!(shape.edge_count(), 7);
    assert_eq!(shape.validate(), Ok(()));
}

#[test]
fn test_segment_lookup() {
    let shape = unit_square();
    let id = SegmentId {
        contour: 0,
        segment: 2,
    };
    assert_eq!(shape.segment(id).map(EdgeSegment::start), Some(Vec2::new(1.0, 1.0)));
    assert!(shape
        .segment(SegmentId {
            contour: 1,
            segment: 0
        })
        .is_none());
}
