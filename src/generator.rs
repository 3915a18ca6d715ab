//! Distance field generation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bitmap::Bitmap;
use crate::correction::{correct_errors, ErrorCorrectionConfig};
use crate::distance::{
    ContourCombiner, DistanceValue, EdgeSelector, MultiAndTrueDistanceSelector,
    MultiDistanceSelector, OverlappingContourCombiner, PseudoDistanceSelector,
    ShapeDistanceFinder, SimpleContourCombiner, TrueDistanceSelector,
};
use crate::error::Result;
use crate::geometry::Shape;
use crate::math::Vec2;
use crate::projection::{DistanceMapping, Projection};

/// Generation settings shared by all field kinds.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Resolve the distance per contour so overlapping contours do not leave seams.
    /// Also relaxes the topology check to accept crossing contours.
    pub overlap_support: bool,
    /// Applied to MSDF and MTSDF output.
    pub error_correction: ErrorCorrectionConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            overlap_support: true,
            error_correction: ErrorCorrectionConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        self.error_correction.validate()
    }
}

/// Single-channel true signed distance field.
pub fn generate_sdf(
    shape: &Shape,
    projection: &Projection,
    range: f64,
    width: u32,
    height: u32,
    config: &GeneratorConfig,
) -> Result<Bitmap> {
    generate::<TrueDistanceSelector>("SDF", shape, projection, range, width, height, config)
}

/// Single-channel signed pseudo distance field.
pub fn generate_psdf(
    shape: &Shape,
    projection: &Projection,
    range: f64,
    width: u32,
    height: u32,
    config: &GeneratorConfig,
) -> Result<Bitmap> {
    generate::<PseudoDistanceSelector>("PSDF", shape, projection, range, width, height, config)
}

/// Three-channel field reconstructing sharp corners from the median of the channels.
/// The shape should be colored first, e.g. with [`edge_coloring_simple`].
///
/// [`edge_coloring_simple`]: crate::coloring::edge_coloring_simple
pub fn generate_msdf(
    shape: &Shape,
    projection: &Projection,
    range: f64,
    width: u32,
    height: u32,
    config: &GeneratorConfig,
) -> Result<Bitmap> {
    let mut bitmap =
        generate::<MultiDistanceSelector>("MSDF", shape, projection, range, width, height, config)?;
    correct_errors(&mut bitmap, shape, projection, range, config)?;
    Ok(bitmap)
}

/// MSDF with the true signed distance in a fourth channel.
pub fn generate_mtsdf(
    shape: &Shape,
    projection: &Projection,
    range: f64,
    width: u32,
    height: u32,
    config: &GeneratorConfig,
) -> Result<Bitmap> {
    let mut bitmap = generate::<MultiAndTrueDistanceSelector>(
        "MTSDF", shape, projection, range, width, height, config,
    )?;
    correct_errors(&mut bitmap, shape, projection, range, config)?;
    Ok(bitmap)
}

fn generate<S: EdgeSelector>(
    kind: &str,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    width: u32,
    height: u32,
    config: &GeneratorConfig,
) -> Result<Bitmap> {
    config.validate()?;
    projection.validate()?;
    let mapping = DistanceMapping::new(range)?;
    shape.validate()?;
    shape.check_topology(config.overlap_support)?;

    let channels = <S::Distance as DistanceValue>::CHANNELS;
    let mut bitmap = Bitmap::new(width, height, channels)?;
    debug!(
        "Generating {} {}x{} from {} contours, {} segments",
        kind,
        width,
        height,
        shape.contours.len(),
        shape.edge_count()
    );
    if config.overlap_support {
        fill_rows::<OverlappingContourCombiner<S>>(&mut bitmap, shape, projection, mapping);
    } else {
        fill_rows::<SimpleContourCombiner<S>>(&mut bitmap, shape, projection, mapping);
    }
    Ok(bitmap)
}

/// Writes every texel of `bitmap`. Each row owns its finder and walks left to right, so
/// the output does not depend on how rows are scheduled.
fn fill_rows<C: ContourCombiner>(
    bitmap: &mut Bitmap,
    shape: &Shape,
    projection: &Projection,
    mapping: DistanceMapping,
) {
    let row_len = bitmap.row_len();
    let channels = bitmap.channels;
    bitmap
        .pixels
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let mut finder = ShapeDistanceFinder::<C>::new(shape);
            for (x, texel) in row.chunks_exact_mut(channels).enumerate() {
                let p = projection.unproject(Vec2::new(x as f64 + 0.5, y as f64 + 0.5));
                finder.distance(p).write(texel, |d| mapping.map(d));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coloring::edge_coloring_simple;
    use crate::correction::{DistanceCheckMode, ErrorCorrectionMode};
    use crate::error::{MsdfError, ShapeError};
    use crate::geometry::fixtures::{circle, triangle_with_hole, unit_square};

    fn square_projection() -> Projection {
        // Unit square spans texels 4..12 of a 16x16 bitmap.
        Projection::new(Vec2::splat(8.0), Vec2::splat(0.5))
    }

    #[test]
    fn sdf_is_positive_inside_and_negative_outside() {
        let bitmap = generate_sdf(
            &unit_square(),
            &square_projection(),
            0.5,
            16,
            16,
            &GeneratorConfig::default(),
        )
        .unwrap();
        assert_eq!(bitmap.channels, 1);
        assert!(bitmap.texel(8, 8)[0] > 0.5);
        assert!(bitmap.texel(1, 8)[0] < 0.5);
        // Texel (7, 7) is centered 0.4375 units from the nearest side.
        assert!((bitmap.texel(7, 7)[0] - 1.375).abs() < 1.0e-6);
    }

    #[test]
    fn psdf_matches_sdf_sign() {
        let config = GeneratorConfig::default();
        let sdf = generate_sdf(&unit_square(), &square_projection(), 0.5, 16, 16, &config).unwrap();
        let psdf = generate_psdf(&unit_square(), &square_projection(), 0.5, 16, 16, &config).unwrap();
        for (a, b) in sdf.pixels.iter().zip(&psdf.pixels) {
            assert_eq!(*a > 0.5, *b > 0.5);
        }
    }

    #[test]
    fn msdf_median_matches_sdf_sign() {
        let shape = edge_coloring_simple(&triangle_with_hole(), 3.0, 0);
        let projection = Projection::new(Vec2::splat(6.0), Vec2::new(0.5, 0.5));
        let config = GeneratorConfig::default();
        let sdf = generate_sdf(&shape, &projection, 0.5, 28, 26, &config).unwrap();
        let msdf = generate_msdf(&shape, &projection, 0.5, 28, 26, &config).unwrap();
        assert_eq!(msdf.channels, 3);
        let mut mismatches = 0;
        for y in 0..26 {
            for x in 0..28 {
                let s = sdf.texel(x, y)[0];
                // Texels right at the boundary may round either way.
                if (s - 0.5).abs() > 0.25 && (s > 0.5) != (msdf.median_at(x, y) > 0.5) {
                    mismatches += 1;
                }
            }
        }
        assert_eq!(mismatches, 0);
        // Inside the hole is outside the shape.
        let hole = projection.project(Vec2::new(2.0, 1.3));
        assert!(msdf.sample_median(hole) < 0.5);
    }

    #[test]
    fn mtsdf_alpha_is_true_distance() {
        let shape = edge_coloring_simple(&unit_square(), 3.0, 0);
        let config = GeneratorConfig::default();
        let sdf = generate_sdf(&shape, &square_projection(), 0.5, 16, 16, &config).unwrap();
        let mtsdf = generate_mtsdf(&shape, &square_projection(), 0.5, 16, 16, &config).unwrap();
        assert_eq!(mtsdf.channels, 4);
        for y in 0..16 {
            for x in 0..16 {
                assert!((mtsdf.texel(x, y)[3] - sdf.texel(x, y)[0]).abs() < 1.0e-6);
            }
        }
    }

    #[test]
    fn regeneration_is_bit_identical() {
        let shape = edge_coloring_simple(&triangle_with_hole(), 3.0, 7);
        let projection = Projection::new(Vec2::splat(5.0), Vec2::splat(0.5));
        let config = GeneratorConfig::default();
        let first = generate_msdf(&shape, &projection, 0.4, 24, 22, &config).unwrap();
        let second = generate_msdf(&shape, &projection, 0.4, 24, 22, &config).unwrap();
        assert_eq!(first.pixels, second.pixels);
    }

    #[test]
    fn overlap_support_keeps_signs_of_nested_shapes() {
        let shape = edge_coloring_simple(&triangle_with_hole(), 3.0, 0);
        let projection = Projection::new(Vec2::splat(4.0), Vec2::splat(0.5));
        let overlapping = GeneratorConfig::default();
        let simple = GeneratorConfig {
            overlap_support: false,
            ..GeneratorConfig::default()
        };
        let a = generate_psdf(&shape, &projection, 0.5, 20, 18, &overlapping).unwrap();
        let b = generate_psdf(&shape, &projection, 0.5, 20, 18, &simple).unwrap();
        for (a, b) in a.pixels.iter().zip(&b.pixels) {
            if (a - 0.5).abs() > 0.05 {
                assert_eq!(*a > 0.5, *b > 0.5);
            }
        }
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let config = GeneratorConfig::default();
        let projection = square_projection();
        assert_eq!(
            generate_sdf(&unit_square(), &projection, 0.0, 16, 16, &config),
            Err(MsdfError::InvalidRange(0.0))
        );
        assert_eq!(
            generate_sdf(&unit_square(), &projection, 0.5, 0, 16, &config),
            Err(MsdfError::InvalidDimensions {
                width: 0,
                height: 16
            })
        );
        let flat = Projection::new(Vec2::new(0.0, 1.0), Vec2::ZERO);
        assert_eq!(
            generate_msdf(&unit_square(), &flat, 0.5, 16, 16, &config),
            Err(MsdfError::InvalidProjection)
        );
        let bad_config = GeneratorConfig {
            error_correction: ErrorCorrectionConfig {
                mode: ErrorCorrectionMode::EdgeOnly,
                distance_check_mode: DistanceCheckMode::CheckAtEdge,
                ..ErrorCorrectionConfig::default()
            },
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            generate_msdf(&unit_square(), &projection, 0.5, 16, 16, &bad_config),
            Err(MsdfError::InvalidConfig { .. })
        ));
        let mut reversed = unit_square();
        reversed.contours[0] = reversed.contours[0].reversed();
        let strict = GeneratorConfig {
            overlap_support: false,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            generate_sdf(&reversed, &projection, 0.5, 16, 16, &strict),
            Err(MsdfError::InvalidShape(ShapeError::InconsistentWinding { .. }))
        ));
    }

    #[test]
    fn clockwise_outline_rejected_by_default() {
        let mut reversed = unit_square();
        reversed.contours[0] = reversed.contours[0].reversed();
        let config = GeneratorConfig::default();
        assert!(config.overlap_support);
        assert_eq!(
            generate_sdf(&reversed, &square_projection(), 0.5, 16, 16, &config),
            Err(MsdfError::InvalidShape(ShapeError::InconsistentWinding {
                contour: 0,
                depth: 0,
                winding: 1
            }))
        );
    }

    #[test]
    fn circle_boundary_lies_on_radius() {
        let shape = circle(Vec2::ZERO, 1.0);
        let projection = Projection::new(Vec2::splat(16.0), Vec2::splat(1.0));
        let bitmap = generate_msdf(
            &shape,
            &projection,
            0.25,
            32,
            32,
            &GeneratorConfig::default(),
        )
        .unwrap();
        // Texels straddling the circle keep the boundary within a texel.
        for angle in (0..16).map(|i| f64::from(i) * std::f64::consts::TAU / 16.0) {
            let dir = Vec2::new(angle.cos(), angle.sin());
            let inside = projection.project(dir * 0.9);
            let outside = projection.project(dir * 1.1);
            assert!(bitmap.sample_median(inside) > 0.5);
            assert!(bitmap.sample_median(outside) < 0.5);
        }
    }
}
