//! Float bitmaps holding generated distance fields.

use crate::error::{MsdfError, Result};
use crate::math::{median, mix, Vec2};

/// Row-major float bitmap with `channels` values per texel. Row 0 is at y = 0 of the
/// projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Values per texel (1, 3 or 4).
    pub channels: usize,
    /// Texel values, length = width * height * channels.
    pub pixels: Vec<f32>,
}

impl Bitmap {
    /// Zero-filled bitmap. Both dimensions and the channel count must be non-zero.
    pub fn new(width: u32, height: u32, channels: usize) -> Result<Self> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(MsdfError::InvalidDimensions { width, height });
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels))
            .ok_or(MsdfError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            channels,
            pixels: vec![0.0; len],
        })
    }

    /// Number of values in one row.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels
    }

    pub fn texel(&self, x: u32, y: u32) -> &[f32] {
        let start = self.offset(x, y);
        &self.pixels[start..start + self.channels]
    }

    pub fn texel_mut(&mut self, x: u32, y: u32) -> &mut [f32] {
        let start = self.offset(x, y);
        let channels = self.channels;
        &mut self.pixels[start..start + channels]
    }

    /// Median of the first three channels, or the single value of one-channel bitmaps.
    pub fn median_at(&self, x: u32, y: u32) -> f32 {
        let texel = self.texel(x, y);
        if texel.len() >= 3 {
            median(texel[0], texel[1], texel[2])
        } else {
            texel[0]
        }
    }

    /// Bilinear sample at `pos` in texel space (texel centers at +0.5), clamped at the
    /// borders. Writes `channels` values into `out`.
    pub fn sample(&self, pos: Vec2, out: &mut [f32]) {
        let pos = pos - Vec2::splat(0.5);
        let l = pos.x.floor();
        let b = pos.y.floor();
        let lr = pos.x - l;
        let bt = pos.y - b;
        let clamp_x = |v: f64| v.clamp(0.0, f64::from(self.width - 1)) as u32;
        let clamp_y = |v: f64| v.clamp(0.0, f64::from(self.height - 1)) as u32;
        let (l, r) = (clamp_x(l), clamp_x(l + 1.0));
        let (b, t) = (clamp_y(b), clamp_y(b + 1.0));
        let (lb, rb, lt, rt) = (self.texel(l, b), self.texel(r, b), self.texel(l, t), self.texel(r, t));
        for (i, value) in out.iter_mut().enumerate().take(self.channels) {
            *value = mix(mix(lb[i], rb[i], lr), mix(lt[i], rt[i], lr), bt);
        }
    }

    /// Median of a bilinear sample.
    pub fn sample_median(&self, pos: Vec2) -> f32 {
        let mut texel = [0.0f32; 4];
        self.sample(pos, &mut texel);
        if self.channels >= 3 {
            median(texel[0], texel[1], texel[2])
        } else {
            texel[0]
        }
    }

    /// 8-bit RGBA conversion for upload. One-channel bitmaps become gray, three-channel
    /// bitmaps get an opaque alpha.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for texel in self.pixels.chunks_exact(self.channels) {
            let rgba = match texel {
                [v] => [quantize(*v), quantize(*v), quantize(*v), 255],
                [r, g, b] => [quantize(*r), quantize(*g), quantize(*b), 255],
                [r, g, b, a, ..] => [quantize(*r), quantize(*g), quantize(*b), quantize(*a)],
                [a, b] => [quantize(*a), quantize(*b), 0, 255],
                [] => [0, 0, 0, 255],
            };
            out.extend_from_slice(&rgba);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Bitmap {
        let mut bitmap = Bitmap::new(2, 2, 3).unwrap();
        bitmap.texel_mut(0, 0).copy_from_slice(&[0.0, 0.2, 0.4]);
        bitmap.texel_mut(1, 0).copy_from_slice(&[1.0, 0.2, 0.4]);
        bitmap.texel_mut(0, 1).copy_from_slice(&[0.0, 0.8, 0.4]);
        bitmap.texel_mut(1, 1).copy_from_slice(&[1.0, 0.8, 0.4]);
        bitmap
    }

    #[test]
    fn bilinear_sample_between_texels() {
        let bitmap = gradient();
        let mut out = [0.0f32; 3];
        bitmap.sample(Vec2::new(1.0, 1.0), &mut out);
        assert!((out[0] - 0.5).abs() < 1.0e-6);
        assert!((out[1] - 0.5).abs() < 1.0e-6);
        assert!((out[2] - 0.4).abs() < 1.0e-6);
        assert!((bitmap.sample_median(Vec2::new(1.0, 1.0)) - 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn sampling_clamps_at_borders() {
        let bitmap = gradient();
        let mut out = [0.0f32; 3];
        bitmap.sample(Vec2::new(-3.0, 0.5), &mut out);
        assert_eq!(out, [0.0, 0.2, 0.4]);
        bitmap.sample(Vec2::new(5.0, 5.0), &mut out);
        assert_eq!(out, [1.0, 0.8, 0.4]);
    }

    #[test]
    fn median_and_rgba_conversion() {
        let bitmap = gradient();
        assert_eq!(bitmap.median_at(1, 1), 0.8);
        let rgba = bitmap.to_rgba8();
        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[4..8], &[255, 51, 102, 255]);
    }

    #[test]
    fn zero_sized_bitmaps_are_rejected() {
        assert_eq!(
            Bitmap::new(0, 4, 3),
            Err(MsdfError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
    }
}
