//! SIMD-accelerated grayscale resizing.
//!
//! Uses fast_image_resize, which picks AVX2/NEON when available.

use crate::error::ScoreError;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::{GrayImage, ImageBuffer, Luma};
use std::path::Path;

/// Reusable resizer; one per scoring worker
pub struct LumaResizer {
    resizer: Resizer,
    options: ResizeOptions,
}

impl LumaResizer {
    /// Create a resizer using bilinear convolution
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
            options: ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
                fast_image_resize::FilterType::Bilinear,
            )),
        }
    }

    /// Resize `gray` to exactly `width` x `height`.
    ///
    /// `path` only labels errors.
    pub fn resize(
        &mut self,
        gray: &GrayImage,
        width: u32,
        height: u32,
        path: &Path,
    ) -> Result<GrayImage, ScoreError> {
        let failure = |reason: String| ScoreError::ScoringFailure {
            path: path.to_path_buf(),
            reason,
        };

        let (src_width, src_height) = gray.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(failure("invalid source dimensions".to_string()));
        }
        if width == 0 || height == 0 {
            return Err(failure("invalid destination dimensions".to_string()));
        }
        if (src_width, src_height) == (width, height) {
            return Ok(gray.clone());
        }

        let src_image = Image::from_vec_u8(src_width, src_height, gray.as_raw().clone(), PixelType::U8)
            .map_err(|e| failure(format!("failed to wrap source image: {}", e)))?;
        let mut dst_image = Image::new(width, height, PixelType::U8);

        self.resizer
            .resize(&src_image, &mut dst_image, &self.options)
            .map_err(|e| failure(format!("resize failed: {}", e)))?;

        let result: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width, height, dst_image.into_vec())
                .ok_or_else(|| failure("resized buffer has the wrong size".to_string()))?;

        Ok(result)
    }
}

impl Default for LumaResizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            Luma([((x + y) * 255 / (width + height).max(1)) as u8])
        })
    }

    #[test]
    fn resize_produces_requested_dimensions() {
        let mut resizer = LumaResizer::new();
        let resized = resizer
            .resize(&gradient(200, 100), 100, 50, Path::new("a.png"))
            .unwrap();

        assert_eq!(resized.dimensions(), (100, 50));
    }

    #[test]
    fn upscaling_is_allowed() {
        let mut resizer = LumaResizer::new();
        let resized = resizer
            .resize(&gradient(10, 5), 100, 50, Path::new("a.png"))
            .unwrap();

        assert_eq!(resized.dimensions(), (100, 50));
    }

    #[test]
    fn same_size_is_a_copy() {
        let mut resizer = LumaResizer::new();
        let source = gradient(16, 16);
        let resized = resizer.resize(&source, 16, 16, Path::new("a.png")).unwrap();

        assert_eq!(resized, source);
    }

    #[test]
    fn zero_destination_is_rejected() {
        let mut resizer = LumaResizer::new();
        assert!(resizer
            .resize(&gradient(16, 16), 0, 16, Path::new("a.png"))
            .is_err());
    }
}
