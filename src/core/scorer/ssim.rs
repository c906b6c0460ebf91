//! Windowed structural similarity (Wang et al., 2004).
//!
//! Local statistics come from summed-area tables, so the cost is linear in
//! the pixel count regardless of window size.

use image::GrayImage;

/// Default side length of the square comparison window
pub const DEFAULT_WINDOW: u32 = 7;

const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Summed-area table with one extra leading row and column of zeros
struct Integral {
    stride: usize,
    sums: Vec<f64>,
}

impl Integral {
    fn build(width: usize, height: usize, value: impl Fn(usize) -> f64) -> Self {
        let stride = width + 1;
        let mut sums = vec![0.0; stride * (height + 1)];
        for y in 0..height {
            let mut row = 0.0;
            for x in 0..width {
                row += value(y * width + x);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        Self { stride, sums }
    }

    /// Sum over the `size` x `size` window whose top-left corner is (x, y)
    fn window(&self, x: usize, y: usize, size: usize) -> f64 {
        let s = self.stride;
        let (x1, y1) = (x + size, y + size);
        self.sums[y1 * s + x1] - self.sums[y * s + x1] - self.sums[y1 * s + x] + self.sums[y * s + x]
    }
}

/// Window side actually used for an image of the given size.
///
/// `window` shrinks to the largest odd size that fits both dimensions.
pub fn effective_window(width: u32, height: u32, window: u32) -> u32 {
    let size = window.min(width).min(height).max(1);
    if size % 2 == 0 {
        size - 1
    } else {
        size
    }
}

/// Mean SSIM of two equally sized grayscale images, in [-1, 1].
///
/// Uses a uniform window, sample covariance and only the window positions
/// that lie fully inside the image. Returns `None` if the shapes differ.
pub fn mean_ssim(a: &GrayImage, b: &GrayImage, window: u32) -> Option<f64> {
    if a.dimensions() != b.dimensions() {
        return None;
    }
    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let win = effective_window(width, height, window) as usize;
    let (w, h) = (width as usize, height as usize);
    let pa = a.as_raw();
    let pb = b.as_raw();

    let sum_a = Integral::build(w, h, |i| pa[i] as f64);
    let sum_b = Integral::build(w, h, |i| pb[i] as f64);
    let sum_aa = Integral::build(w, h, |i| (pa[i] as f64).powi(2));
    let sum_bb = Integral::build(w, h, |i| (pb[i] as f64).powi(2));
    let sum_ab = Integral::build(w, h, |i| pa[i] as f64 * pb[i] as f64);

    let n = (win * win) as f64;
    let cov_norm = if win > 1 { n / (n - 1.0) } else { 1.0 };
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let mut total = 0.0;
    let mut count = 0usize;
    for y in 0..=(h - win) {
        for x in 0..=(w - win) {
            let mean_a = sum_a.window(x, y, win) / n;
            let mean_b = sum_b.window(x, y, win) / n;
            let var_a = cov_norm * (sum_aa.window(x, y, win) / n - mean_a * mean_a);
            let var_b = cov_norm * (sum_bb.window(x, y, win) / n - mean_b * mean_b);
            let cov = cov_norm * (sum_ab.window(x, y, win) / n - mean_a * mean_b);

            let numerator = (2.0 * mean_a * mean_b + c1) * (2.0 * cov + c2);
            let denominator = (mean_a * mean_a + mean_b * mean_b + c1) * (var_a + var_b + c2);
            total += numerator / denominator;
            count += 1;
        }
    }

    Some((total / count as f64).clamp(-1.0, 1.0))
}
