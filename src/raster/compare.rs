//! Image similarity scores.
//!
//! Two scores are produced, both in `[0, 1]` with 0 meaning "the same":
//!
//! - **distance**: Hamming distance between 64-bit DCT perceptual hashes,
//!   divided by 64. Robust to small shifts and compression noise.
//! - **difference**: fraction of pixels whose colour delta in YIQ space
//!   exceeds [`PIXEL_THRESHOLD`]. Alpha is blended over white first.

use std::f64::consts::PI;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::error::{Result, SplitError};

/// Per-pixel colour delta threshold, as a fraction of the largest delta.
pub const PIXEL_THRESHOLD: f64 = 0.1;

/// Side of the grayscale thumbnail the hash is computed on.
const HASH_SAMPLE: usize = 32;

/// Side of the low-frequency DCT block kept for the hash.
const HASH_BLOCK: usize = 8;

/// Largest possible YIQ delta between two colours.
const MAX_YIQ_DELTA: f64 = 35215.0;

/// 64-bit perceptual hash of `image`.
pub fn perceptual_hash(image: &DynamicImage) -> u64 {
    let sample = image
        .resize_exact(HASH_SAMPLE as u32, HASH_SAMPLE as u32, FilterType::Triangle)
        .to_luma8();

    let cosines = dct_cosines();

    // Row pass, only the first HASH_BLOCK frequencies are needed.
    let mut rows = [[0.0f64; HASH_SAMPLE]; HASH_BLOCK];
    for (u, row) in rows.iter_mut().enumerate() {
        for (y, value) in row.iter_mut().enumerate() {
            *value = (0..HASH_SAMPLE)
                .map(|x| sample.get_pixel(x as u32, y as u32).0[0] as f64 * cosines[u][x])
                .sum();
        }
    }

    let mut coefficients = [[0.0f64; HASH_BLOCK]; HASH_BLOCK];
    for u in 0..HASH_BLOCK {
        for v in 0..HASH_BLOCK {
            let sum: f64 = (0..HASH_SAMPLE).map(|y| rows[u][y] * cosines[v][y]).sum();
            coefficients[u][v] = scale(u) * scale(v) * sum / 4.0;
        }
    }

    // The DC term is skipped when averaging, it dwarfs everything else.
    let total: f64 = coefficients.iter().flatten().sum::<f64>() - coefficients[0][0];
    let mean = total / (HASH_BLOCK * HASH_BLOCK) as f64;

    coefficients
        .iter()
        .flatten()
        .enumerate()
        .fold(0u64, |hash, (bit, &c)| {
            if c > mean {
                hash | (1u64 << bit)
            } else {
                hash
            }
        })
}

/// Normalised Hamming distance between the perceptual hashes of `a` and `b`.
pub fn perceptual_distance(a: &DynamicImage, b: &DynamicImage) -> Result<f64> {
    ensure_pixels(a)?;
    ensure_pixels(b)?;
    Ok(hash_distance(perceptual_hash(a), perceptual_hash(b)))
}

/// Normalised Hamming distance between two perceptual hashes.
pub fn hash_distance(a: u64, b: u64) -> f64 {
    (a ^ b).count_ones() as f64 / 64.0
}

/// Fraction of pixels that differ between `a` and `b`.
///
/// If the sizes differ, `b` is resized to the size of `a` first.
pub fn pixel_difference(a: &DynamicImage, b: &DynamicImage) -> Result<f64> {
    ensure_pixels(a)?;
    ensure_pixels(b)?;

    let (width, height) = a.dimensions();
    let left = a.to_rgba8();
    let right: RgbaImage = if b.dimensions() == (width, height) {
        b.to_rgba8()
    } else {
        b.resize_exact(width, height, FilterType::Triangle).to_rgba8()
    };

    let max_delta = MAX_YIQ_DELTA * PIXEL_THRESHOLD * PIXEL_THRESHOLD;
    let differing = left
        .pixels()
        .zip(right.pixels())
        .filter(|(p, q)| p != q && yiq_delta(p.0, q.0) > max_delta)
        .count();

    Ok(differing as f64 / (width as f64 * height as f64))
}

fn ensure_pixels(image: &DynamicImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(SplitError::raster("cannot compare an image without pixels"));
    }
    Ok(())
}

fn dct_cosines() -> [[f64; HASH_SAMPLE]; HASH_BLOCK] {
    let mut table = [[0.0f64; HASH_SAMPLE]; HASH_BLOCK];
    let n = HASH_SAMPLE as f64;
    for (u, row) in table.iter_mut().enumerate() {
        for (x, value) in row.iter_mut().enumerate() {
            *value = (((2 * x + 1) as f64 * u as f64 * PI) / (2.0 * n)).cos();
        }
    }
    table
}

fn scale(frequency: usize) -> f64 {
    if frequency == 0 {
        std::f64::consts::FRAC_1_SQRT_2
    } else {
        1.0
    }
}

fn blend(channel: u8, alpha: f64) -> f64 {
    255.0 + (channel as f64 - 255.0) * alpha
}

fn yiq_delta(p: [u8; 4], q: [u8; 4]) -> f64 {
    let (pa, qa) = (p[3] as f64 / 255.0, q[3] as f64 / 255.0);
    let (r1, g1, b1) = (blend(p[0], pa), blend(p[1], pa), blend(p[2], pa));
    let (r2, g2, b2) = (blend(q[0], qa), blend(q[1], qa), blend(q[2], qa));

    let y = luma(r1, g1, b1) - luma(r2, g2, b2);
    let i = in_phase(r1, g1, b1) - in_phase(r2, g2, b2);
    let q = quadrature(r1, g1, b1) - quadrature(r2, g2, b2);

    0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q
}

fn luma(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn in_phase(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn quadrature(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}
