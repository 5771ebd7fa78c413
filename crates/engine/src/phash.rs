// SPDX-License-Identifier: MIT

//! Perceptual hashing for screenshot dedup (C5 step 4-5).
//!
//! An 8x8-DCT perceptual hash over a 32x32 luma downscale, matching the
//! shape of Python's `imagehash.phash`: DCT-II the downscaled image, keep
//! the top-left 8x8 low-frequency block, threshold against the block's
//! mean (excluding the DC term), pack into a 64-bit set.

use image::RgbImage;

const DCT_SIZE: usize = 32;
const HASH_SIZE: usize = 8;

/// A 64-bit perceptual hash, one bit per low-frequency DCT coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PHash(pub u64);

impl PHash {
    pub fn hamming_distance(self, other: PHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

pub fn compute(image: &RgbImage) -> PHash {
    let gray = image::imageops::grayscale(image);
    let small = image::imageops::resize(
        &gray,
        DCT_SIZE as u32,
        DCT_SIZE as u32,
        image::imageops::FilterType::Lanczos3,
    );

    let mut matrix = [[0.0f64; DCT_SIZE]; DCT_SIZE];
    for y in 0..DCT_SIZE {
        for x in 0..DCT_SIZE {
            matrix[y][x] = small.get_pixel(x as u32, y as u32).0[0] as f64;
        }
    }

    let transformed = dct_2d(&matrix);

    let mut block = [0.0f64; HASH_SIZE * HASH_SIZE];
    for y in 0..HASH_SIZE {
        for x in 0..HASH_SIZE {
            block[y * HASH_SIZE + x] = transformed[y][x];
        }
    }

    let mean_excl_dc: f64 = block[1..].iter().sum::<f64>() / (block.len() - 1) as f64;

    let mut bits: u64 = 0;
    for (i, &value) in block.iter().enumerate() {
        if value > mean_excl_dc {
            bits |= 1 << i;
        }
    }
    PHash(bits)
}

fn dct_1d(input: &[f64; DCT_SIZE]) -> [f64; DCT_SIZE] {
    let mut output = [0.0f64; DCT_SIZE];
    let n = DCT_SIZE as f64;
    for k in 0..DCT_SIZE {
        let mut sum = 0.0;
        for (i, &x) in input.iter().enumerate() {
            sum += x * (std::f64::consts::PI / n * (i as f64 + 0.5) * k as f64).cos();
        }
        output[k] = sum;
    }
    output
}

/// Separable 2D DCT-II: rows then columns.
fn dct_2d(matrix: &[[f64; DCT_SIZE]; DCT_SIZE]) -> [[f64; DCT_SIZE]; DCT_SIZE] {
    let mut rows_transformed = [[0.0f64; DCT_SIZE]; DCT_SIZE];
    for y in 0..DCT_SIZE {
        rows_transformed[y] = dct_1d(&matrix[y]);
    }

    let mut result = [[0.0f64; DCT_SIZE]; DCT_SIZE];
    for x in 0..DCT_SIZE {
        let mut column = [0.0f64; DCT_SIZE];
        for y in 0..DCT_SIZE {
            column[y] = rows_transformed[y][x];
        }
        let transformed_column = dct_1d(&column);
        for y in 0..DCT_SIZE {
            result[y][x] = transformed_column[y];
        }
    }
    result
}

#[cfg(test)]
#[path = "phash_tests.rs"]
mod tests;
