use super::*;
use image::{Rgb, RgbImage};
use proptest::prelude::*;

fn solid(width: u32, height: u32, pixel: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(width, height, |_, _| Rgb(pixel))
}

#[test]
fn identical_images_hash_to_zero_distance() {
    let a = solid(64, 64, [200, 100, 50]);
    let b = solid(64, 64, [200, 100, 50]);
    assert_eq!(compute(&a).hamming_distance(compute(&b)), 0);
}

#[test]
fn very_different_images_hash_far_apart() {
    let checkerboard = RgbImage::from_fn(64, 64, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    let solid_gray = solid(64, 64, [128, 128, 128]);
    assert!(compute(&checkerboard).hamming_distance(compute(&solid_gray)) > 8);
}

proptest! {
    #[test]
    fn hamming_distance_is_symmetric(a in any::<u64>(), b in any::<u64>()) {
        let ha = PHash(a);
        let hb = PHash(b);
        prop_assert_eq!(ha.hamming_distance(hb), hb.hamming_distance(ha));
    }

    #[test]
    fn hamming_distance_to_self_is_zero(a in any::<u64>()) {
        let ha = PHash(a);
        prop_assert_eq!(ha.hamming_distance(ha), 0);
    }
}
