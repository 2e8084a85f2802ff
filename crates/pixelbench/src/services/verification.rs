use tracing::warn;

use crate::types::{ImageBuffer, Verification};

/// Default per-channel tolerance between the two implementations
pub const DEFAULT_TOLERANCE: u8 = 1;

/// Channel-wise comparison that stops at the first byte outside `tolerance`
pub fn compare_buffers(a: &ImageBuffer, b: &ImageBuffer, tolerance: u8) -> Verification {
    let left = a.pixels();
    let right = b.pixels();
    if left.len() != right.len() {
        warn!(
            "Output length mismatch: {} vs {} bytes",
            left.len(),
            right.len()
        );
        return Verification::LengthMismatch {
            left: left.len(),
            right: right.len(),
        };
    }

    let mismatch = left
        .iter()
        .zip(right)
        .position(|(&x, &y)| x.abs_diff(y) > tolerance);

    match mismatch {
        None => Verification::Match,
        Some(index) => {
            warn!(
                "Output mismatch at byte {}: {} vs {} (tolerance {})",
                index, left[index], right[index], tolerance
            );
            Verification::ValueMismatch {
                index,
                left: left[index],
                right: right[index],
            }
        }
    }
}

/// `true` when every byte pair differs by at most `tolerance`
pub fn verify(a: &ImageBuffer, b: &ImageBuffer, tolerance: u8) -> bool {
    compare_buffers(a, b, tolerance).is_match()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_within_tolerance() {
        let a = ImageBuffer::solid(2, 2, [100, 100, 100, 255]);
        let b = ImageBuffer::solid(2, 2, [101, 99, 100, 255]);
        assert!(verify(&a, &b, 1));
        assert!(!verify(&a, &b, 0));
    }

    #[test]
    fn test_reports_first_violation() {
        let a = ImageBuffer::new(2, 1, vec![0, 0, 0, 0, 10, 0, 50, 0]).unwrap();
        let b = ImageBuffer::new(2, 1, vec![0, 0, 0, 0, 20, 0, 90, 0]).unwrap();
        assert_eq!(
            compare_buffers(&a, &b, 1),
            Verification::ValueMismatch {
                index: 4,
                left: 10,
                right: 20
            }
        );
    }

    #[test]
    fn test_length_mismatch() {
        let a = ImageBuffer::solid(2, 2, [0, 0, 0, 0]);
        let b = ImageBuffer::solid(2, 3, [0, 0, 0, 0]);
        assert_eq!(
            compare_buffers(&a, &b, 255),
            Verification::LengthMismatch { left: 16, right: 24 }
        );
    }

    proptest! {
        #[test]
        fn prop_reflexive(bytes in prop::collection::vec(any::<u8>(), 0..64usize)) {
            let len = bytes.len() / 4 * 4;
            let buf = ImageBuffer::new((len / 4) as u32, 1, bytes[..len].to_vec()).unwrap();
            let copy = buf.clone();
            prop_assert!(verify(&buf, &copy, 1));
            prop_assert!(verify(&buf, &copy, 0));
        }

        #[test]
        fn prop_length_mismatch_never_verifies(
            w1 in 1u32..16,
            w2 in 1u32..16,
            tolerance in any::<u8>(),
        ) {
            prop_assume!(w1 != w2);
            let a = ImageBuffer::blank(w1, 1);
            let b = ImageBuffer::blank(w2, 1);
            prop_assert!(!verify(&a, &b, tolerance));
        }
    }
}
