use std::ops::Range;

/// The clamped half-open range of reference indices aggregated around a
/// candidate: `[center - L/2, center + (L+1)/2)` intersected with
/// `[0, count)`.
///
/// Windows near the ends of the reference sequence are shorter; they never
/// wrap or pad. `center` must be a valid reference index.
pub fn sequence_window(center: usize, count: usize, length: usize) -> Range<usize> {
    let length = length.max(1);
    let start = center.saturating_sub(length / 2);
    let end = (center + (length + 1) / 2).min(count);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_window_is_centered() {
        assert_eq!(sequence_window(10, 100, 5), 8..13);
        assert_eq!(sequence_window(10, 100, 4), 8..12);
        assert_eq!(sequence_window(10, 100, 1), 10..11);
    }

    #[test]
    fn clamps_asymmetrically_at_the_boundaries() {
        assert_eq!(sequence_window(0, 100, 5), 0..3);
        assert_eq!(sequence_window(1, 100, 5), 0..4);
        assert_eq!(sequence_window(99, 100, 5), 97..100);
    }

    #[test]
    fn always_contains_the_center_and_fits_the_dataset() {
        for count in 1..12 {
            for length in 1..8 {
                for center in 0..count {
                    let w = sequence_window(center, count, length);
                    assert!(w.contains(&center));
                    assert!(w.end <= count);
                    assert!(w.len() <= length);
                    assert!(!w.is_empty());
                }
            }
        }
    }
}
