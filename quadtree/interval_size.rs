//! Zero-width test for intervals, relative to their magnitude.

use super::double_bits::DoubleBits;

/// Intervals whose width, relative to the largest endpoint magnitude, has a binary exponent
/// at or below this value are treated as zero width.
pub const MIN_BINARY_EXPONENT: i32 = -50;

/// Whether `[min, max]` is too narrow to be split into quadrants safely.
///
/// Exactly zero width always qualifies. Far from the origin an interval can be non-zero
/// yet narrower than the spacing between representable doubles at successive quadrant
/// levels, which would make top-down node creation descend without end.
pub fn is_zero_width(min: f64, max: f64) -> bool {
    let width = max - min;
    if width == 0.0 {
        return true;
    }

    let max_abs = min.abs().max(max.abs());
    let scaled_interval = width / max_abs;
    DoubleBits::exponent_of(scaled_interval) <= MIN_BINARY_EXPONENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_zero_width() {
        assert!(is_zero_width(3.0, 3.0));
        assert!(is_zero_width(0.0, 0.0));
    }

    #[test]
    fn test_regular_width() {
        assert!(!is_zero_width(0.0, 1.0));
        assert!(!is_zero_width(-1.0, 1.0));
        assert!(!is_zero_width(1e9, 1e9 + 1.0));
    }

    #[test]
    fn test_relative_zero_width() {
        let base = 1e6;
        let tiny = base * 2f64.powi(-51);
        assert!(is_zero_width(base, base + tiny));
        assert!(!is_zero_width(base, base + base * 2f64.powi(-40)));
    }
}
