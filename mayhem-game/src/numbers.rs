//! Integer helpers centralizing the rounding rule used for tile ratios.

/// Share of `total` at `percent`, rounded half-up on exact integer math.
///
/// Every category and sub-category count goes through this helper so a
/// given total always yields the same breakdown.
#[must_use]
pub const fn percent_of(total: u32, percent: u32) -> u32 {
    let scaled = total as u64 * percent as u64 + 50;
    let share = scaled / 100;
    if share > u32::MAX as u64 {
        u32::MAX
    } else {
        share as u32
    }
}

/// Fraction `part / whole` clamped to `0.0..=1.0`; `0.0` for an empty whole.
#[must_use]
pub fn fraction(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (f64::from(part) / f64::from(whole)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_up() {
        assert_eq!(percent_of(30, 15), 5);
        assert_eq!(percent_of(30, 18), 5);
        assert_eq!(percent_of(25, 10), 3);
        assert_eq!(percent_of(24, 10), 2);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        assert_eq!(percent_of(u32::MAX, 200), u32::MAX);
        assert_eq!(percent_of(0, 40), 0);
    }

    #[test]
    fn fraction_handles_empty_and_overflow() {
        assert!(fraction(3, 0).abs() < f64::EPSILON);
        assert!((fraction(60, 120) - 0.5).abs() < f64::EPSILON);
        assert!((fraction(200, 120) - 1.0).abs() < f64::EPSILON);
    }
}
