//! 20 bit fractions for the multisynth `b / c` fields

use crate::{constants::*, errors::*};

/// Common factors of two stripped before truncating
const MAX_HALVINGS: u32 = 24;

/// Numerator / denominator pair that fits the chip's 20 bit fields.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Fraction {
    pub num: u32,
    pub denom: u32,
}

impl Fraction {

    /// Zero, canonical form is `0 / 1`
    pub const ZERO: Fraction = Fraction { num: 0, denom: 1 };

    /// Checked constructor.
    /// Denominator must be non-zero, both values must fit in 20 bits.
    pub fn new(num: u32, denom: u32) -> Result<Self, PlanError> {
        if denom == 0 || num > FRAC_MAX || denom > FRAC_MAX {
            Err(PlanError::FractionOverflow)
        } else if num == 0 {
            Ok(Fraction::ZERO)
        } else {
            Ok(Fraction { num, denom })
        }
    }

    /// Reduce `num / denom` to a fraction with 20 bit wide parts.
    ///
    /// Common factors of two are removed first, that is exact.
    /// If either part is still too wide both are shifted right
    /// until they fit, which loses some precision (well under 1 ppm
    /// of the fraction for denominators that needed shifting).
    pub fn reduce(num: u64, denom: u64) -> Fraction {
        if num == 0 || denom == 0 {
            return Fraction::ZERO;
        }

        let (mut n, mut d) = (num, denom);

        let mut halvings = 0;
        while n & 1 == 0 && d & 1 == 0 && halvings < MAX_HALVINGS {
            n >>= 1;
            d >>= 1;
            halvings += 1;
        }

        let max = FRAC_MAX as u64;
        while n > max || d > max {
            n >>= 1;
            d >>= 1;
        }

        if n == 0 {
            return Fraction::ZERO;
        }
        if d == 0 {
            d = 1;
        }

        // truncation can leave a shared power of two behind
        let shared = (n | d).trailing_zeros();
        Fraction { num: (n >> shared) as u32, denom: (d >> shared) as u32 }
    }

    /// True for `0 / x`
    #[inline]
    pub fn is_zero(self: &Self) -> bool {
        self.num == 0
    }

    /// Approximate value
    #[inline]
    pub fn value(self: &Self) -> f64 {
        self.num as f64 / self.denom as f64
    }
}

impl Default for Fraction {
    fn default() -> Self { Fraction::ZERO }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_numerator_is_canonical() {
        assert_eq!(Fraction::reduce(0, 12345), Fraction { num: 0, denom: 1 });
        assert_eq!(Fraction::reduce(0, 1 << 40), Fraction::ZERO);
    }

    #[test]
    fn strips_common_twos() {
        assert_eq!(Fraction::reduce(8, 24), Fraction { num: 1, denom: 3 });
        assert_eq!(Fraction::reduce(3_000_000, 25_000_000), Fraction { num: 46_875, denom: 390_625 });
    }

    #[test]
    fn halving_is_bounded() {
        // 2^30 / 2^31 has 30 common twos, only 24 are stripped up front
        let f = Fraction::reduce(1 << 30, 1 << 31);
        assert_eq!(f, Fraction { num: 1, denom: 2 });
    }

    #[test]
    fn truncates_wide_values() {
        let f = Fraction::reduce(12_345_679, 25_000_000);
        assert!(f.num <= FRAC_MAX && f.denom <= FRAC_MAX);
        let exact = 12_345_679.0 / 25_000_000.0;
        assert!((f.value() - exact).abs() < 4e-6);
    }

    #[test]
    fn always_fits_20_bits() {
        let samples: [(u64, u64); 8] = [
            (1, 1),
            (999_999, 1_000_000),
            (123_456_789, 160_000_000),
            (7, 27_000_000),
            (26_999_999, 27_000_000),
            (1 << 45, (1 << 45) + 1),
            (u64::MAX >> 1, u64::MAX),
            (5, 3),
        ];
        for &(n, d) in samples.iter() {
            let f = Fraction::reduce(n, d);
            assert!(f.num <= FRAC_MAX, "{}/{} -> {:?}", n, d, f);
            assert!(f.denom <= FRAC_MAX, "{}/{} -> {:?}", n, d, f);
            assert!(f.denom > 0);
        }
    }

    #[test]
    fn reduce_is_idempotent() {
        let samples: [(u64, u64); 6] = [
            (8, 24),
            (12_345_679, 25_000_000),
            (3_000_000, 25_000_000),
            (123_456_789, 160_000_000),
            (0b1011_0000_0000_0000_0000_0000, 0b1110_0000_0000_0000_0000_0001),
            (1 << 30, 1 << 31),
        ];
        for &(n, d) in samples.iter() {
            let once = Fraction::reduce(n, d);
            let twice = Fraction::reduce(once.num as u64, once.denom as u64);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn checked_constructor() {
        assert_eq!(Fraction::new(1, 0), Err(PlanError::FractionOverflow));
        assert_eq!(Fraction::new(FRAC_MAX + 1, 3), Err(PlanError::FractionOverflow));
        assert_eq!(Fraction::new(1, FRAC_MAX + 1), Err(PlanError::FractionOverflow));
        assert_eq!(Fraction::new(0, 77), Ok(Fraction::ZERO));
        assert_eq!(Fraction::new(3, FRAC_MAX), Ok(Fraction { num: 3, denom: FRAC_MAX }));
    }
}
