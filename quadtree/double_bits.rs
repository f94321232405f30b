//! Bit-level decomposition of IEEE-754 doubles.
//!
//! Quad keys are computed from the binary exponent of an extent rather than from
//! `log2`/`floor` arithmetic, so that the level assigned to a rectangle is identical on
//! every platform. Layout of a double:
//!
//! ```text
//!  63 | 62 ........ 52 | 51 ................................ 0
//!  s  | exponent (11)  | mantissa (52)
//! ```

use std::fmt;
use thiserror::Error;

/// Bias of the 11-bit exponent field.
pub const EXPONENT_BIAS: i32 = 1023;

/// Smallest exponent of a normal double.
pub const MIN_EXPONENT: i32 = -1022;

/// Largest exponent of a finite double.
pub const MAX_EXPONENT: i32 = 1023;

const MANTISSA_BITS: u32 = 52;
const MANTISSA_MASK: u64 = (1 << MANTISSA_BITS) - 1;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DoubleBitsError {
    /// `2^exponent` is not representable as a normal double.
    #[error("exponent {exponent} out of range [{}, {}]", MIN_EXPONENT, MAX_EXPONENT)]
    ExponentOutOfRange { exponent: i32 },
}

/// A double together with its raw bit pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleBits {
    value: f64,
    bits: u64,
}

impl DoubleBits {
    pub fn new(value: f64) -> Self {
        DoubleBits {
            value,
            bits: value.to_bits(),
        }
    }

    /// The double currently described by the (possibly modified) bit pattern.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits)
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Raw 11-bit exponent field.
    pub fn biased_exponent(&self) -> i32 {
        ((self.bits >> MANTISSA_BITS) & 0x7ff) as i32
    }

    /// Unbiased exponent. Zero and subnormals report `-1023`.
    pub fn exponent(&self) -> i32 {
        self.biased_exponent() - EXPONENT_BIAS
    }

    /// Clears the lowest `n_bits` bits of the pattern.
    pub fn zero_lower_bits(&mut self, n_bits: u32) {
        if n_bits >= 64 {
            self.bits = 0;
            return;
        }
        let inv_mask = (1u64 << n_bits) - 1;
        self.bits &= !inv_mask;
    }

    /// Bit `i` of the pattern (0 is the least significant mantissa bit).
    pub fn bit(&self, i: u32) -> u8 {
        ((self.bits >> i) & 1) as u8
    }

    /// Number of leading mantissa bits shared with `other`, from bit 51 downwards.
    ///
    /// The implicit leading 1 is not counted. The result is meaningless when the two
    /// exponents differ.
    pub fn num_common_mantissa_bits(&self, other: &DoubleBits) -> u32 {
        let diff = (self.bits ^ other.bits) & MANTISSA_MASK;
        if diff == 0 {
            return MANTISSA_BITS;
        }
        diff.leading_zeros() - (64 - MANTISSA_BITS)
    }

    // ========================================================================
    // Associated helpers
    // ========================================================================

    /// Builds `2^exponent` directly from its bit pattern.
    pub fn power_of_two(exponent: i32) -> Result<f64, DoubleBitsError> {
        if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
            return Err(DoubleBitsError::ExponentOutOfRange { exponent });
        }
        let biased = (exponent + EXPONENT_BIAS) as u64;
        Ok(f64::from_bits(biased << MANTISSA_BITS))
    }

    /// Unbiased exponent of `d`.
    pub fn exponent_of(d: f64) -> i32 {
        DoubleBits::new(d).exponent()
    }

    /// Rounds `d` towards zero to a power of two by dropping the mantissa.
    pub fn truncate_to_power_of_two(d: f64) -> f64 {
        let mut db = DoubleBits::new(d);
        db.zero_lower_bits(MANTISSA_BITS);
        db.value()
    }

    /// Leading mantissa bits shared by `d1` and `d2`.
    ///
    /// Returns 0 when either value is exactly zero or the exponents differ.
    pub fn common_mantissa_bits(d1: f64, d2: f64) -> u32 {
        if d1 == 0.0 || d2 == 0.0 {
            return 0;
        }
        let (db1, db2) = (DoubleBits::new(d1), DoubleBits::new(d2));
        if db1.exponent() != db2.exponent() {
            return 0;
        }
        db1.num_common_mantissa_bits(&db2)
    }

    /// The largest-magnitude prefix shared by `d1` and `d2`: sign, exponent and the common
    /// leading mantissa bits of `d1`, all other bits cleared.
    pub fn maximum_common_mantissa(d1: f64, d2: f64) -> f64 {
        if d1 == 0.0 || d2 == 0.0 {
            return 0.0;
        }
        let mut db1 = DoubleBits::new(d1);
        let db2 = DoubleBits::new(d2);
        if db1.exponent() != db2.exponent() {
            return 0.0;
        }
        let common = db1.num_common_mantissa_bits(&db2);
        db1.zero_lower_bits(MANTISSA_BITS - common);
        db1.value()
    }
}

/// `s  eeeeeeeeeee(exp) mmmm... [ value ]`
impl fmt::Display for DoubleBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit_str = format!("{:064b}", self.bits);
        write!(
            f,
            "{}  {}({}) {} [ {} ]",
            &bit_str[0..1],
            &bit_str[1..12],
            self.exponent(),
            &bit_str[12..],
            self.value
        )
    }
}
