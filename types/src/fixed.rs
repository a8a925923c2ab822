//! Fixed-point fractions and widened integer arithmetic.
//!
//! Fractions are `u128` mantissas over a fixed base of 10^24. Products of two
//! `u128` values are formed in 256 bits so that `a * b / c` never wraps; a
//! quotient that does not fit back into `u128` is reported as an overflow.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

mod wide {
    #![allow(clippy::assign_op_pattern, clippy::manual_div_ceil)]
    uint::construct_uint! {
        pub(crate) struct U256(4);
    }
}

use wide::U256;

/// Fixed-point representation of 1.
pub const FIXED1: u128 = 1_000_000_000_000_000_000_000_000;

const FRACTION_DIGITS: usize = 24;

fn narrow(value: U256) -> Result<u128, TypesError> {
    if value > U256::from(u128::MAX) {
        return Err(TypesError::Overflow);
    }
    Ok(value.low_u128())
}

/// `floor(a * b / c)` without intermediate overflow.
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Result<u128, TypesError> {
    if c == 0 {
        return Err(TypesError::DivisionByZero);
    }
    narrow(U256::from(a) * U256::from(b) / U256::from(c))
}

/// `ceil(a * b / c)` without intermediate overflow.
pub fn mul_div_ceil(a: u128, b: u128, c: u128) -> Result<u128, TypesError> {
    if c == 0 {
        return Err(TypesError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    let divisor = U256::from(c);
    let mut quotient = product / divisor;
    if !(product % divisor).is_zero() {
        quotient = quotient + U256::one();
    }
    narrow(quotient)
}

/// Compare `a_num / a_den` against `b_num / b_den` exactly.
///
/// Denominators must be non-zero.
pub fn cmp_ratios(a_num: u128, a_den: u128, b_num: u128, b_den: u128) -> Ordering {
    let lhs = U256::from(a_num) * U256::from(b_den);
    let rhs = U256::from(b_num) * U256::from(a_den);
    lhs.cmp(&rhs)
}

/// A non-negative fixed-point fraction with 24 decimal digits of precision.
///
/// Serialized as a decimal string (`"0.01"`) so that config files can carry
/// values beyond the range of TOML integers.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fraction(u128);

impl Fraction {
    pub const ZERO: Self = Self(0);

    pub fn fixed1() -> Self {
        Self(FIXED1)
    }

    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    /// `numerator / denominator`, floored to the fixed precision.
    pub fn from_ratio(numerator: u128, denominator: u128) -> Result<Self, TypesError> {
        mul_div_floor(numerator, FIXED1, denominator).map(Self)
    }

    /// Whether the fraction is strictly less than 1.
    pub fn is_below_one(&self) -> bool {
        self.0 < FIXED1
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `ceil(self * value)`: the smallest integer not below the exact product.
    pub fn mul_ceil(&self, value: u128) -> Result<u128, TypesError> {
        mul_div_ceil(value, self.0, FIXED1)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / FIXED1;
        let frac = self.0 % FIXED1;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:0width$}", width = FRACTION_DIGITS);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fraction({self})")
    }
}

impl FromStr for Fraction {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) {
            return Err(TypesError::InvalidFraction(s.to_string()));
        }
        if frac.len() > FRACTION_DIGITS {
            return Err(TypesError::InvalidFraction(format!(
                "{s}: more than {FRACTION_DIGITS} fractional digits"
            )));
        }
        let whole: u128 = whole
            .parse()
            .map_err(|_| TypesError::InvalidFraction(s.to_string()))?;
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<width$}", width = FRACTION_DIGITS);
            padded
                .parse()
                .map_err(|_| TypesError::InvalidFraction(s.to_string()))?
        };
        whole
            .checked_mul(FIXED1)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or(TypesError::Overflow)
    }
}

impl TryFrom<String> for Fraction {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Fraction> for String {
    fn from(f: Fraction) -> Self {
        f.to_string()
    }
}
