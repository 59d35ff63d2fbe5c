//! Exact decimal literals.
//!
//! Amounts, factors and proportions enter the engine as decimal text. Floats
//! are first rendered to their shortest round-trip string (Rust's `Display`
//! for floats guarantees this), so `0.1_f64` is read as exactly `1 × 10^-1`
//! and never as `0.1000000000000000055511151231257827`.
//!
//! Grammar: optional `-`, one or more ASCII digits, optionally `.` followed
//! by one or more ASCII digits.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rust_decimal::Decimal;

use super::rounding::{pow10, rounded_divide};
use crate::error::{MoneyError, MoneyResult};

/// An exact decimal number: `mantissa × 10^-scale`.
///
/// `scale` is the number of fractional digits as written, so `"1.50"` keeps
/// scale 2.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecimalLiteral {
    mantissa: BigInt,
    scale: u32,
}

impl DecimalLiteral {
    /// Creates a literal from its parts.
    #[must_use]
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            mantissa: mantissa.into(),
            scale,
        }
    }

    /// Parses decimal text.
    pub fn parse(input: &str) -> MoneyResult<Self> {
        let invalid = || MoneyError::InvalidAmount(input.to_string());

        let (negative, body) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || (body.contains('.') && !all_digits(fraction)) {
            return Err(invalid());
        }

        let scale = u32::try_from(fraction.len()).map_err(|_| invalid())?;
        let digits = format!("{whole}{fraction}");
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;

        Ok(Self {
            mantissa: if negative { -magnitude } else { magnitude },
            scale,
        })
    }

    /// Integer digits of the literal (sign included).
    #[must_use]
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    /// Number of fractional digits as written.
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Returns true if the value is zero (including `-0.00`).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// Returns true if the value is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// Returns `self × 10^places` as an integer, rounding half to even when
    /// the literal has more than `places` fractional digits.
    #[must_use]
    pub fn scaled_to(&self, places: u32) -> BigInt {
        if self.scale <= places {
            &self.mantissa * pow10(places - self.scale)
        } else {
            rounded_divide(&self.mantissa, &pow10(self.scale - places))
        }
    }

    /// Converts to a `rust_decimal::Decimal`, or `None` if the mantissa
    /// exceeds 96 bits or the scale exceeds 28.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let mantissa = i128::try_from(&self.mantissa).ok()?;
        Decimal::try_from_i128_with_scale(mantissa, self.scale).ok()
    }
}

impl FromStr for DecimalLiteral {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DecimalLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_scaled(&self.mantissa, self.scale))
    }
}

impl From<Decimal> for DecimalLiteral {
    fn from(value: Decimal) -> Self {
        Self::new(value.mantissa(), value.scale())
    }
}

/// Renders `value × 10^-scale` as fixed-point text.
///
/// The fraction is left-padded to exactly `scale` digits; no `.` is written
/// when `scale` is zero; negatives carry a single leading `-` and zero is
/// never signed.
#[must_use]
pub fn format_scaled(value: &BigInt, scale: u32) -> String {
    let digits = value.abs().to_string();
    let sign = if value.is_negative() { "-" } else { "" };
    if scale == 0 {
        return format!("{sign}{digits}");
    }

    let width = scale as usize + 1;
    let padded = format!("{digits:0>width$}");
    let (whole, fraction) = padded.split_at(padded.len() - scale as usize);
    format!("{sign}{whole}.{fraction}")
}

/// Conversion of numeric input into an exact decimal literal.
///
/// Implemented for decimal text, primitive integers, floats, and
/// `rust_decimal::Decimal`.
pub trait IntoDecimal {
    /// Converts `self` into an exact decimal literal.
    fn into_decimal(self) -> MoneyResult<DecimalLiteral>;
}

impl IntoDecimal for DecimalLiteral {
    fn into_decimal(self) -> MoneyResult<DecimalLiteral> {
        Ok(self)
    }
}

impl IntoDecimal for &DecimalLiteral {
    fn into_decimal(self) -> MoneyResult<DecimalLiteral> {
        Ok(self.clone())
    }
}

impl IntoDecimal for &str {
    fn into_decimal(self) -> MoneyResult<DecimalLiteral> {
        DecimalLiteral::parse(self)
    }
}

impl IntoDecimal for &String {
    fn into_decimal(self) -> MoneyResult<DecimalLiteral> {
        DecimalLiteral::parse(self)
    }
}

impl IntoDecimal for String {
    fn into_decimal(self) -> MoneyResult<DecimalLiteral> {
        DecimalLiteral::parse(&self)
    }
}

// Numbers are read through their shortest exact form, so trailing zeros
// carried in a `Decimal`'s scale are dropped.
impl IntoDecimal for Decimal {
    fn into_decimal(self) -> MoneyResult<DecimalLiteral> {
        Ok(DecimalLiteral::from(self.normalize()))
    }
}

impl IntoDecimal for &Decimal {
    fn into_decimal(self) -> MoneyResult<DecimalLiteral> {
        (*self).into_decimal()
    }
}

macro_rules! impl_into_decimal_for_int {
    ($($t:ty),*) => {
        $(
            impl IntoDecimal for $t {
                fn into_decimal(self) -> MoneyResult<DecimalLiteral> {
                    Ok(DecimalLiteral::new(self, 0))
                }
            }
        )*
    };
}

impl_into_decimal_for_int!(i32, i64, i128, u32, u64, u128);

macro_rules! impl_into_decimal_for_float {
    ($($t:ty),*) => {
        $(
            impl IntoDecimal for $t {
                fn into_decimal(self) -> MoneyResult<DecimalLiteral> {
                    if !self.is_finite() {
                        return Err(MoneyError::InvalidAmount(self.to_string()));
                    }
                    // Display yields the shortest string that round-trips.
                    DecimalLiteral::parse(&self.to_string())
                }
            }
        )*
    };
}

impl_into_decimal_for_float!(f32, f64);
