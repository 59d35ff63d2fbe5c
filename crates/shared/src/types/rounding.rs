//! Round-half-to-even integer division.
//!
//! This is the single rounding primitive of the engine. Every operation that
//! can land between two subunits (multiplication, currency conversion,
//! rescaling a rate) goes through [`rounded_divide`].

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Returns `10^exponent`.
#[must_use]
pub fn pow10(exponent: u32) -> BigInt {
    BigInt::from(10u8).pow(exponent)
}

/// Divides `numerator` by `denominator`, rounding half to even.
///
/// - Exact quotients are returned unchanged.
/// - Below the half point the quotient is truncated toward zero.
/// - Above the half point it is rounded away from zero.
/// - Exactly at the half point it goes to whichever neighbour is even.
///
/// A negative denominator is normalized by negating both operands.
///
/// # Panics
///
/// Panics if `denominator` is zero.
///
/// # Example
///
/// ```
/// use num_bigint::BigInt;
/// use subunit_shared::types::rounding::rounded_divide;
///
/// let d = BigInt::from(10);
/// assert_eq!(rounded_divide(&BigInt::from(25), &d), BigInt::from(2));
/// assert_eq!(rounded_divide(&BigInt::from(35), &d), BigInt::from(4));
/// assert_eq!(rounded_divide(&BigInt::from(-35), &d), BigInt::from(-4));
/// ```
#[must_use]
pub fn rounded_divide(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    assert!(!denominator.is_zero(), "rounded_divide: zero denominator");

    if denominator.is_negative() {
        return rounded_divide(&-numerator, &-denominator);
    }
    if denominator.is_one() {
        return numerator.clone();
    }

    // Truncating division: quotient toward zero, remainder has numerator's sign.
    let (quotient, remainder) = numerator.div_rem(denominator);
    if remainder.is_zero() {
        return quotient;
    }

    let away_from_zero = |q: BigInt| {
        if numerator.is_negative() {
            q - BigInt::one()
        } else {
            q + BigInt::one()
        }
    };

    // 2|r| vs d is the half-point test without losing the odd-denominator case.
    let doubled = remainder.abs() * BigInt::from(2u8);
    match doubled.cmp(denominator) {
        Ordering::Greater => away_from_zero(quotient),
        Ordering::Less => quotient,
        Ordering::Equal => {
            if quotient.is_even() {
                quotient
            } else {
                away_from_zero(quotient)
            }
        }
    }
}
