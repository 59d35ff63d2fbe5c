//! Property-based tests for money operations.
//!
//! - Property 1: Allocation conserves the total
//! - Property 2: Subunit and text round-trips
//! - Property 3: Round-half-to-even correctness
//! - Property 4: Arithmetic identities
//! - Property 5: Total order within a currency
//! - Property 6: Currency mismatch guard

use num_bigint::BigInt;
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use super::currency::CurrencyRegistry;
use super::money::Money;
use super::rounding::rounded_divide;

const CURRENCIES: &[&str] = &["USD", "JPY", "BTC", "ETH", "XNO"];

fn registry() -> CurrencyRegistry {
    CurrencyRegistry::with_defaults()
}

/// Strategy to generate a registered currency code.
fn currency() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CURRENCIES)
}

/// Strategy to generate signed subunit counts.
fn subunits() -> impl Strategy<Value = i64> {
    -1_000_000_000_000i64..1_000_000_000_000i64
}

/// Strategy to generate allocation weights with a positive total.
fn proportions() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..1000, 1..20)
        .prop_filter("total must be positive", |weights| weights.iter().any(|w| *w > 0))
}

/// Strategy to generate an exact decimal factor (mantissa, scale).
fn factor() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64, 0u32..=8).prop_map(|(m, s)| Decimal::new(m, s))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // Property 1: Allocation conserves the total
    // =========================================================================

    /// *For any* amount and valid weights, the parts SHALL sum exactly to the
    /// original amount, one part per weight.
    #[test]
    fn prop_allocate_sum_invariant(
        currency in currency(),
        subunits in subunits(),
        weights in proportions(),
    ) {
        let total = Money::from_subunits(subunits, currency, &registry()).unwrap();
        let parts = total.allocate(&weights).unwrap();

        prop_assert_eq!(parts.len(), weights.len());
        let sum: BigInt = parts.iter().map(Money::to_subunits).sum();
        prop_assert_eq!(sum, total.to_subunits());
    }

    /// *For any* non-negative amount, no part SHALL be negative and no two
    /// equal weights SHALL differ by more than one subunit.
    #[test]
    fn prop_allocate_is_fair(
        subunits in 0i64..1_000_000_000,
        count in 1usize..50,
    ) {
        let total = Money::from_subunits(subunits, "USD", &registry()).unwrap();
        let parts = total.allocate_equal(count).unwrap();

        let min = parts.iter().map(Money::to_subunits).min().unwrap();
        let max = parts.iter().map(Money::to_subunits).max().unwrap();
        prop_assert!(min >= BigInt::from(0));
        prop_assert!(max - min <= BigInt::from(1));
    }

    // =========================================================================
    // Property 2: Round-trips
    // =========================================================================

    /// *For any* subunit count, formatting then parsing SHALL return the same
    /// subunits, and exporting subunits SHALL rebuild an equal value.
    #[test]
    fn prop_subunit_round_trip(currency in currency(), subunits in subunits()) {
        let registry = registry();
        let value = Money::from_subunits(subunits, currency, &registry).unwrap();

        let reparsed = Money::parse(currency, value.amount().as_str(), &registry).unwrap();
        prop_assert_eq!(&reparsed, &value);

        let rebuilt = Money::from_subunits(reparsed.to_subunits(), currency, &registry).unwrap();
        prop_assert_eq!(rebuilt.amount(), value.amount());
    }

    /// *For any* well-formed input within the currency's precision,
    /// `format(parse(s))` SHALL equal `s` zero-padded to the decimal places.
    #[test]
    fn prop_parse_format_normalizes(
        negative in any::<bool>(),
        whole in 0u64..1_000_000_000,
        fraction in prop::collection::vec(0u8..10, 0..=8),
    ) {
        let fraction: String = fraction.iter().map(|d| char::from(b'0' + d)).collect();
        let sign = if negative { "-" } else { "" };
        let input = if fraction.is_empty() {
            format!("{sign}{whole}")
        } else {
            format!("{sign}{whole}.{fraction}")
        };

        let value = Money::parse("BTC", input.as_str(), &registry()).unwrap();

        let padded = format!("{fraction:0<8}");
        let is_zero = whole == 0 && padded.bytes().all(|b| b == b'0');
        let expected_sign = if negative && !is_zero { "-" } else { "" };
        prop_assert_eq!(value.amount(), format!("{expected_sign}{whole}.{padded}"));
    }

    // =========================================================================
    // Property 3: Round-half-to-even correctness
    // =========================================================================

    /// *For any* amount and factor, `multiply` SHALL agree with rust_decimal's
    /// `MidpointNearestEven` rounding of the exact product.
    #[test]
    fn prop_multiply_matches_bankers_rounding(
        subunits in -1_000_000_000i64..1_000_000_000,
        factor in factor(),
    ) {
        let value = Money::from_subunits(subunits, "USD", &registry()).unwrap();
        let product = value.multiply(factor).unwrap();

        let exact = Decimal::new(subunits, 2) * factor;
        let expected = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        prop_assert_eq!(product.to_decimal().unwrap(), expected);
    }

    /// *For any* numerator and positive denominator, the result SHALL be
    /// within half a unit of the exact quotient and symmetric under negation.
    #[test]
    fn prop_rounded_divide_bounds(n in any::<i64>(), d in 1i64..1_000_000) {
        let numerator = BigInt::from(n);
        let denominator = BigInt::from(d);
        let q = rounded_divide(&numerator, &denominator);

        let error = (&q * &denominator - &numerator) * BigInt::from(2);
        prop_assert!(error.magnitude() <= denominator.magnitude());
        prop_assert_eq!(rounded_divide(&-&numerator, &denominator), -q);
    }

    // =========================================================================
    // Property 4: Arithmetic identities
    // =========================================================================

    /// *For any* values a, b: a*1 = a, a*0 = 0, a+0 = a, (a-b)+b = a.
    #[test]
    fn prop_identities(currency in currency(), a in subunits(), b in subunits()) {
        let registry = registry();
        let a = Money::from_subunits(a, currency, &registry).unwrap();
        let b = Money::from_subunits(b, currency, &registry).unwrap();
        let zero = Money::zero(currency, &registry).unwrap();

        prop_assert!(a.multiply(1).unwrap().equals(&a).unwrap());
        prop_assert!(a.multiply(0).unwrap().is_zero());
        prop_assert!(a.add(&zero).unwrap().equals(&a).unwrap());
        prop_assert!(a.subtract(&b).unwrap().add(&b).unwrap().equals(&a).unwrap());
    }

    // =========================================================================
    // Property 5: Total order
    // =========================================================================

    /// *For any* three same-currency values, comparison SHALL be reflexive,
    /// antisymmetric and transitive.
    #[test]
    fn prop_total_order(a in subunits(), b in subunits(), c in subunits()) {
        let registry = registry();
        let a = Money::from_subunits(a, "USD", &registry).unwrap();
        let b = Money::from_subunits(b, "USD", &registry).unwrap();
        let c = Money::from_subunits(c, "USD", &registry).unwrap();

        prop_assert!(a.less_than_or_equal(&a).unwrap());
        if a.less_than_or_equal(&b).unwrap() && b.less_than_or_equal(&a).unwrap() {
            prop_assert!(a.equals(&b).unwrap());
        }
        if a.less_than_or_equal(&b).unwrap() && b.less_than_or_equal(&c).unwrap() {
            prop_assert!(a.less_than_or_equal(&c).unwrap());
        }
        prop_assert_eq!(a.greater_than(&b).unwrap(), b.less_than(&a).unwrap());
    }

    // =========================================================================
    // Property 6: Currency mismatch guard
    // =========================================================================

    /// *For any* two values in different currencies, add, subtract and
    /// equals SHALL fail with a currency mismatch.
    #[test]
    fn prop_currency_mismatch(a in subunits(), b in subunits()) {
        let registry = registry();
        let usd = Money::from_subunits(a, "USD", &registry).unwrap();
        let eur = Money::from_subunits(b, "EUR", &registry).unwrap();

        prop_assert_eq!(usd.add(&eur).unwrap_err().error_code(), "CURRENCY_MISMATCH");
        prop_assert_eq!(usd.subtract(&eur).unwrap_err().error_code(), "CURRENCY_MISMATCH");
        prop_assert_eq!(usd.equals(&eur).unwrap_err().error_code(), "CURRENCY_MISMATCH");
    }
}
