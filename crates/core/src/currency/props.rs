//! Property-based tests for currency conversion.
//!
//! - Property 1: Same-currency conversion is the identity
//! - Property 2: Conversion matches exact banker's rounding
//! - Property 3: Conversion is monotonic
//! - Property 4: Auto-inverse round trips stay within one subunit

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use subunit_shared::types::{CurrencyRegistry, Money};

use super::conversion::CurrencyConverter;
use super::exchange::ExchangeRateStore;

fn registry() -> CurrencyRegistry {
    CurrencyRegistry::with_defaults()
}

fn converter_with(rate: Decimal) -> CurrencyConverter {
    let rates = Arc::new(ExchangeRateStore::new());
    rates.set_rate("USD", "EUR", rate, None).unwrap();
    CurrencyConverter::new(rates, Arc::new(registry()))
}

/// Strategy to generate USD cents (-10,000,000.00 to 10,000,000.00).
fn cents() -> impl Strategy<Value = i64> {
    -1_000_000_000i64..1_000_000_000i64
}

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // Property 1: Same-currency identity
    // =========================================================================

    /// *For any* amount, converting into its own currency SHALL return it
    /// unchanged, even with no rates stored.
    #[test]
    fn prop_same_currency_identity(cents in cents()) {
        let converter = CurrencyConverter::new(
            Arc::new(ExchangeRateStore::new()),
            Arc::new(registry()),
        );
        let value = Money::from_subunits(cents, "USD", &registry()).unwrap();
        prop_assert_eq!(converter.convert(&value, "USD").unwrap(), value);
    }

    // =========================================================================
    // Property 2: Banker's rounding correctness
    // =========================================================================

    /// *For any* amount and rate with at most 4 decimal places, conversion
    /// SHALL equal the exact product rounded half to even.
    #[test]
    fn prop_convert_matches_exact_rounding(cents in cents(), rate in positive_rate()) {
        let converter = converter_with(rate);
        let value = Money::from_subunits(cents, "USD", &registry()).unwrap();
        let converted = converter.convert(&value, "EUR").unwrap();

        let exact = Decimal::new(cents, 2) * rate;
        let expected = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        prop_assert_eq!(converted.to_decimal().unwrap(), expected);
    }

    /// *For any* inputs, conversion SHALL be deterministic.
    #[test]
    fn prop_convert_is_deterministic(cents in cents(), rate in positive_rate()) {
        let converter = converter_with(rate);
        let value = Money::from_subunits(cents, "USD", &registry()).unwrap();
        prop_assert_eq!(
            converter.convert(&value, "EUR").unwrap(),
            converter.convert(&value, "EUR").unwrap()
        );
    }

    // =========================================================================
    // Property 3: Monotonicity
    // =========================================================================

    /// *For any* a <= b, convert(a) SHALL be <= convert(b).
    #[test]
    fn prop_convert_is_monotonic(a in cents(), b in cents(), rate in positive_rate()) {
        let converter = converter_with(rate);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low = Money::from_subunits(low, "USD", &registry()).unwrap();
        let high = Money::from_subunits(high, "USD", &registry()).unwrap();

        let low = converter.convert(&low, "EUR").unwrap();
        let high = converter.convert(&high, "EUR").unwrap();
        prop_assert!(low.less_than_or_equal(&high).unwrap());
    }

    // =========================================================================
    // Property 4: Auto-inverse round trip
    // =========================================================================

    /// *For any* amount and rate <= 1, converting there and back through the
    /// synthesized inverse SHALL land within one subunit of the start.
    #[test]
    fn prop_inverse_round_trip(cents in cents(), rate in 1i64..=10_000i64) {
        let converter = converter_with(Decimal::new(rate, 4));
        let value = Money::from_subunits(cents, "USD", &registry()).unwrap();

        let eur = converter.convert(&value, "EUR").unwrap();
        let back = converter.convert(&eur, "USD").unwrap();
        let drift = (back.to_subunits() - value.to_subunits()).magnitude().clone();
        // Each EUR cent is worth at most 1 / rate USD cents.
        let bound = num_bigint::BigUint::from(u64::try_from(10_000 / rate).unwrap() + 1);
        prop_assert!(drift <= bound, "drift {} exceeds {}", drift, bound);
    }
}
