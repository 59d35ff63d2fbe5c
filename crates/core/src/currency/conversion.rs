//! Currency conversion over the rate store.
//!
//! Conversion is integer arithmetic end to end:
//! 1. Scale the rate to `rate_precision` decimal places (half to even)
//! 2. `subunits * scaled_rate * 10^target_dp`
//! 3. Divide by `10^(rate_precision + source_dp)`, rounding half to even
//!
//! Mixed-currency arithmetic converts the second operand into the first
//! operand's currency before delegating to [`Money`].

use std::cmp::Ordering;
use std::sync::Arc;

use num_bigint::BigInt;
use rust_decimal::Decimal;
use subunit_shared::types::decimal::DecimalLiteral;
use subunit_shared::types::rounding::pow10;
use subunit_shared::types::{CurrencyLookup, IntoCurrencyCode, Money, rounded_divide};
use subunit_shared::{MoneyError, MoneyResult};

use super::exchange::ExchangeRateStore;

/// Decimal places a rate keeps before integer conversion.
pub const DEFAULT_RATE_PRECISION: u32 = 15;

/// Decimal places of [`CurrencyConverter::percentage_of`] results.
pub const PERCENT_SCALE: u32 = 10;

/// Converts and combines amounts across currencies.
#[derive(Clone)]
pub struct CurrencyConverter {
    rates: Arc<ExchangeRateStore>,
    currencies: Arc<dyn CurrencyLookup>,
    rate_precision: u32,
}

impl std::fmt::Debug for CurrencyConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyConverter")
            .field("rates", &self.rates.len())
            .field("rate_precision", &self.rate_precision)
            .finish_non_exhaustive()
    }
}

impl CurrencyConverter {
    /// Creates a converter with the default rate precision.
    pub fn new(rates: Arc<ExchangeRateStore>, currencies: Arc<dyn CurrencyLookup>) -> Self {
        Self {
            rates,
            currencies,
            rate_precision: DEFAULT_RATE_PRECISION,
        }
    }

    /// Overrides the number of decimal places a rate keeps.
    #[must_use]
    pub fn with_rate_precision(mut self, rate_precision: u32) -> Self {
        self.rate_precision = rate_precision;
        self
    }

    /// The rate store this converter reads from.
    #[must_use]
    pub fn rates(&self) -> &ExchangeRateStore {
        &self.rates
    }

    /// The currency table used to resolve target currencies.
    #[must_use]
    pub fn currencies(&self) -> &dyn CurrencyLookup {
        self.currencies.as_ref()
    }

    /// Decimal places a rate keeps before integer conversion.
    #[must_use]
    pub fn rate_precision(&self) -> u32 {
        self.rate_precision
    }

    /// Converts `value` into `target`.
    ///
    /// Same-currency conversion returns the value unchanged without a
    /// lookup. Rates beyond `rate_precision` decimal places are rounded half
    /// to even before use.
    ///
    /// # Errors
    ///
    /// - `UnknownCurrency` if `target` is not registered
    /// - `NoExchangeRate` if no rate `value.currency -> target` is stored
    pub fn convert(&self, value: &Money, target: impl IntoCurrencyCode) -> MoneyResult<Money> {
        let target = target.into_currency_code()?;
        if value.currency() == &target {
            return Ok(value.clone());
        }
        let target = self.currencies.require(&target)?;

        let rate = self
            .rates
            .get_rate(value.currency(), &target.code)
            .ok_or_else(|| MoneyError::NoExchangeRate {
                from: value.currency().to_string(),
                to: target.code.to_string(),
            })?;

        let scaled_rate = DecimalLiteral::from(rate.rate).scaled_to(self.rate_precision);
        let numerator = value.subunits() * scaled_rate * pow10(target.decimal_places);
        let denominator = pow10(self.rate_precision + value.decimal_places());
        let subunits = rounded_divide(&numerator, &denominator);

        let converted = Money::from_subunits(subunits, target.code, self.currencies.as_ref())?;
        tracing::debug!(
            from = %value.currency(),
            to = %converted.currency(),
            rate = %rate.rate,
            amount = %value.amount(),
            result = %converted.amount(),
            "Converted amount"
        );
        Ok(converted)
    }

    /// Adds `b` to `a`, converting `b` into `a`'s currency first.
    pub fn add(&self, a: &Money, b: &Money) -> MoneyResult<Money> {
        a.add(&self.convert(b, a.currency())?)
    }

    /// Subtracts `b` from `a`, converting `b` into `a`'s currency first.
    pub fn subtract(&self, a: &Money, b: &Money) -> MoneyResult<Money> {
        a.subtract(&self.convert(b, a.currency())?)
    }

    /// Converts every value into `target` and sums the results.
    ///
    /// Each value is rounded on conversion, so the total can differ from
    /// converting an unrounded sum.
    pub fn sum<'a>(
        &self,
        values: impl IntoIterator<Item = &'a Money>,
        target: impl IntoCurrencyCode,
    ) -> MoneyResult<Money> {
        let target = target.into_currency_code()?;
        values.into_iter().try_fold(
            Money::zero(&target, self.currencies.as_ref())?,
            |total, value| total.add(&self.convert(value, &target)?),
        )
    }

    /// Returns `part / whole * 100`, rounded half to even to
    /// [`PERCENT_SCALE`] decimal places.
    ///
    /// `part` is converted into `whole`'s currency first.
    ///
    /// # Errors
    ///
    /// - `DivisionByZero` if `whole` is zero
    /// - `Overflow` if the percentage does not fit a `Decimal`
    pub fn percentage_of(&self, part: &Money, whole: &Money) -> MoneyResult<Decimal> {
        let part = self.convert(part, whole.currency())?;
        if whole.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }

        let numerator = part.subunits() * BigInt::from(100) * pow10(PERCENT_SCALE);
        let scaled = rounded_divide(&numerator, whole.subunits());
        let overflow = || MoneyError::Overflow(format!("percentage {scaled} exceeds Decimal range"));

        let mantissa = i128::try_from(&scaled).map_err(|_| overflow())?;
        Decimal::try_from_i128_with_scale(mantissa, PERCENT_SCALE).map_err(|_| overflow())
    }

    /// Orders `a` against `b` after converting `b` into `a`'s currency.
    pub fn compare(&self, a: &Money, b: &Money) -> MoneyResult<Ordering> {
        a.compare(&self.convert(b, a.currency())?)
    }
}
