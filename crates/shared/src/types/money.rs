//! Money type with exact subunit precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are stored as a `BigInt` count of the currency's smallest unit
//! (cents, satoshis, wei). The decimal text is always derived from that
//! count and never stored.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::{CurrencyCode, CurrencyDefinition, CurrencyLookup, IntoCurrencyCode};
use super::decimal::{IntoDecimal, format_scaled};
use super::rounding::{pow10, rounded_divide};
use crate::error::{MoneyError, MoneyResult};

/// Represents a monetary amount with currency.
///
/// Immutable: every operation returns a new value. Equality is structural
/// (same currency, same subunits); ordering is only defined within one
/// currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "MoneyRecord")]
pub struct Money {
    currency: CurrencyCode,
    decimal_places: u32,
    subunits: BigInt,
}

impl Money {
    /// Parses a decimal amount in the given currency.
    ///
    /// The amount may be decimal text or any numeric type implementing
    /// [`IntoDecimal`]. Fractional digits beyond the currency's decimal
    /// places are rejected, never truncated.
    ///
    /// # Example
    ///
    /// ```
    /// use subunit_shared::types::{CurrencyRegistry, Money};
    ///
    /// let registry = CurrencyRegistry::with_defaults();
    /// let price = Money::parse("USD", "19.99", &registry).unwrap();
    /// assert_eq!(price.amount(), "19.99");
    /// assert_eq!(price.to_subunits(), 1999.into());
    /// ```
    pub fn parse<L>(
        currency: impl IntoCurrencyCode,
        amount: impl IntoDecimal,
        lookup: &L,
    ) -> MoneyResult<Self>
    where
        L: CurrencyLookup + ?Sized,
    {
        let definition = lookup.require(&currency.into_currency_code()?)?;
        let literal = amount.into_decimal()?;

        if literal.scale() > definition.decimal_places {
            return Err(MoneyError::PrecisionExceeded {
                currency: definition.code.to_string(),
                decimal_places: definition.decimal_places,
                found: literal.scale(),
            });
        }

        let subunits =
            literal.mantissa() * pow10(definition.decimal_places - literal.scale());
        Ok(Self::from_definition(definition, subunits))
    }

    /// Creates a value from a raw subunit count.
    pub fn from_subunits<L>(
        subunits: impl Into<BigInt>,
        currency: impl IntoCurrencyCode,
        lookup: &L,
    ) -> MoneyResult<Self>
    where
        L: CurrencyLookup + ?Sized,
    {
        let definition = lookup.require(&currency.into_currency_code()?)?;
        Ok(Self::from_definition(definition, subunits.into()))
    }

    /// Creates a zero amount in the specified currency.
    pub fn zero<L>(currency: impl IntoCurrencyCode, lookup: &L) -> MoneyResult<Self>
    where
        L: CurrencyLookup + ?Sized,
    {
        Self::from_subunits(BigInt::zero(), currency, lookup)
    }

    /// Sums same-currency values, starting from zero.
    pub fn sum<'a, L>(
        currency: impl IntoCurrencyCode,
        values: impl IntoIterator<Item = &'a Money>,
        lookup: &L,
    ) -> MoneyResult<Self>
    where
        L: CurrencyLookup + ?Sized,
    {
        values
            .into_iter()
            .try_fold(Self::zero(currency, lookup)?, |total, value| total.add(value))
    }

    fn from_definition(definition: CurrencyDefinition, subunits: BigInt) -> Self {
        Self {
            currency: definition.code,
            decimal_places: definition.decimal_places,
            subunits,
        }
    }

    /// Builds a value in the same currency with a different subunit count.
    pub(crate) fn with_subunits(&self, subunits: BigInt) -> Self {
        Self {
            currency: self.currency.clone(),
            decimal_places: self.decimal_places,
            subunits,
        }
    }

    // ========== Accessors ==========

    /// Currency of this amount.
    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Decimal places of the currency, captured at construction.
    #[must_use]
    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Subunit count, borrowed.
    #[must_use]
    pub fn subunits(&self) -> &BigInt {
        &self.subunits
    }

    /// Subunit count, for storage as a native integer.
    #[must_use]
    pub fn to_subunits(&self) -> BigInt {
        self.subunits.clone()
    }

    /// Fixed-precision decimal text, e.g. `"19.99"`, `"-0.05"`, `"100"`.
    #[must_use]
    pub fn amount(&self) -> String {
        format_scaled(&self.subunits, self.decimal_places)
    }

    /// Decimal view of the amount, or `None` if it does not fit
    /// `rust_decimal::Decimal` (28 digits, scale up to 28).
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let mantissa = i128::try_from(&self.subunits).ok()?;
        Decimal::try_from_i128_with_scale(mantissa, self.decimal_places).ok()
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.subunits.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.subunits.is_positive()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.subunits.is_negative()
    }

    // ========== Arithmetic ==========

    /// Adds two amounts of the same currency.
    pub fn add(&self, other: &Self) -> MoneyResult<Self> {
        self.ensure_same_currency(other)?;
        Ok(self.with_subunits(&self.subunits + &other.subunits))
    }

    /// Subtracts `other` from `self`; both must share a currency.
    pub fn subtract(&self, other: &Self) -> MoneyResult<Self> {
        self.ensure_same_currency(other)?;
        Ok(self.with_subunits(&self.subunits - &other.subunits))
    }

    /// Multiplies by an exact decimal factor, rounding half to even.
    ///
    /// Rounding happens once per multiplication, so a chain of line items
    /// commits to whole subunits at every step.
    ///
    /// # Example
    ///
    /// ```
    /// use subunit_shared::types::{CurrencyRegistry, Money};
    ///
    /// let registry = CurrencyRegistry::with_defaults();
    /// let price = Money::parse("USD", "19.99", &registry).unwrap();
    /// let tax = price.multiply(0.0825).unwrap();
    /// assert_eq!(tax.amount(), "1.65");
    /// ```
    pub fn multiply(&self, factor: impl IntoDecimal) -> MoneyResult<Self> {
        let factor = factor.into_decimal()?;
        let product = &self.subunits * factor.mantissa();
        Ok(self.with_subunits(rounded_divide(&product, &pow10(factor.scale()))))
    }

    /// Returns the amount with its sign flipped.
    #[must_use]
    pub fn negate(&self) -> Self {
        self.with_subunits(-&self.subunits)
    }

    /// Returns the absolute amount.
    #[must_use]
    pub fn abs(&self) -> Self {
        self.with_subunits(self.subunits.abs())
    }

    // ========== Comparison ==========

    /// Compares two amounts of the same currency.
    pub fn compare(&self, other: &Self) -> MoneyResult<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.subunits.cmp(&other.subunits))
    }

    /// Returns true if both amounts are equal; currencies must match.
    pub fn equals(&self, other: &Self) -> MoneyResult<bool> {
        Ok(self.compare(other)? == Ordering::Equal)
    }

    /// Returns true if `self > other`; currencies must match.
    pub fn greater_than(&self, other: &Self) -> MoneyResult<bool> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    /// Returns true if `self >= other`; currencies must match.
    pub fn greater_than_or_equal(&self, other: &Self) -> MoneyResult<bool> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    /// Returns true if `self < other`; currencies must match.
    pub fn less_than(&self, other: &Self) -> MoneyResult<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    /// Returns true if `self <= other`; currencies must match.
    pub fn less_than_or_equal(&self, other: &Self) -> MoneyResult<bool> {
        Ok(self.compare(other)? != Ordering::Greater)
    }

    /// Fails with a currency mismatch unless `other` shares this currency
    /// and its decimal places.
    ///
    /// The same code resolved against two different lookups can carry
    /// different scales; those subunit counts are not comparable.
    pub fn ensure_same_currency(&self, other: &Self) -> MoneyResult<()> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                expected: self.currency.to_string(),
                found: other.currency.to_string(),
            });
        }
        if self.decimal_places != other.decimal_places {
            return Err(MoneyError::CurrencyMismatch {
                expected: format!("{} ({} dp)", self.currency, self.decimal_places),
                found: format!("{} ({} dp)", other.currency, other.decimal_places),
            });
        }
        Ok(())
    }
}

impl PartialOrd for Money {
    /// `None` across currencies.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency == other.currency && self.decimal_places == other.decimal_places {
            Some(self.subunits.cmp(&other.subunits))
        } else {
            None
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount(), self.currency)
    }
}

/// Serialized form of [`Money`]: `{ "currency": "USD", "amount": "19.99" }`.
///
/// Deserialize into this record, then resolve it against a currency lookup
/// with [`MoneyRecord::into_money`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyRecord {
    /// Currency code.
    pub currency: String,
    /// Fixed-precision decimal amount.
    pub amount: String,
}

impl MoneyRecord {
    /// Resolves the record into a value.
    pub fn into_money<L>(self, lookup: &L) -> MoneyResult<Money>
    where
        L: CurrencyLookup + ?Sized,
    {
        Money::parse(self.currency.as_str(), self.amount.as_str(), lookup)
    }
}

impl From<&Money> for MoneyRecord {
    fn from(money: &Money) -> Self {
        Self {
            currency: money.currency.to_string(),
            amount: money.amount(),
        }
    }
}

impl From<Money> for MoneyRecord {
    fn from(money: Money) -> Self {
        Self::from(&money)
    }
}
