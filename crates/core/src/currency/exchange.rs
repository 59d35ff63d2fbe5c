//! Exchange rate types and the in-memory rate store.
//!
//! Rates are accepted as anything readable as an exact decimal (text,
//! integers, floats through their shortest round-trip form, `Decimal`),
//! kept as `rust_decimal::Decimal` and only promoted to a bounded-precision
//! integer inside the converter.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use subunit_shared::types::{CurrencyCode, IntoCurrencyCode, IntoDecimal};
use subunit_shared::{MoneyError, MoneyResult};

/// Source label of synthesized inverse rates.
pub const INVERSE_SOURCE: &str = "(inverse)";

/// Source label of synthesized identity rates.
pub const IDENTITY_SOURCE: &str = "(identity)";

/// How a rate came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    /// Set by a caller.
    Explicit,
    /// Derived as `1 / rate` from the opposite direction.
    Inverse,
    /// `(X, X)`, always 1 and never stored.
    Identity,
}

/// Exchange rate between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency code.
    pub from_currency: CurrencyCode,
    /// Target currency code.
    pub to_currency: CurrencyCode,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
    /// When this rate was set.
    pub timestamp: DateTime<Utc>,
    /// Optional provenance label (feed name, `"(inverse)"`, ...).
    pub source: Option<String>,
    /// How the rate was created.
    pub origin: RateOrigin,
}

impl ExchangeRate {
    /// Creates an explicit rate stamped with the current time.
    #[must_use]
    pub fn new(
        from_currency: CurrencyCode,
        to_currency: CurrencyCode,
        rate: Decimal,
        source: Option<String>,
    ) -> Self {
        Self {
            from_currency,
            to_currency,
            rate,
            timestamp: Utc::now(),
            source,
            origin: RateOrigin::Explicit,
        }
    }

    /// The implicit `1` rate from a currency to itself.
    #[must_use]
    pub fn identity(currency: CurrencyCode) -> Self {
        Self {
            from_currency: currency.clone(),
            to_currency: currency,
            rate: Decimal::ONE,
            timestamp: Utc::now(),
            source: Some(IDENTITY_SOURCE.to_string()),
            origin: RateOrigin::Identity,
        }
    }

    /// Returns the inverse rate, or `None` if `1 / rate` is not representable.
    ///
    /// Division is best-effort (28 significant digits); the result is
    /// labelled `"(inverse)"` and can be overwritten by an explicit rate.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let rate = Decimal::ONE.checked_div(self.rate)?;
        Some(Self {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate: rate.normalize(),
            timestamp: self.timestamp,
            source: Some(INVERSE_SOURCE.to_string()),
            origin: RateOrigin::Inverse,
        })
    }
}

/// Both directions of a currency pair plus their round-trip discrepancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePair {
    /// Rate `a -> b`.
    pub forward: ExchangeRate,
    /// Rate `b -> a`.
    pub reverse: ExchangeRate,
    /// `|1 - forward * reverse|`; zero when the two rates are exact inverses.
    pub discrepancy: Decimal,
}

type PairKey = (CurrencyCode, CurrencyCode);

/// In-memory exchange rate store.
///
/// One rate per ordered currency pair; setting a pair again replaces it.
/// All methods take `&self`: writes to a pair are serialized against reads
/// of that pair, so the store can be shared behind an `Arc`.
#[derive(Debug)]
pub struct ExchangeRateStore {
    rates: DashMap<PairKey, ExchangeRate>,
    auto_inverse: bool,
}

impl ExchangeRateStore {
    /// Creates an empty store that synthesizes inverse rates.
    #[must_use]
    pub fn new() -> Self {
        Self::with_auto_inverse(true)
    }

    /// Creates an empty store with the given auto-inverse default.
    #[must_use]
    pub fn with_auto_inverse(auto_inverse: bool) -> Self {
        Self {
            rates: DashMap::new(),
            auto_inverse,
        }
    }

    /// Whether `set_rate` synthesizes inverse rates.
    #[must_use]
    pub fn auto_inverse(&self) -> bool {
        self.auto_inverse
    }

    /// Stores `from -> to`, using the store's auto-inverse default.
    pub fn set_rate(
        &self,
        from: impl IntoCurrencyCode,
        to: impl IntoCurrencyCode,
        rate: impl IntoDecimal,
        source: Option<&str>,
    ) -> MoneyResult<ExchangeRate> {
        self.set_rate_with(from, to, rate, source, self.auto_inverse)
    }

    /// Stores `from -> to`, replacing any previous rate for that pair.
    ///
    /// With `auto_inverse`, `to -> from` is set to `1 / rate` unless an
    /// explicit rate already exists in that direction. A previously
    /// synthesized inverse is refreshed.
    pub fn set_rate_with(
        &self,
        from: impl IntoCurrencyCode,
        to: impl IntoCurrencyCode,
        rate: impl IntoDecimal,
        source: Option<&str>,
        auto_inverse: bool,
    ) -> MoneyResult<ExchangeRate> {
        let from = from.into_currency_code()?;
        let to = to.into_currency_code()?;
        let rate = exact_rate(rate)?;
        validate_rate(&from, &to, rate)?;

        let entry = ExchangeRate::new(from, to, rate, source.map(str::to_string));
        self.store(entry.clone());

        if auto_inverse {
            self.store_inverse(&entry);
        }

        Ok(entry)
    }

    fn store(&self, rate: ExchangeRate) {
        tracing::debug!(
            from = %rate.from_currency,
            to = %rate.to_currency,
            rate = %rate.rate,
            source = rate.source.as_deref().unwrap_or(""),
            "Exchange rate set"
        );
        self.rates
            .insert((rate.from_currency.clone(), rate.to_currency.clone()), rate);
    }

    fn store_inverse(&self, forward: &ExchangeRate) {
        let Some(inverse) = forward.inverse() else {
            tracing::warn!(
                from = %forward.from_currency,
                to = %forward.to_currency,
                rate = %forward.rate,
                "Inverse rate not representable, skipping"
            );
            return;
        };

        let key = (inverse.from_currency.clone(), inverse.to_currency.clone());
        // Check-then-write happens under the entry lock for the inverse pair.
        match self.rates.entry(key) {
            Entry::Occupied(mut existing) => {
                if existing.get().origin == RateOrigin::Inverse {
                    existing.insert(inverse);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(inverse);
            }
        }
    }

    /// Returns the rate `from -> to`.
    ///
    /// `(X, X)` always yields the identity rate without touching storage.
    pub fn get_rate(&self, from: impl AsRef<str>, to: impl AsRef<str>) -> Option<ExchangeRate> {
        let (from, to) = pair_key(from.as_ref(), to.as_ref())?;
        if from == to {
            return Some(ExchangeRate::identity(from));
        }
        self.rates.get(&(from, to)).map(|entry| entry.value().clone())
    }

    /// Returns both directions of `a <-> b` with their discrepancy, or
    /// `None` if either direction is missing.
    pub fn get_rate_pair(&self, a: impl AsRef<str>, b: impl AsRef<str>) -> Option<RatePair> {
        let forward = self.get_rate(a.as_ref(), b.as_ref())?;
        let reverse = self.get_rate(b.as_ref(), a.as_ref())?;
        let discrepancy = (Decimal::ONE - forward.rate.saturating_mul(reverse.rate)).abs();
        Some(RatePair {
            forward,
            reverse,
            discrepancy,
        })
    }

    /// Removes the rate `from -> to` (the opposite direction is kept).
    pub fn remove_rate(&self, from: impl AsRef<str>, to: impl AsRef<str>) -> Option<ExchangeRate> {
        let key = pair_key(from.as_ref(), to.as_ref())?;
        let removed = self.rates.remove(&key).map(|(_, rate)| rate);
        if removed.is_some() {
            tracing::debug!(from = %key.0, to = %key.1, "Exchange rate removed");
        }
        removed
    }

    /// Removes every stored rate.
    pub fn clear(&self) {
        self.rates.clear();
        tracing::debug!("Exchange rate store cleared");
    }

    /// All stored rates, sorted by source then target currency.
    #[must_use]
    pub fn all_rates(&self) -> Vec<ExchangeRate> {
        let mut rates: Vec<ExchangeRate> =
            self.rates.iter().map(|entry| entry.value().clone()).collect();
        rates.sort_by(|a, b| {
            (&a.from_currency, &a.to_currency).cmp(&(&b.from_currency, &b.to_currency))
        });
        rates
    }

    /// Stored rates out of `base`, sorted by target currency.
    #[must_use]
    pub fn rates_from(&self, base: impl AsRef<str>) -> Vec<ExchangeRate> {
        let base = base.as_ref();
        let mut rates: Vec<ExchangeRate> = self
            .rates
            .iter()
            .filter(|entry| entry.key().0.as_str() == base)
            .map(|entry| entry.value().clone())
            .collect();
        rates.sort_by(|a, b| a.to_currency.cmp(&b.to_currency));
        rates
    }

    /// Bulk-loads `"FROM:TO" -> rate` entries without inferring inverses.
    ///
    /// Every entry is validated before any is written; one bad key or rate
    /// fails the whole load. Returns the number of rates stored.
    pub fn load_rates<K, R>(
        &self,
        rates: impl IntoIterator<Item = (K, R)>,
        source: Option<&str>,
    ) -> MoneyResult<usize>
    where
        K: AsRef<str>,
        R: IntoDecimal,
    {
        let parsed = rates
            .into_iter()
            .map(|(key, rate)| {
                let key = key.as_ref();
                let (from, to) = key
                    .split_once(':')
                    .and_then(|(from, to)| pair_key(from, to))
                    .ok_or_else(|| {
                        MoneyError::InvalidExchangeRate(format!("malformed currency pair '{key}'"))
                    })?;
                let rate = exact_rate(rate)?;
                validate_rate(&from, &to, rate)?;
                Ok(ExchangeRate::new(from, to, rate, source.map(str::to_string)))
            })
            .collect::<MoneyResult<Vec<ExchangeRate>>>()?;

        let count = parsed.len();
        for rate in parsed {
            self.store(rate);
        }
        tracing::info!(count, source = source.unwrap_or(""), "Exchange rates loaded");
        Ok(count)
    }

    /// Number of stored rates (identity rates are never stored).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true if no rate is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for ExchangeRateStore {
    fn default() -> Self {
        Self::new()
    }
}

fn pair_key(from: &str, to: &str) -> Option<PairKey> {
    Some((CurrencyCode::new(from).ok()?, CurrencyCode::new(to).ok()?))
}

fn exact_rate(rate: impl IntoDecimal) -> MoneyResult<Decimal> {
    let literal = rate
        .into_decimal()
        .map_err(|err| MoneyError::InvalidExchangeRate(err.to_string()))?;
    literal.to_decimal().ok_or_else(|| {
        MoneyError::InvalidExchangeRate(format!("rate {literal} exceeds Decimal precision"))
    })
}

fn validate_rate(from: &CurrencyCode, to: &CurrencyCode, rate: Decimal) -> MoneyResult<()> {
    if from == to {
        return Err(MoneyError::InvalidExchangeRate(format!(
            "{from} to {to} is always 1 and cannot be set"
        )));
    }
    if rate <= Decimal::ZERO {
        return Err(MoneyError::InvalidExchangeRate(format!(
            "rate for {from} to {to} must be positive, got {rate}"
        )));
    }
    Ok(())
}
