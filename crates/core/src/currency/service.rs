//! Currency service wiring the currency table, rate store and converter.
//!
//! This is the entry point most callers want: build it once from
//! [`EngineConfig`], share it, and create or convert amounts through it.

use std::sync::Arc;

use num_bigint::BigInt;
use subunit_shared::types::{
    CurrencyLookup, CurrencyRegistry, IntoCurrencyCode, IntoDecimal, Money,
};
use subunit_shared::{EngineConfig, MoneyResult};

use super::conversion::CurrencyConverter;
use super::exchange::ExchangeRateStore;

/// Currency service for money creation and conversion.
#[derive(Debug, Clone)]
pub struct CurrencyService {
    registry: Arc<CurrencyRegistry>,
    rates: Arc<ExchangeRateStore>,
    converter: CurrencyConverter,
}

impl CurrencyService {
    /// Creates a service over `registry` with an empty, auto-inverting
    /// rate store and the default rate precision.
    #[must_use]
    pub fn new(registry: CurrencyRegistry) -> Self {
        Self::assemble(registry, ExchangeRateStore::new(), None)
    }

    /// Builds the service from configuration.
    ///
    /// Seeded rates are loaded as given; no inverse is inferred for them.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured currency code or seeded rate is
    /// invalid. Nothing is partially loaded in that case.
    pub fn from_config(config: &EngineConfig) -> MoneyResult<Self> {
        let registry = CurrencyRegistry::from_config(&config.currencies)?;
        let rates = ExchangeRateStore::with_auto_inverse(config.rates.auto_inverse);

        let seeds = config
            .rates
            .seed
            .iter()
            .map(|seed| (format!("{}:{}", seed.from, seed.to), seed.rate));
        rates.load_rates(seeds, config.rates.source.as_deref())?;

        tracing::info!(
            currencies = registry.len(),
            rates = rates.len(),
            rate_precision = config.rates.precision,
            auto_inverse = config.rates.auto_inverse,
            "Currency service initialized"
        );

        Ok(Self::assemble(registry, rates, Some(config.rates.precision)))
    }

    fn assemble(
        registry: CurrencyRegistry,
        rates: ExchangeRateStore,
        rate_precision: Option<u32>,
    ) -> Self {
        let registry = Arc::new(registry);
        let rates = Arc::new(rates);
        let currencies: Arc<dyn CurrencyLookup> = registry.clone();
        let mut converter = CurrencyConverter::new(Arc::clone(&rates), currencies);
        if let Some(precision) = rate_precision {
            converter = converter.with_rate_precision(precision);
        }
        Self {
            registry,
            rates,
            converter,
        }
    }

    /// The currency table.
    #[must_use]
    pub fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    /// The shared rate store.
    #[must_use]
    pub fn rates(&self) -> &ExchangeRateStore {
        &self.rates
    }

    /// The converter for mixed-currency arithmetic.
    #[must_use]
    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    /// Parses a decimal amount in `currency`.
    pub fn parse(
        &self,
        currency: impl IntoCurrencyCode,
        amount: impl IntoDecimal,
    ) -> MoneyResult<Money> {
        Money::parse(currency, amount, self.registry.as_ref())
    }

    /// Creates a value from a raw subunit count.
    pub fn from_subunits(
        &self,
        subunits: impl Into<BigInt>,
        currency: impl IntoCurrencyCode,
    ) -> MoneyResult<Money> {
        Money::from_subunits(subunits, currency, self.registry.as_ref())
    }

    /// Creates a zero amount in `currency`.
    pub fn zero(&self, currency: impl IntoCurrencyCode) -> MoneyResult<Money> {
        Money::zero(currency, self.registry.as_ref())
    }

    /// Converts `value` into `target` using the stored rates.
    pub fn convert(&self, value: &Money, target: impl IntoCurrencyCode) -> MoneyResult<Money> {
        self.converter.convert(value, target)
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new(CurrencyRegistry::with_defaults())
    }
}
