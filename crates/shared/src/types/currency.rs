//! Currency identifiers and decimal-place definitions.
//!
//! The money core only needs one thing from a currency table: how many
//! subunit digits a code uses. That capability is the [`CurrencyLookup`]
//! trait. [`CurrencyRegistry`] is the in-memory implementation shipped with
//! the engine.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CurrenciesConfig;
use crate::error::{MoneyError, MoneyResult};

/// Built-in currency table: (code, decimal places).
const DEFAULT_CURRENCIES: &[(&str, u32)] = &[
    ("USD", 2),
    ("EUR", 2),
    ("GBP", 2),
    ("IDR", 2),
    ("SGD", 2),
    ("JPY", 0),
    ("BTC", 8),
    ("ETH", 18),
    ("XNO", 30),
];

/// Opaque currency identifier (e.g., "USD", "ETH").
///
/// Any non-empty string without whitespace or `:` is accepted. Codes are
/// compared verbatim; no case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code, validating its shape.
    pub fn new(code: impl Into<String>) -> MoneyResult<Self> {
        let code = code.into();
        let malformed = code.is_empty()
            || code
                .chars()
                .any(|c| c.is_whitespace() || c == ':' || c.is_control());
        if malformed {
            return Err(MoneyError::InvalidCurrencyCode(code));
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = MoneyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Anything usable as a currency identifier argument.
pub trait IntoCurrencyCode {
    /// Converts `self` into a validated currency code.
    fn into_currency_code(self) -> MoneyResult<CurrencyCode>;
}

impl IntoCurrencyCode for CurrencyCode {
    fn into_currency_code(self) -> MoneyResult<CurrencyCode> {
        Ok(self)
    }
}

impl IntoCurrencyCode for &CurrencyCode {
    fn into_currency_code(self) -> MoneyResult<CurrencyCode> {
        Ok(self.clone())
    }
}

impl IntoCurrencyCode for &str {
    fn into_currency_code(self) -> MoneyResult<CurrencyCode> {
        CurrencyCode::new(self)
    }
}

impl IntoCurrencyCode for String {
    fn into_currency_code(self) -> MoneyResult<CurrencyCode> {
        CurrencyCode::new(self)
    }
}

impl IntoCurrencyCode for &String {
    fn into_currency_code(self) -> MoneyResult<CurrencyCode> {
        CurrencyCode::new(self.as_str())
    }
}

/// Subunit definition of one currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyDefinition {
    /// Currency identifier.
    pub code: CurrencyCode,
    /// Number of subunit digits (2 for cents, 8 for satoshis, 18 for wei).
    pub decimal_places: u32,
}

/// Lookup capability from currency code to its subunit definition.
pub trait CurrencyLookup: Send + Sync {
    /// Returns the definition for `code`, or `None` if it is not registered.
    fn lookup(&self, code: &CurrencyCode) -> Option<CurrencyDefinition>;

    /// Returns the definition for `code`, or an unknown-currency error.
    fn require(&self, code: &CurrencyCode) -> MoneyResult<CurrencyDefinition> {
        self.lookup(code)
            .ok_or_else(|| MoneyError::UnknownCurrency(code.to_string()))
    }
}

impl<L: CurrencyLookup + ?Sized> CurrencyLookup for std::sync::Arc<L> {
    fn lookup(&self, code: &CurrencyCode) -> Option<CurrencyDefinition> {
        (**self).lookup(code)
    }
}

impl<L: CurrencyLookup + ?Sized> CurrencyLookup for &L {
    fn lookup(&self, code: &CurrencyCode) -> Option<CurrencyDefinition> {
        (**self).lookup(code)
    }
}

/// In-memory currency table.
///
/// Populate it up front, then share it read-only (e.g., behind an `Arc`).
#[derive(Debug, Clone, Default)]
pub struct CurrencyRegistry {
    definitions: HashMap<CurrencyCode, CurrencyDefinition>,
}

impl CurrencyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in currency table.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (code, decimal_places) in DEFAULT_CURRENCIES {
            registry.definitions.insert(
                CurrencyCode((*code).to_string()),
                CurrencyDefinition {
                    code: CurrencyCode((*code).to_string()),
                    decimal_places: *decimal_places,
                },
            );
        }
        registry
    }

    /// Builds a registry from the currency section of the engine config.
    pub fn from_config(config: &CurrenciesConfig) -> MoneyResult<Self> {
        let mut registry = if config.include_defaults {
            Self::with_defaults()
        } else {
            Self::new()
        };
        for seed in &config.extra {
            registry.register(seed.code.as_str(), seed.decimal_places)?;
        }
        Ok(registry)
    }

    /// Registers (or redefines) a currency.
    pub fn register(
        &mut self,
        code: impl IntoCurrencyCode,
        decimal_places: u32,
    ) -> MoneyResult<CurrencyDefinition> {
        let code = code.into_currency_code()?;
        let definition = CurrencyDefinition {
            code: code.clone(),
            decimal_places,
        };
        if let Some(previous) = self.definitions.insert(code, definition.clone()) {
            tracing::debug!(
                currency = %definition.code,
                previous = previous.decimal_places,
                decimal_places,
                "Currency redefined"
            );
        }
        Ok(definition)
    }

    /// Returns the number of registered currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if no currency is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the registered codes, sorted.
    #[must_use]
    pub fn codes(&self) -> Vec<CurrencyCode> {
        let mut codes: Vec<CurrencyCode> = self.definitions.keys().cloned().collect();
        codes.sort();
        codes
    }
}

impl CurrencyLookup for CurrencyRegistry {
    fn lookup(&self, code: &CurrencyCode) -> Option<CurrencyDefinition> {
        self.definitions.get(code).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CurrencySeed;
    use rstest::rstest;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[rstest]
    #[case("USD")]
    #[case("usdc")]
    #[case("ETH-L2")]
    #[case("€")]
    fn test_currency_code_accepts(#[case] input: &str) {
        let parsed: CurrencyCode = input.parse().unwrap();
        assert_eq!(parsed.as_str(), input);
        assert_eq!(parsed.to_string(), input);
    }

    #[rstest]
    #[case("")]
    #[case("US D")]
    #[case("USD:EUR")]
    #[case("\tUSD")]
    fn test_currency_code_rejects(#[case] input: &str) {
        let err = CurrencyCode::new(input).unwrap_err();
        assert_eq!(err, MoneyError::InvalidCurrencyCode(input.to_string()));
    }

    #[test]
    fn test_currency_code_is_case_sensitive() {
        assert_ne!(code("usd"), code("USD"));
    }

    #[rstest]
    #[case("USD", 2)]
    #[case("JPY", 0)]
    #[case("BTC", 8)]
    #[case("ETH", 18)]
    #[case("XNO", 30)]
    fn test_default_table(#[case] currency: &str, #[case] decimal_places: u32) {
        let registry = CurrencyRegistry::with_defaults();
        let definition = registry.lookup(&code(currency)).unwrap();
        assert_eq!(definition.decimal_places, decimal_places);
        assert_eq!(definition.code, code(currency));
    }

    #[test]
    fn test_unknown_currency() {
        let registry = CurrencyRegistry::with_defaults();
        assert!(registry.lookup(&code("XXX")).is_none());
        assert_eq!(
            registry.require(&code("XXX")).unwrap_err(),
            MoneyError::UnknownCurrency("XXX".to_string())
        );
    }

    #[test]
    fn test_register_and_redefine() {
        let mut registry = CurrencyRegistry::new();
        assert!(registry.is_empty());

        registry.register("GEM", 4).unwrap();
        assert_eq!(registry.lookup(&code("GEM")).unwrap().decimal_places, 4);

        registry.register("GEM", 6).unwrap();
        assert_eq!(registry.lookup(&code("GEM")).unwrap().decimal_places, 6);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_bad_code() {
        let mut registry = CurrencyRegistry::new();
        assert!(registry.register("", 2).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_codes_sorted() {
        let mut registry = CurrencyRegistry::new();
        registry.register("ZAR", 2).unwrap();
        registry.register("AUD", 2).unwrap();
        registry.register("MXN", 2).unwrap();
        assert_eq!(registry.codes(), vec![code("AUD"), code("MXN"), code("ZAR")]);
    }

    #[test]
    fn test_from_config() {
        let config = CurrenciesConfig {
            include_defaults: false,
            extra: vec![CurrencySeed {
                code: "SAT".to_string(),
                decimal_places: 0,
            }],
        };
        let registry = CurrencyRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(&code("SAT")).unwrap().decimal_places, 0);

        let with_defaults = CurrencyRegistry::from_config(&CurrenciesConfig::default()).unwrap();
        assert_eq!(with_defaults.len(), DEFAULT_CURRENCIES.len());
    }

    #[test]
    fn test_lookup_through_arc() {
        let registry = std::sync::Arc::new(CurrencyRegistry::with_defaults());
        assert_eq!(registry.require(&code("EUR")).unwrap().decimal_places, 2);
    }

    #[test]
    fn test_code_serde() {
        let json = serde_json::to_string(&code("BTC")).unwrap();
        assert_eq!(json, "\"BTC\"");
        let parsed: CurrencyCode = serde_json::from_str("\"ETH\"").unwrap();
        assert_eq!(parsed, code("ETH"));
        assert!(serde_json::from_str::<CurrencyCode>("\"\"").is_err());
    }
}
