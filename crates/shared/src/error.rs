//! Money error types.
//!
//! Every operation either fully succeeds or returns one of these kinds.
//! Nothing is retried, defaulted, or downgraded to a warning.

use thiserror::Error;

/// Result type alias using `MoneyError`.
pub type MoneyResult<T> = Result<T, MoneyError>;

/// Errors raised by money parsing, arithmetic, allocation and conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    // ========== Currency Errors ==========
    /// The currency has no registered decimal-place definition.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// The currency identifier is empty or malformed.
    #[error("Invalid currency code: '{0}'")]
    InvalidCurrencyCode(String),

    /// An operation requiring one currency received two.
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Currency of the receiving value.
        expected: String,
        /// Currency of the other operand.
        found: String,
    },

    // ========== Amount Errors ==========
    /// Input does not match the decimal amount grammar.
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),

    /// Input has more fractional digits than the currency allows.
    #[error("Too many subunit digits for {currency}: found {found}, maximum is {decimal_places}")]
    PrecisionExceeded {
        /// Currency code.
        currency: String,
        /// Decimal places the currency allows.
        decimal_places: u32,
        /// Fractional digits present in the input.
        found: u32,
    },

    /// Proportions are empty, negative, non-finite, or sum to zero.
    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    /// A ratio was requested against a zero value.
    #[error("Division by zero")]
    DivisionByZero,

    /// A derived value does not fit the requested representation.
    #[error("Overflow: {0}")]
    Overflow(String),

    // ========== Exchange Rate Errors ==========
    /// No stored (or identity) rate for the currency pair.
    #[error("No exchange rate found for {from} to {to}")]
    NoExchangeRate {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
    },

    /// Rate is not positive, targets the same currency, or has a malformed key.
    #[error("Invalid exchange rate: {0}")]
    InvalidExchangeRate(String),
}

impl MoneyError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            Self::InvalidCurrencyCode(_) => "INVALID_CURRENCY_CODE",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::PrecisionExceeded { .. } => "PRECISION_EXCEEDED",
            Self::InvalidAllocation(_) => "INVALID_ALLOCATION",
            Self::DivisionByZero => "DIVISION_BY_ZERO",
            Self::Overflow(_) => "OVERFLOW",
            Self::NoExchangeRate { .. } => "NO_EXCHANGE_RATE",
            Self::InvalidExchangeRate(_) => "INVALID_EXCHANGE_RATE",
        }
    }

    /// Returns true if the error was caused by the caller's input rather
    /// than by missing reference data (currencies or rates).
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        !matches!(
            self,
            Self::UnknownCurrency(_) | Self::NoExchangeRate { .. }
        )
    }
}
