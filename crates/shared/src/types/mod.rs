//! Money types used across the engine.

pub mod allocation;
pub mod currency;
pub mod decimal;
pub mod money;
pub mod rounding;

#[cfg(test)]
mod money_props;

pub use currency::{
    CurrencyCode, CurrencyDefinition, CurrencyLookup, CurrencyRegistry, IntoCurrencyCode,
};
pub use decimal::{DecimalLiteral, IntoDecimal};
pub use money::{Money, MoneyRecord};
pub use rounding::rounded_divide;
