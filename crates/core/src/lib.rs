//! Exchange rates and currency conversion for Subunit.
//!
//! This crate is pure computation with ZERO web or database dependencies.
//! Amounts, currencies and rounding live in `subunit-shared`; this crate
//! adds the rate store and everything that crosses currencies.
//!
//! # Modules
//!
//! - `currency` - Exchange rate store, converter and the currency service

pub mod currency;
