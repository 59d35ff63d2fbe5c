//! Shared money types, rounding, errors, and configuration for Subunit.
//!
//! This crate provides the exact-arithmetic value layer used by every
//! other crate:
//! - `Money`: an immutable amount stored as a big-integer subunit count
//! - Round-half-to-even division, the only rounding rule in the engine
//! - Currency lookup trait and the in-memory currency registry
//! - Engine-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{MoneyError, MoneyResult};
