//! Engine configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Currency table configuration.
    #[serde(default)]
    pub currencies: CurrenciesConfig,
    /// Exchange rate configuration.
    #[serde(default)]
    pub rates: RatesConfig,
}

/// Currency table configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrenciesConfig {
    /// Register the built-in currency table before `extra`.
    #[serde(default = "default_include_defaults")]
    pub include_defaults: bool,
    /// Additional currencies, registered in order (later entries win).
    #[serde(default)]
    pub extra: Vec<CurrencySeed>,
}

impl Default for CurrenciesConfig {
    fn default() -> Self {
        Self {
            include_defaults: default_include_defaults(),
            extra: Vec::new(),
        }
    }
}

fn default_include_defaults() -> bool {
    true
}

/// A currency definition supplied through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencySeed {
    /// Currency identifier.
    pub code: String,
    /// Number of subunit digits.
    pub decimal_places: u32,
}

/// Exchange rate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Decimal places a rate is scaled to before integer conversion.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Whether `set_rate` synthesizes the inverse rate by default.
    #[serde(default = "default_auto_inverse")]
    pub auto_inverse: bool,
    /// Source label applied to seeded rates.
    #[serde(default)]
    pub source: Option<String>,
    /// Rates loaded at startup. Inverses are never inferred for these.
    #[serde(default)]
    pub seed: Vec<RateSeed>,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            auto_inverse: default_auto_inverse(),
            source: None,
            seed: Vec::new(),
        }
    }
}

fn default_precision() -> u32 {
    15
}

fn default_auto_inverse() -> bool {
    true
}

/// An exchange rate supplied through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateSeed {
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Rate as exact decimal text (1 from = rate to).
    pub rate: Decimal,
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default`,
    /// `config/{RUN_MODE}`, then `SUBUNIT__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SUBUNIT").separator("__"))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        tracing::debug!(
            run_mode = %run_mode,
            extra_currencies = loaded.currencies.extra.len(),
            seeded_rates = loaded.rates.seed.len(),
            "Engine configuration loaded"
        );
        Ok(loaded)
    }

    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or does not match
    /// the configuration shape.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
