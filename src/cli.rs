//! Command line configuration

use std::path::PathBuf;

use assortment::config::DispatchConfig;
use clap::{Args, Parser};
use jiff::civil::Date;
use rust_decimal::Decimal;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
}

/// Select catalog units whose total is closest to a target amount
#[derive(Debug, Parser)]
#[command(name = "assortment", about = "Assortment selector", long_about = None)]
pub(crate) struct Cli {
    /// Catalog fixture (YAML)
    #[arg(short, long, env = "ASSORTMENT_CATALOG")]
    pub(crate) catalog: PathBuf,

    /// Target amount in the catalog currency, e.g. `1250.00`
    #[arg(short, long)]
    pub(crate) target: Decimal,

    /// The target includes VAT; solve for the amount before VAT
    #[arg(long)]
    pub(crate) gross: bool,

    /// VAT rate as a fraction
    #[arg(long, env = "VAT_RATE", default_value = "0.20")]
    pub(crate) vat_rate: Decimal,

    /// Only use items acquired on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) on: Option<Date>,

    /// Logging output settings.
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    /// Solver routing settings.
    #[command(flatten)]
    pub(crate) dispatch: DispatchConfig,
}

impl Cli {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
