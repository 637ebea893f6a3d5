//! Utils

use std::{io, path::PathBuf};

use clap::Parser;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::fees::DeliveryMode;

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Arguments for the quote demo
#[derive(Debug, Parser)]
pub struct QuoteArgs {
    /// Fixture set to use for the basket, fees & discounts
    #[arg(short, long, default_value = "lunch")]
    pub fixture: String,

    /// Directory holding the fixture sets
    #[arg(long, default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Delivery or collection
    #[arg(short, long, value_enum, default_value_t = DeliveryMode::Delivery)]
    pub mode: DeliveryMode,

    /// Fulfilment date as offered at checkout, e.g. "23/10 - Friday"; defaults to today
    #[arg(short, long)]
    pub date: Option<String>,

    /// Quote as if the store fee schedule failed to load
    #[arg(long)]
    pub no_fees: bool,

    /// Delivery address to validate the order against
    #[arg(short, long)]
    pub address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Install the global tracing subscriber, logging to stderr.
///
/// `RUST_LOG` directives take precedence over `level`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(format: LogFormat, level: &str) -> Result<(), TryInitError> {
    match format {
        LogFormat::Compact => init_with_layer(
            level,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(io::stderr),
        ),
        LogFormat::Json => init_with_layer(
            level,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(io::stderr),
        ),
    }
}

fn init_with_layer<L>(level: &str, fmt_layer: L) -> Result<(), TryInitError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
}
