//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::cache_store::{CacheStore, RunMode};
use crate::adapters::csv_adapter::CsvQuoteAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::error::TrendevalError;
use crate::domain::evaluate::evaluate;
use crate::domain::ingest::Ingestor;
use crate::domain::params::{parse_end_date, StrategyParams};
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuotePort;

pub const OFFLINE_ENV: &str = "TRENDEVAL_OFFLINE";
pub const CACHE_DIR_ENV: &str = "TRENDEVAL_CACHE_DIR";
const DEFAULT_CACHE_DIR: &str = "cache";

#[derive(Parser, Debug)]
#[command(name = "trendeval", about = "Moving-average crossover strategy evaluator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand: where the cache lives, whether the
/// process may reach the network, and an optional local CSV quote source.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// INI config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Never touch the network; the cache is authoritative
    #[arg(long)]
    pub offline: bool,
    /// Cache root directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
    /// Read quotes from <dir>/<SYMBOL>.csv instead of Yahoo Finance
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the crossover strategy for a ticker and print the report
    Evaluate {
        #[arg(long)]
        ticker: String,
        /// Benchmark ticker for relative performance
        #[arg(long)]
        benchmark: Option<String>,
        #[arg(long)]
        lookback_years: Option<u32>,
        #[arg(long)]
        short_window: Option<usize>,
        #[arg(long)]
        long_window: Option<usize>,
        #[arg(long)]
        risk_free_rate: Option<f64>,
        /// Inclusive cutoff date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Fetch one symbol's history and warm the cache
    Fetch {
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value_t = 3)]
        lookback_years: u32,
        /// Inclusive cutoff date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Evaluate {
            ticker,
            benchmark,
            lookback_years,
            short_window,
            long_window,
            risk_free_rate,
            end_date,
            source,
        } => run_evaluate(
            ticker,
            benchmark,
            lookback_years,
            short_window,
            long_window,
            risk_free_rate,
            end_date,
            &source,
        ),
        Command::Fetch {
            symbol,
            lookback_years,
            end_date,
            source,
        } => run_fetch(symbol, lookback_years, end_date, &source),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn load_config(source: &SourceArgs) -> Result<Option<FileConfigAdapter>, TrendevalError> {
    match &source.config {
        Some(path) => FileConfigAdapter::from_file(path)
            .map(Some)
            .map_err(|e| TrendevalError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

fn env_truthy(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Resolve the run mode once: flag beats environment beats config file.
pub fn resolve_mode(source: &SourceArgs, config: Option<&FileConfigAdapter>) -> RunMode {
    let offline = source.offline
        || env_truthy(OFFLINE_ENV)
        || config.is_some_and(|c| c.get_bool("network", "offline", false));
    if offline { RunMode::Offline } else { RunMode::Online }
}

pub fn resolve_cache_dir(source: &SourceArgs, config: Option<&FileConfigAdapter>) -> PathBuf {
    source
        .cache_dir
        .clone()
        .or_else(|| std::env::var(CACHE_DIR_ENV).ok().map(PathBuf::from))
        .or_else(|| config.and_then(|c| c.get_string("cache", "dir")).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
}

fn build_quotes(source: &SourceArgs) -> Box<dyn QuotePort> {
    match &source.csv_dir {
        Some(dir) => Box::new(CsvQuoteAdapter::new(dir.clone())),
        None => Box::new(YahooAdapter::new()),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_evaluate(
    ticker: String,
    benchmark: Option<String>,
    lookback_years: Option<u32>,
    short_window: Option<usize>,
    long_window: Option<usize>,
    risk_free_rate: Option<f64>,
    end_date: Option<String>,
    source: &SourceArgs,
) -> Result<(), TrendevalError> {
    let config = load_config(source)?;
    let defaults = StrategyParams::default();
    let params = StrategyParams {
        ticker,
        benchmark: benchmark
            .or_else(|| config.as_ref().and_then(|c| c.get_string("strategy", "benchmark")))
            .unwrap_or(defaults.benchmark),
        lookback_years: lookback_years.unwrap_or(defaults.lookback_years),
        short_window: short_window.unwrap_or(defaults.short_window),
        long_window: long_window.unwrap_or(defaults.long_window),
        risk_free_rate: risk_free_rate.unwrap_or_else(|| {
            config
                .as_ref()
                .map_or(defaults.risk_free_rate, |c| {
                    c.get_double("strategy", "risk_free_rate", defaults.risk_free_rate)
                })
        }),
        end_date: end_date.as_deref().map(parse_end_date).transpose()?,
    };

    let cache = CacheStore::new(
        resolve_cache_dir(source, config.as_ref()),
        resolve_mode(source, config.as_ref()),
    );
    let quotes = build_quotes(source);
    let result = evaluate(params, quotes.as_ref(), &cache)?;

    let rendered = serde_json::to_string_pretty(&result).map_err(|e| TrendevalError::Cache {
        reason: format!("unserializable report: {e}"),
    })?;
    println!("{rendered}");
    Ok(())
}

fn run_fetch(
    symbol: String,
    lookback_years: u32,
    end_date: Option<String>,
    source: &SourceArgs,
) -> Result<(), TrendevalError> {
    let config = load_config(source)?;
    let end_date = end_date.as_deref().map(parse_end_date).transpose()?;
    let cache = CacheStore::new(
        resolve_cache_dir(source, config.as_ref()),
        resolve_mode(source, config.as_ref()),
    );
    let quotes = build_quotes(source);
    let ingestor = Ingestor::new(quotes.as_ref(), &cache);
    let series = ingestor.fetch_series(&symbol.trim().to_uppercase(), lookback_years, end_date)?;

    let last = series.last().map(|p| p.date.to_string()).unwrap_or_default();
    println!("{}: {} bars through {}", series.symbol, series.len(), last);
    Ok(())
}
