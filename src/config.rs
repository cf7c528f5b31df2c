//! # Configuration
//!
//! Pipeline parameters with documented defaults and `MPT_*` environment overrides.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use dotenvy::dotenv;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::portfolio::statistics::TRADING_DAYS_PER_YEAR;
use crate::portfolio::OptimizerConfig;
use crate::portfolio::SamplingScheme;

pub const DEFAULT_TICKERS: [&str; 6] = ["AAPL", "WMT", "TSLA", "GE", "AMZN", "DB"];
pub const DEFAULT_NUM_PORTFOLIOS: usize = 10_000;

/// Market data fetch behaviour.
#[derive(Clone, Debug)]
pub struct FetchConfig {
  /// Per-request timeout.
  pub timeout: Duration,
  /// Total attempts per ticker, the first one included.
  pub max_attempts: u32,
  /// Delay before retry `k` is `k * backoff`.
  pub backoff: Duration,
}

impl Default for FetchConfig {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(30),
      max_attempts: 3,
      backoff: Duration::from_millis(500),
    }
  }
}

/// Everything the pipeline needs, passed explicitly to each stage.
#[derive(Clone, Debug)]
pub struct PortfolioConfig {
  pub tickers: Vec<String>,
  /// First trading date, inclusive.
  pub start: NaiveDate,
  /// Last trading date, exclusive.
  pub end: NaiveDate,
  pub trading_days: f64,
  pub risk_free: f64,
  pub num_portfolios: usize,
  pub sampling: SamplingScheme,
  /// Monte-Carlo seed, random when `None`.
  pub seed: Option<u64>,
  pub optimizer: OptimizerConfig,
  pub fetch: FetchConfig,
  /// Directory the HTML charts are written to.
  pub output_dir: PathBuf,
}

impl Default for PortfolioConfig {
  fn default() -> Self {
    Self {
      tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
      start: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or_default(),
      end: NaiveDate::from_ymd_opt(2025, 5, 27).unwrap_or_default(),
      trading_days: TRADING_DAYS_PER_YEAR,
      risk_free: 0.0,
      num_portfolios: DEFAULT_NUM_PORTFOLIOS,
      sampling: SamplingScheme::UniformNormalized,
      seed: None,
      optimizer: OptimizerConfig::default(),
      fetch: FetchConfig::default(),
      output_dir: PathBuf::from("target/mpt"),
    }
  }
}

impl PortfolioConfig {
  /// Defaults overridden by `MPT_*` variables from the environment or a `.env` file.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Defaults overridden by whatever `lookup` returns for the `MPT_*` keys.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let mut cfg = Self::default();

    if let Some(v) = lookup("MPT_TICKERS") {
      cfg.tickers = v
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    }
    if let Some(v) = lookup("MPT_START") {
      cfg.start = parse_date("MPT_START", &v)?;
    }
    if let Some(v) = lookup("MPT_END") {
      cfg.end = parse_date("MPT_END", &v)?;
    }
    if let Some(v) = lookup("MPT_NUM_PORTFOLIOS") {
      cfg.num_portfolios = parse("MPT_NUM_PORTFOLIOS", &v)?;
    }
    if let Some(v) = lookup("MPT_TRADING_DAYS") {
      cfg.trading_days = parse("MPT_TRADING_DAYS", &v)?;
    }
    if let Some(v) = lookup("MPT_RISK_FREE") {
      cfg.risk_free = parse("MPT_RISK_FREE", &v)?;
    }
    if let Some(v) = lookup("MPT_SEED") {
      cfg.seed = Some(parse("MPT_SEED", &v)?);
    }
    if let Some(v) = lookup("MPT_SAMPLING") {
      cfg.sampling = v.parse()?;
    }
    if let Some(v) = lookup("MPT_OUTPUT_DIR") {
      cfg.output_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("MPT_FETCH_TIMEOUT_SECS") {
      cfg.fetch.timeout = Duration::from_secs(parse("MPT_FETCH_TIMEOUT_SECS", &v)?);
    }
    if let Some(v) = lookup("MPT_FETCH_RETRIES") {
      cfg.fetch.max_attempts = parse("MPT_FETCH_RETRIES", &v)?;
    }

    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(&self) -> Result<()> {
    if self.tickers.is_empty() {
      return Err(PortfolioError::invalid("ticker list is empty"));
    }
    if self.start >= self.end {
      return Err(PortfolioError::invalid(format!(
        "start date {} must precede end date {}",
        self.start, self.end
      )));
    }
    if self.num_portfolios == 0 {
      return Err(PortfolioError::invalid("number of portfolios must be positive"));
    }
    if !(self.trading_days.is_finite() && self.trading_days > 0.0) {
      return Err(PortfolioError::invalid("trading days per year must be positive"));
    }
    if !self.risk_free.is_finite() {
      return Err(PortfolioError::invalid("risk-free rate must be finite"));
    }
    if self.fetch.max_attempts == 0 {
      return Err(PortfolioError::invalid("at least one fetch attempt is required"));
    }
    Ok(())
  }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T>
where
  T::Err: std::fmt::Display,
{
  value
    .trim()
    .parse()
    .map_err(|e| PortfolioError::invalid(format!("{key}={value}: {e}")))
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
    .map_err(|e| PortfolioError::invalid(format!("{key}={value}: {e}")))
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_match_the_reference_run() {
    let cfg = PortfolioConfig::default();
    assert_eq!(cfg.tickers, vec!["AAPL", "WMT", "TSLA", "GE", "AMZN", "DB"]);
    assert_eq!(cfg.start, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
    assert_eq!(cfg.end, NaiveDate::from_ymd_opt(2025, 5, 27).unwrap());
    assert_eq!(cfg.trading_days, 252.0);
    assert_eq!(cfg.num_portfolios, 10_000);
    assert!(cfg.validate().is_ok());
  }

  #[test]
  fn overrides_from_lookup() {
    let cfg = PortfolioConfig::from_lookup(lookup(&[
      ("MPT_TICKERS", "msft, nvda ,"),
      ("MPT_START", "2020-01-02"),
      ("MPT_NUM_PORTFOLIOS", "250"),
      ("MPT_SEED", "9"),
      ("MPT_SAMPLING", "dirichlet"),
      ("MPT_FETCH_TIMEOUT_SECS", "5"),
    ]))
    .unwrap();

    assert_eq!(cfg.tickers, vec!["MSFT", "NVDA"]);
    assert_eq!(cfg.start, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
    assert_eq!(cfg.num_portfolios, 250);
    assert_eq!(cfg.seed, Some(9));
    assert_eq!(cfg.sampling, SamplingScheme::Dirichlet);
    assert_eq!(cfg.fetch.timeout, Duration::from_secs(5));
  }

  #[test]
  fn rejects_bad_values() {
    assert!(PortfolioConfig::from_lookup(lookup(&[("MPT_NUM_PORTFOLIOS", "many")])).is_err());
    assert!(PortfolioConfig::from_lookup(lookup(&[("MPT_START", "2030-01-01")])).is_err());
    assert!(PortfolioConfig::from_lookup(lookup(&[("MPT_TICKERS", " , ")])).is_err());
    assert!(PortfolioConfig::from_lookup(lookup(&[("MPT_FETCH_RETRIES", "0")])).is_err());
  }
}
