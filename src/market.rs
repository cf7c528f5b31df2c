//! # Market Data
//!
//! Closing price retrieval behind [`PriceSource`], with retries, and assembly
//! of the per-ticker histories into a [`PriceMatrix`].

use std::collections::HashMap;
use std::thread;

use chrono::NaiveDate;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::FetchConfig;
use crate::config::PortfolioConfig;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::portfolio::PriceMatrix;
use crate::portfolio::PricePoint;

#[cfg(feature = "yahoo")]
pub mod yahoo;

/// Daily closing prices for a ticker over `[start, end)`.
pub trait PriceSource {
  /// Ordered closes, or [`PortfolioError::DataFetch`] when nothing could be retrieved.
  fn close_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
    -> Result<Vec<PricePoint>>;
}

/// Pre-loaded histories, e.g. from a file or a test fixture.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
  histories: HashMap<String, Vec<PricePoint>>,
}

impl StaticSource {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_history(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
    self.histories.insert(ticker.to_string(), points);
    self
  }
}

impl PriceSource for StaticSource {
  fn close_history(
    &self,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<PricePoint>> {
    let points = self
      .histories
      .get(ticker)
      .ok_or_else(|| PortfolioError::data_fetch(ticker, "unknown ticker"))?;
    let mut in_range: Vec<PricePoint> = points
      .iter()
      .filter(|p| p.date >= start && p.date < end)
      .copied()
      .collect();
    if in_range.is_empty() {
      return Err(PortfolioError::data_fetch(
        ticker,
        format!("no prices between {start} and {end}"),
      ));
    }
    in_range.sort_by_key(|p| p.date);
    Ok(in_range)
  }
}

/// Fetch one ticker, retrying with linear backoff.
pub fn fetch_with_retry<S: PriceSource + ?Sized>(
  source: &S,
  ticker: &str,
  start: NaiveDate,
  end: NaiveDate,
  cfg: &FetchConfig,
) -> Result<Vec<PricePoint>> {
  let mut last_error = None;

  for attempt in 1..=cfg.max_attempts {
    let result = source.close_history(ticker, start, end).and_then(|points| {
      if points.is_empty() {
        Err(PortfolioError::data_fetch(ticker, "empty price history"))
      } else {
        Ok(points)
      }
    });

    match result {
      Ok(points) => {
        if attempt > 1 {
          info!(ticker, attempt, "fetched prices after retry");
        }
        return Ok(points);
      }
      Err(e) => {
        if attempt < cfg.max_attempts {
          let delay = cfg.backoff * attempt;
          warn!(
            ticker,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %e,
            "failed to fetch prices, retrying after delay"
          );
          thread::sleep(delay);
        }
        last_error = Some(e);
      }
    }
  }

  let err = last_error
    .unwrap_or_else(|| PortfolioError::data_fetch(ticker, "no fetch attempt was made"));
  error!(ticker, attempts = cfg.max_attempts, error = %err, "failed to fetch prices after all retries");
  Err(err)
}

/// Fetch every configured ticker and align them on common trading dates.
pub fn download_prices<S: PriceSource + ?Sized>(
  source: &S,
  cfg: &PortfolioConfig,
) -> Result<PriceMatrix> {
  let mut histories = Vec::with_capacity(cfg.tickers.len());
  for ticker in &cfg.tickers {
    let points = fetch_with_retry(source, ticker, cfg.start, cfg.end, &cfg.fetch)?;
    info!(ticker = %ticker, n = points.len(), "fetched closing prices");
    histories.push((ticker.clone(), points));
  }

  let prices = PriceMatrix::from_histories(&histories)?;
  info!(
    dates = prices.n_dates(),
    assets = prices.n_assets(),
    "assembled price matrix"
  );
  Ok(prices)
}
