//! # Portfolio Data
//!
//! $$
//! r_{t,i} = \ln\frac{P_{t,i}}{P_{t-1,i}}
//! $$
//!
//! Price and log-return matrices, plus the alignment of per-ticker histories
//! onto a common trading calendar.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use ndarray::s;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;
use tracing::debug;
use tracing::warn;

use crate::error::PortfolioError;
use crate::error::Result;

/// Single daily close.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PricePoint {
  pub date: NaiveDate,
  pub close: f64,
}

impl PricePoint {
  pub fn new(date: NaiveDate, close: f64) -> Self {
    Self { date, close }
  }
}

/// Closing prices, one row per trading date and one column per asset.
#[derive(Clone, Debug)]
pub struct PriceMatrix {
  tickers: Vec<String>,
  dates: Vec<NaiveDate>,
  prices: Array2<f64>,
}

impl PriceMatrix {
  /// Validate and wrap a `dates x tickers` price table.
  pub fn new(tickers: Vec<String>, dates: Vec<NaiveDate>, prices: Array2<f64>) -> Result<Self> {
    if tickers.is_empty() || dates.is_empty() {
      return Err(PortfolioError::invalid("price matrix needs at least one asset and one date"));
    }
    if prices.dim() != (dates.len(), tickers.len()) {
      return Err(PortfolioError::invalid(format!(
        "price matrix shape {:?} does not match {} dates x {} tickers",
        prices.dim(),
        dates.len(),
        tickers.len()
      )));
    }
    if dates.windows(2).any(|d| d[0] >= d[1]) {
      return Err(PortfolioError::invalid("dates must be strictly increasing"));
    }
    if let Some(p) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
      return Err(PortfolioError::invalid(format!(
        "prices must be finite and positive, got {p}"
      )));
    }

    Ok(Self {
      tickers,
      dates,
      prices,
    })
  }

  /// Join per-ticker histories on the dates every ticker has a quote for.
  ///
  /// Non-positive or non-finite closes are dropped before the join.
  pub fn from_histories(histories: &[(String, Vec<PricePoint>)]) -> Result<Self> {
    if histories.is_empty() {
      return Err(PortfolioError::invalid("no price histories supplied"));
    }

    let mut series = Vec::with_capacity(histories.len());
    for (ticker, points) in histories {
      let mut by_date = BTreeMap::new();
      let mut dropped = 0usize;
      for p in points {
        if p.close.is_finite() && p.close > 0.0 {
          by_date.insert(p.date, p.close);
        } else {
          dropped += 1;
        }
      }
      if dropped > 0 {
        warn!(ticker = %ticker, dropped, "dropped invalid closing prices");
      }
      if by_date.is_empty() {
        return Err(PortfolioError::invalid(format!("no usable prices for {ticker}")));
      }
      series.push(by_date);
    }

    let mut common: BTreeSet<NaiveDate> = series[0].keys().copied().collect();
    for s in &series[1..] {
      common.retain(|d| s.contains_key(d));
    }
    if common.is_empty() {
      return Err(PortfolioError::invalid("price histories share no trading dates"));
    }

    let longest = series.iter().map(BTreeMap::len).max().unwrap_or(0);
    if longest > common.len() {
      debug!(
        kept = common.len(),
        dropped = longest - common.len(),
        "aligned histories on common dates"
      );
    }

    let dates: Vec<NaiveDate> = common.into_iter().collect();
    let mut prices = Array2::zeros((dates.len(), series.len()));
    for (j, s) in series.iter().enumerate() {
      for (t, d) in dates.iter().enumerate() {
        prices[[t, j]] = s[d];
      }
    }

    let tickers = histories.iter().map(|(t, _)| t.clone()).collect();
    Self::new(tickers, dates, prices)
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn values(&self) -> ArrayView2<'_, f64> {
    self.prices.view()
  }

  pub fn column(&self, idx: usize) -> ArrayView1<'_, f64> {
    self.prices.column(idx)
  }

  pub fn n_dates(&self) -> usize {
    self.dates.len()
  }

  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }

  /// Log-returns of every column.
  pub fn log_returns(&self) -> Result<ReturnsMatrix> {
    log_returns(self)
  }
}

/// Log-returns, one row per trading date after the first.
#[derive(Clone, Debug)]
pub struct ReturnsMatrix {
  tickers: Vec<String>,
  dates: Vec<NaiveDate>,
  values: Array2<f64>,
}

impl ReturnsMatrix {
  /// Validate and wrap a `dates x tickers` returns table.
  pub fn new(tickers: Vec<String>, dates: Vec<NaiveDate>, values: Array2<f64>) -> Result<Self> {
    if values.dim() != (dates.len(), tickers.len()) {
      return Err(PortfolioError::invalid(format!(
        "returns shape {:?} does not match {} dates x {} tickers",
        values.dim(),
        dates.len(),
        tickers.len()
      )));
    }
    if tickers.is_empty() || dates.is_empty() {
      return Err(PortfolioError::invalid("returns matrix is empty"));
    }
    if values.iter().any(|r| !r.is_finite()) {
      return Err(PortfolioError::invalid("returns must be finite"));
    }

    Ok(Self {
      tickers,
      dates,
      values,
    })
  }

  /// Returns without calendar information, assets named `asset_0..`.
  pub fn from_array(values: Array2<f64>) -> Result<Self> {
    let (rows, cols) = values.dim();
    let tickers = (0..cols).map(|i| format!("asset_{i}")).collect();
    let epoch = NaiveDate::default();
    let dates = (0..rows)
      .map(|i| epoch + chrono::Days::new(i as u64))
      .collect();
    Self::new(tickers, dates, values)
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn values(&self) -> ArrayView2<'_, f64> {
    self.values.view()
  }

  pub fn column(&self, idx: usize) -> ArrayView1<'_, f64> {
    self.values.column(idx)
  }

  pub fn n_periods(&self) -> usize {
    self.values.nrows()
  }

  pub fn n_assets(&self) -> usize {
    self.values.ncols()
  }

  /// Reorder the asset columns, `order[i]` being the source column of output column `i`.
  pub fn select_assets(&self, order: &[usize]) -> Result<Self> {
    if order.iter().any(|&i| i >= self.n_assets()) {
      return Err(PortfolioError::invalid("asset index out of range"));
    }
    Self::new(
      order.iter().map(|&i| self.tickers[i].clone()).collect(),
      self.dates.clone(),
      self.values.select(Axis(1), order),
    )
  }
}

/// Convert a price matrix into log-returns, dropping the first row.
pub fn log_returns(prices: &PriceMatrix) -> Result<ReturnsMatrix> {
  if prices.n_dates() < 2 {
    return Err(PortfolioError::invalid(
      "at least two trading dates are needed to compute returns",
    ));
  }

  let p = prices.values();
  let mut values = &p.slice(s![1.., ..]) / &p.slice(s![..-1, ..]);
  values.mapv_inplace(f64::ln);

  ReturnsMatrix::new(
    prices.tickers.clone(),
    prices.dates[1..].to_vec(),
    values,
  )
}
