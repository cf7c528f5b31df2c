//! # Report
//!
//! Console tables for the covariance matrix and for individual portfolios.

use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;

use crate::portfolio::PortfolioStatistics;
use crate::portfolio::PortfolioStats;

/// Annualized covariance matrix with tickers as row and column headers.
pub fn covariance_table(stats: &PortfolioStatistics) -> Table {
  let cov = stats.annualized_covariance();
  let mut table = Table::new();

  let mut header = vec![Cell::new("")];
  header.extend(stats.tickers().iter().map(|t| Cell::new(t)));
  table.set_titles(Row::new(header));

  for (i, ticker) in stats.tickers().iter().enumerate() {
    let mut cells = vec![Cell::new(ticker)];
    cells.extend(cov.row(i).iter().map(|v| Cell::new(&format!("{v:.6}"))));
    table.add_row(Row::new(cells));
  }

  table
}

/// Expected return, volatility and Sharpe ratio as a single-row table.
pub fn stats_table(stats: &PortfolioStats) -> Table {
  let mut table = Table::new();
  table.set_titles(Row::new(vec![
    Cell::new("Expected return"),
    Cell::new("Volatility"),
    Cell::new("Sharpe ratio"),
  ]));
  table.add_row(Row::new(vec![
    Cell::new(&format!("{:.6}", stats.expected_return)),
    Cell::new(&format!("{:.6}", stats.volatility)),
    Cell::new(&format!("{:.6}", stats.sharpe)),
  ]));
  table
}

/// Ticker and weight per row.
pub fn weights_table(tickers: &[String], weights: &[f64]) -> Table {
  let mut table = Table::new();
  table.set_titles(Row::new(vec![Cell::new("Ticker"), Cell::new("Weight")]));
  for (ticker, w) in tickers.iter().zip(weights) {
    table.add_row(Row::new(vec![
      Cell::new(ticker),
      Cell::new(&format!("{w:.3}")),
    ]));
  }
  table
}
