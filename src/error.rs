//! # Errors
//!
//! Error kinds surfaced by the portfolio pipeline.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PortfolioError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
  /// Market data could not be retrieved for a ticker.
  #[error("failed to fetch data for {ticker}: {message}")]
  DataFetch { ticker: String, message: String },

  /// Zero-variance portfolio, the Sharpe ratio is undefined.
  #[error("degenerate input: {0}")]
  DegenerateInput(String),

  /// The solver did not report success.
  #[error("optimization failed: {0}")]
  OptimizationFailure(String),

  /// Malformed matrix, weight vector or configuration.
  #[error("invalid input: {0}")]
  InvalidInput(String),
}

impl PortfolioError {
  pub(crate) fn data_fetch(ticker: &str, message: impl Into<String>) -> Self {
    Self::DataFetch {
      ticker: ticker.to_string(),
      message: message.into(),
    }
  }

  pub(crate) fn invalid(message: impl Into<String>) -> Self {
    Self::InvalidInput(message.into())
  }
}
