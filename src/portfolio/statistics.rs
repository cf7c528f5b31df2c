//! # Portfolio Statistics
//!
//! $$
//! \mu_p = 252\,\bar{\mathbf r}^\top\mathbf w,\qquad
//! \sigma_p = \sqrt{\mathbf w^\top (252\,\Sigma)\,\mathbf w},\qquad
//! S = \frac{\mu_p - r_f}{\sigma_p}
//! $$
//!
//! Annualized expected return, volatility and Sharpe ratio of a weighting.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;

use super::data::ReturnsMatrix;
use super::types::PortfolioStats;
use super::types::WeightVector;
use crate::error::PortfolioError;
use crate::error::Result;

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Volatilities below this are treated as zero.
pub const MIN_VOLATILITY: f64 = 1e-12;

/// Annualized first and second moments of a returns matrix.
///
/// Moments are computed once in [`PortfolioStatistics::new`]; evaluating a
/// weighting is then a dot product and a quadratic form.
#[derive(Clone, Debug)]
pub struct PortfolioStatistics {
  tickers: Vec<String>,
  mean: Array1<f64>,
  cov: Array2<f64>,
  trading_days: f64,
  risk_free: f64,
}

impl PortfolioStatistics {
  /// Estimate annualized moments, sample covariance with `ddof = 1`.
  pub fn new(returns: &ReturnsMatrix, trading_days: f64, risk_free: f64) -> Result<Self> {
    if !(trading_days.is_finite() && trading_days > 0.0) {
      return Err(PortfolioError::invalid(format!(
        "trading days per year must be positive, got {trading_days}"
      )));
    }
    if !risk_free.is_finite() {
      return Err(PortfolioError::invalid(format!(
        "risk-free rate must be finite, got {risk_free}"
      )));
    }
    if returns.n_periods() < 2 {
      return Err(PortfolioError::invalid(
        "at least two return observations are needed for a sample covariance",
      ));
    }

    let values = returns.values();
    let mean = values
      .mean_axis(Axis(0))
      .ok_or_else(|| PortfolioError::invalid("returns matrix is empty"))?
      * trading_days;
    let cov = values
      .t()
      .cov(1.0)
      .map_err(|e| PortfolioError::invalid(e.to_string()))?
      * trading_days;

    Ok(Self {
      tickers: returns.tickers().to_vec(),
      mean,
      cov,
      trading_days,
      risk_free,
    })
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn n_assets(&self) -> usize {
    self.mean.len()
  }

  pub fn trading_days(&self) -> f64 {
    self.trading_days
  }

  pub fn risk_free(&self) -> f64 {
    self.risk_free
  }

  /// Annualized mean log-return of each asset.
  pub fn annualized_mean(&self) -> ArrayView1<'_, f64> {
    self.mean.view()
  }

  /// Annualized sample covariance matrix.
  pub fn annualized_covariance(&self) -> ArrayView2<'_, f64> {
    self.cov.view()
  }

  pub fn evaluate(&self, weights: &WeightVector) -> Result<PortfolioStats> {
    self.evaluate_raw(weights.view())
  }

  /// Evaluate any weighting of matching length, on the simplex or not.
  ///
  /// Fails with [`PortfolioError::DegenerateInput`] when the volatility is zero.
  pub fn evaluate_raw(&self, weights: ArrayView1<f64>) -> Result<PortfolioStats> {
    self.check_len(weights.len())?;

    let expected_return = self.mean.dot(&weights);
    let volatility = self.volatility(weights);
    if !(volatility > MIN_VOLATILITY) {
      return Err(PortfolioError::DegenerateInput(format!(
        "portfolio volatility is {volatility}, Sharpe ratio is undefined"
      )));
    }

    Ok(PortfolioStats::new(
      expected_return,
      volatility,
      (expected_return - self.risk_free) / volatility,
    ))
  }

  /// Gradient of the Sharpe ratio with respect to the weights.
  ///
  /// $$
  /// \nabla S = \frac{\mu}{\sigma_p} - \frac{(\mu_p - r_f)\,\Sigma\mathbf w}{\sigma_p^3}
  /// $$
  pub fn sharpe_gradient(&self, weights: ArrayView1<f64>) -> Result<Array1<f64>> {
    self.check_len(weights.len())?;

    let sigma_w = self.cov.dot(&weights);
    let volatility = weights.dot(&sigma_w).max(0.0).sqrt();
    if !(volatility > MIN_VOLATILITY) {
      return Err(PortfolioError::DegenerateInput(
        "Sharpe gradient is undefined at zero volatility".into(),
      ));
    }
    let excess = self.mean.dot(&weights) - self.risk_free;

    Ok(&self.mean / volatility - sigma_w * (excess / volatility.powi(3)))
  }

  fn volatility(&self, weights: ArrayView1<f64>) -> f64 {
    weights.dot(&self.cov.dot(&weights)).max(0.0).sqrt()
  }

  fn check_len(&self, len: usize) -> Result<()> {
    if len != self.n_assets() {
      return Err(PortfolioError::invalid(format!(
        "expected {} weights, got {len}",
        self.n_assets()
      )));
    }
    Ok(())
  }
}
