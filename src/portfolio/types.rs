//! # Portfolio Types
//!
//! $$
//! \mathbf{w}\in\Delta^{N-1}=\{\mathbf{w}:w_i\ge 0,\ \textstyle\sum_i w_i=1\}
//! $$
//!
//! Weight vectors and the statistics derived from them.

use impl_new_derive::ImplNew;
use ndarray::ArrayView1;

use crate::error::PortfolioError;
use crate::error::Result;

/// Tolerance on `sum(w) == 1`.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Long-only, fully invested portfolio weights.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
  /// Validate and wrap a weight vector.
  pub fn new(weights: Vec<f64>) -> Result<Self> {
    if weights.is_empty() {
      return Err(PortfolioError::invalid("weight vector is empty"));
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
      return Err(PortfolioError::invalid(format!(
        "weights must be finite and non-negative, got {w}"
      )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(PortfolioError::invalid(format!(
        "weights must sum to 1, got {sum}"
      )));
    }

    Ok(Self(weights))
  }

  /// Divide non-negative raw draws by their sum.
  pub fn normalized(raw: Vec<f64>) -> Result<Self> {
    if raw.iter().any(|w| !w.is_finite() || *w < 0.0) {
      return Err(PortfolioError::invalid(
        "raw weights must be finite and non-negative",
      ));
    }
    let sum: f64 = raw.iter().sum();
    if sum <= 0.0 {
      return Err(PortfolioError::invalid("raw weights sum to zero"));
    }

    Self::new(raw.into_iter().map(|w| w / sum).collect())
  }

  /// `1/n` in every asset.
  pub fn equal(n: usize) -> Result<Self> {
    if n == 0 {
      return Err(PortfolioError::invalid("cannot build weights for zero assets"));
    }
    Ok(Self(vec![1.0 / n as f64; n]))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn view(&self) -> ArrayView1<'_, f64> {
    ArrayView1::from(self.0.as_slice())
  }

  pub fn as_slice(&self) -> &[f64] {
    &self.0
  }

  pub fn to_vec(&self) -> Vec<f64> {
    self.0.clone()
  }

  /// Weights rounded to `decimals` places. The result need not sum to one.
  pub fn rounded(&self, decimals: i32) -> Vec<f64> {
    let scale = 10f64.powi(decimals);
    self.0.iter().map(|w| (w * scale).round() / scale).collect()
  }

  /// Reorder the weights, `order[i]` being the source index of the i-th output.
  pub fn permuted(&self, order: &[usize]) -> Result<Self> {
    if order.len() != self.len() || order.iter().any(|&i| i >= self.len()) {
      return Err(PortfolioError::invalid("invalid permutation"));
    }
    Self::new(order.iter().map(|&i| self.0[i]).collect())
  }
}

impl AsRef<[f64]> for WeightVector {
  fn as_ref(&self) -> &[f64] {
    self.as_slice()
  }
}

/// Annualized statistics of a portfolio.
#[derive(ImplNew, Clone, Copy, Debug, Default, PartialEq)]
pub struct PortfolioStats {
  /// Annualized expected return.
  pub expected_return: f64,
  /// Annualized volatility.
  pub volatility: f64,
  /// `(expected_return - risk_free) / volatility`.
  pub sharpe: f64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_weights_not_on_the_simplex() {
    assert!(WeightVector::new(vec![0.5, 0.6]).is_err());
    assert!(WeightVector::new(vec![1.5, -0.5]).is_err());
    assert!(WeightVector::new(Vec::<f64>::new()).is_err());
    assert!(WeightVector::new(vec![0.25, 0.75]).is_ok());
  }

  #[test]
  fn normalized_divides_by_the_sum() {
    let w = WeightVector::normalized(vec![1.0, 3.0]).unwrap();
    assert_eq!(w.to_vec(), vec![0.25, 0.75]);
    assert!(WeightVector::normalized(vec![0.0, 0.0]).is_err());
  }

  #[test]
  fn rounding_keeps_three_decimals() {
    let w = WeightVector::normalized(vec![1.0, 1.0, 1.0]).unwrap();
    assert_eq!(w.rounded(3), vec![0.333, 0.333, 0.333]);
  }
}
