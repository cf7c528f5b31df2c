//! # Monte-Carlo Frontier
//!
//! $$
//! \mathbf w^{(k)} = \frac{\mathbf u^{(k)}}{\mathbf 1^\top \mathbf u^{(k)}},\qquad k = 1,\dots,K
//! $$
//!
//! Random long-only portfolios approximating the efficient frontier.

use std::str::FromStr;

use impl_new_derive::ImplNew;
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Exp1;
use rayon::prelude::*;
use tracing::debug;

use super::statistics::PortfolioStatistics;
use super::types::PortfolioStats;
use super::types::WeightVector;
use crate::error::PortfolioError;
use crate::error::Result;

/// How raw draws are turned into simplex weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SamplingScheme {
  /// Uniform(0, 1) draws divided by their sum. Biased towards the simplex
  /// centre for more than two assets.
  #[default]
  UniformNormalized,
  /// Unit exponential draws divided by their sum, i.e. flat Dirichlet.
  Dirichlet,
}

impl SamplingScheme {
  /// Draw one weight vector over `n` assets.
  pub fn draw<R: Rng>(self, n: usize, rng: &mut R) -> Result<WeightVector> {
    let raw: Vec<f64> = match self {
      Self::UniformNormalized => (0..n).map(|_| rng.gen::<f64>()).collect(),
      Self::Dirichlet => (0..n).map(|_| rng.sample::<f64, _>(Exp1)).collect(),
    };
    WeightVector::normalized(raw)
  }
}

impl FromStr for SamplingScheme {
  type Err = PortfolioError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "uniform" | "uniform-normalized" => Ok(Self::UniformNormalized),
      "dirichlet" | "flat-dirichlet" => Ok(Self::Dirichlet),
      other => Err(PortfolioError::invalid(format!(
        "unknown sampling scheme '{other}'"
      ))),
    }
  }
}

/// Sampled portfolios, `weights[k]` paired with `stats[k]`.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloResult {
  pub weights: Vec<WeightVector>,
  pub stats: Vec<PortfolioStats>,
}

impl MonteCarloResult {
  pub fn len(&self) -> usize {
    self.weights.len()
  }

  pub fn is_empty(&self) -> bool {
    self.weights.is_empty()
  }

  pub fn returns(&self) -> Vec<f64> {
    self.stats.iter().map(|s| s.expected_return).collect()
  }

  pub fn volatilities(&self) -> Vec<f64> {
    self.stats.iter().map(|s| s.volatility).collect()
  }

  pub fn sharpes(&self) -> Vec<f64> {
    self.stats.iter().map(|s| s.sharpe).collect()
  }

  /// Sample with the highest Sharpe ratio.
  pub fn best_sharpe(&self) -> Option<(&WeightVector, &PortfolioStats)> {
    self.argbest(|a, b| a.sharpe > b.sharpe)
  }

  /// Sample with the lowest volatility.
  pub fn min_volatility(&self) -> Option<(&WeightVector, &PortfolioStats)> {
    self.argbest(|a, b| a.volatility < b.volatility)
  }

  fn argbest(
    &self,
    better: impl Fn(&PortfolioStats, &PortfolioStats) -> bool,
  ) -> Option<(&WeightVector, &PortfolioStats)> {
    let mut best: Option<usize> = None;
    for (k, s) in self.stats.iter().enumerate() {
      if best.map_or(true, |b| better(s, &self.stats[b])) {
        best = Some(k);
      }
    }
    best.map(|k| (&self.weights[k], &self.stats[k]))
  }
}

/// Fixed-budget random portfolio sampler.
#[derive(ImplNew, Clone, Debug)]
pub struct MonteCarloSampler {
  /// Number of portfolios drawn.
  pub n_portfolios: usize,
  /// Weight sampling scheme.
  pub scheme: SamplingScheme,
  /// Base seed. Sample `k` uses a generator seeded with `seed + k`.
  pub seed: Option<u64>,
}

impl MonteCarloSampler {
  pub fn sample(&self, stats: &PortfolioStatistics) -> Result<MonteCarloResult> {
    self.sample_with_progress(stats, &ProgressBar::hidden())
  }

  /// Draw and evaluate the portfolios in parallel, ticking `progress` once per sample.
  ///
  /// Results are in sample order and depend only on the seed.
  pub fn sample_with_progress(
    &self,
    stats: &PortfolioStatistics,
    progress: &ProgressBar,
  ) -> Result<MonteCarloResult> {
    if self.n_portfolios == 0 {
      return Err(PortfolioError::invalid("number of portfolios must be positive"));
    }

    let n_assets = stats.n_assets();
    let seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let scheme = self.scheme;

    let samples = (0..self.n_portfolios)
      .into_par_iter()
      .map(|k| {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(k as u64));
        let w = scheme.draw(n_assets, &mut rng)?;
        let s = stats.evaluate(&w)?;
        progress.inc(1);
        Ok((w, s))
      })
      .collect::<Result<Vec<_>>>()?;
    progress.finish_and_clear();

    let (weights, stats): (Vec<_>, Vec<_>) = samples.into_iter().unzip();
    debug!(n = weights.len(), seed, ?scheme, "sampled random portfolios");

    Ok(MonteCarloResult { weights, stats })
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;
  use crate::portfolio::data::ReturnsMatrix;
  use crate::portfolio::types::WEIGHT_SUM_TOLERANCE;

  fn stats() -> PortfolioStatistics {
    let returns = ReturnsMatrix::from_array(array![
      [0.010, -0.004, 0.002, 0.003],
      [-0.003, 0.006, 0.001, -0.002],
      [0.007, 0.001, -0.002, 0.004],
      [0.002, -0.005, 0.004, 0.001],
      [-0.001, 0.003, 0.000, -0.003],
      [0.004, 0.002, 0.003, 0.002]
    ])
    .unwrap();
    PortfolioStatistics::new(&returns, 252.0, 0.0).unwrap()
  }

  #[test]
  fn samples_lie_on_the_simplex() {
    let stats = stats();
    for scheme in [SamplingScheme::UniformNormalized, SamplingScheme::Dirichlet] {
      let res = MonteCarloSampler::new(2_000, scheme, Some(7))
        .sample(&stats)
        .unwrap();

      assert_eq!(res.len(), 2_000);
      assert_eq!(res.stats.len(), 2_000);
      for w in &res.weights {
        assert_eq!(w.len(), 4);
        let sum: f64 = w.as_slice().iter().sum();
        assert!((sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
        assert!(w.as_slice().iter().all(|&x| x >= 0.0));
      }
    }
  }

  #[test]
  fn fixed_seed_is_reproducible() {
    let stats = stats();
    let sampler = MonteCarloSampler::new(500, SamplingScheme::UniformNormalized, Some(42));
    let a = sampler.sample(&stats).unwrap();
    let b = sampler.sample(&stats).unwrap();

    assert_eq!(a.weights, b.weights);
    assert_eq!(a.sharpes(), b.sharpes());
  }

  #[test]
  fn stats_match_their_weights() {
    let stats = stats();
    let res = MonteCarloSampler::new(50, SamplingScheme::Dirichlet, Some(1))
      .sample(&stats)
      .unwrap();
    for (w, s) in res.weights.iter().zip(&res.stats) {
      assert_eq!(stats.evaluate(w).unwrap(), *s);
    }
  }

  #[test]
  fn best_sharpe_is_the_maximum() {
    let res = MonteCarloSampler::new(300, SamplingScheme::UniformNormalized, Some(3))
      .sample(&stats())
      .unwrap();
    let (_, best) = res.best_sharpe().unwrap();
    assert!(res.sharpes().iter().all(|&s| s <= best.sharpe));
    let (_, min_vol) = res.min_volatility().unwrap();
    assert!(res.volatilities().iter().all(|&v| v >= min_vol.volatility));
  }

  #[test]
  fn zero_portfolios_is_rejected() {
    let res = MonteCarloSampler::new(0, SamplingScheme::default(), None).sample(&stats());
    assert!(matches!(res, Err(PortfolioError::InvalidInput(_))));
  }

  #[test]
  fn parses_scheme_names() {
    assert_eq!("Dirichlet".parse::<SamplingScheme>().unwrap(), SamplingScheme::Dirichlet);
    assert_eq!("uniform".parse::<SamplingScheme>().unwrap(), SamplingScheme::UniformNormalized);
    assert!("sobol".parse::<SamplingScheme>().is_err());
  }
}
