//! # Portfolio Engine
//!
//! $$
//! P \xrightarrow{\ln} R \to (\hat\mu, \hat\Sigma) \to \{\mathbf w^{(k)}\}_{k\le K},\ \mathbf w^\*
//! $$
//!
//! End-to-end orchestration: fetch, returns, statistics, sampling, optimization.

use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use tracing::info;

use crate::config::PortfolioConfig;
use crate::error::Result;
use crate::market::download_prices;
use crate::market::PriceSource;
use crate::portfolio::MonteCarloResult;
use crate::portfolio::MonteCarloSampler;
use crate::portfolio::OptimalPortfolio;
use crate::portfolio::OptimizationReport;
use crate::portfolio::PortfolioStatistics;
use crate::portfolio::PriceMatrix;
use crate::portfolio::ReturnsMatrix;
use crate::portfolio::SharpeOptimizer;

/// Everything a run produces.
#[derive(Clone, Debug)]
pub struct EngineOutput {
  pub prices: PriceMatrix,
  pub returns: ReturnsMatrix,
  pub statistics: PortfolioStatistics,
  pub samples: MonteCarloResult,
  /// Raw solver report, kept for its termination message.
  pub report: OptimizationReport,
  pub optimum: OptimalPortfolio,
}

/// Runs the pipeline for one [`PortfolioConfig`].
#[derive(Clone, Debug)]
pub struct PortfolioEngine {
  config: PortfolioConfig,
  show_progress: bool,
}

impl PortfolioEngine {
  pub fn new(config: PortfolioConfig) -> Self {
    Self {
      config,
      show_progress: false,
    }
  }

  /// Draw a progress bar on stderr while sampling.
  pub fn with_progress(mut self, show: bool) -> Self {
    self.show_progress = show;
    self
  }

  pub fn config(&self) -> &PortfolioConfig {
    &self.config
  }

  /// Fetch prices from `source`, then [`PortfolioEngine::analyze`] them.
  pub fn run<S: PriceSource + ?Sized>(&self, source: &S) -> Result<EngineOutput> {
    self.config.validate()?;
    let prices = download_prices(source, &self.config)?;
    self.analyze(prices)
  }

  /// Everything after the fetch. Fails on a non-converged optimization.
  pub fn analyze(&self, prices: PriceMatrix) -> Result<EngineOutput> {
    self.config.validate()?;
    let returns = prices.log_returns()?;
    let statistics =
      PortfolioStatistics::new(&returns, self.config.trading_days, self.config.risk_free)?;
    info!(
      periods = returns.n_periods(),
      assets = returns.n_assets(),
      "computed log-returns"
    );

    let sampler = MonteCarloSampler::new(
      self.config.num_portfolios,
      self.config.sampling,
      self.config.seed,
    );
    let samples = sampler.sample_with_progress(&statistics, &self.progress_bar())?;
    if let Some((_, best)) = samples.best_sharpe() {
      info!(n = samples.len(), best_sharpe = best.sharpe, "sampled portfolios");
    }

    let report = SharpeOptimizer::new(&statistics, self.config.optimizer.clone())
      .optimize(&samples.weights[0])?;
    let optimum = report.clone().into_optimum()?;

    Ok(EngineOutput {
      prices,
      returns,
      statistics,
      samples,
      report,
      optimum,
    })
  }

  fn progress_bar(&self) -> ProgressBar {
    if !self.show_progress {
      return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(self.config.num_portfolios as u64);
    let style = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})")
      .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message("sampling portfolios");
    bar
  }
}
