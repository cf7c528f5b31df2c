use std::fs;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use mpt_rs::logging::init_logging;
use mpt_rs::market::yahoo::YahooSource;
use mpt_rs::report::covariance_table;
use mpt_rs::report::stats_table;
use mpt_rs::report::weights_table;
use mpt_rs::visualization::frontier_chart;
use mpt_rs::visualization::optimum_chart;
use mpt_rs::visualization::price_chart;
use mpt_rs::PortfolioConfig;
use mpt_rs::PortfolioEngine;
use ndarray::ArrayView1;
use plotly::Plot;
use tracing::info;

fn write_chart(plot: &Plot, dir: &Path, name: &str) {
  let path = dir.join(name);
  plot.write_html(&path);
  info!(path = %path.display(), "wrote chart");
}

fn main() -> Result<()> {
  init_logging();

  let config = PortfolioConfig::from_env().context("invalid configuration")?;
  let source = YahooSource::new(config.fetch.timeout).context("failed to set up market data client")?;
  let out = PortfolioEngine::new(config.clone())
    .with_progress(true)
    .run(&source)
    .context("portfolio pipeline failed")?;

  fs::create_dir_all(&config.output_dir)
    .with_context(|| format!("cannot create {}", config.output_dir.display()))?;
  write_chart(&price_chart(&out.prices), &config.output_dir, "prices.html");
  write_chart(&frontier_chart(&out.samples), &config.output_dir, "frontier.html");

  println!("Annualized covariance of the log-returns:");
  covariance_table(&out.statistics).printstd();

  let rounded = out.optimum.weights.rounded(3);
  let rounded_stats = out
    .statistics
    .evaluate_raw(ArrayView1::from(rounded.as_slice()))
    .context("cannot evaluate the rounded optimal weights")?;

  println!("Optimal portfolio ({}):", out.report.message);
  weights_table(out.statistics.tickers(), &rounded).printstd();
  println!("Expected return, volatility and Sharpe ratio:");
  stats_table(&rounded_stats).printstd();

  write_chart(
    &optimum_chart(&out.samples, &out.optimum.stats),
    &config.output_dir,
    "optimum.html",
  );

  Ok(())
}
