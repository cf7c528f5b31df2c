use approx::assert_abs_diff_eq;
use chrono::Datelike;
use chrono::NaiveDate;
use chrono::Weekday;
use mpt_rs::market::StaticSource;
use mpt_rs::portfolio::PricePoint;
use mpt_rs::portfolio::SamplingScheme;
use mpt_rs::PortfolioConfig;
use mpt_rs::PortfolioEngine;
use mpt_rs::PortfolioError;
use ndarray::Array2;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;

const TICKERS: [&str; 4] = ["AAA", "BBB", "CCC", "DDD"];

fn trading_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
  start
    .iter_days()
    .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
    .take(n)
    .collect()
}

/// Geometric random walks with per-asset drift.
fn synthetic_source(start: NaiveDate, n: usize) -> StaticSource {
  let mut rng = StdRng::seed_from_u64(2024);
  let shocks = Array2::random_using((n, TICKERS.len()), Normal::new(0.0, 0.012).unwrap(), &mut rng);
  let drift: [f64; 4] = [0.0008, 0.0004, 0.0011, 0.0006];
  let dates = trading_days(start, n);

  let mut source = StaticSource::new();
  for (j, ticker) in TICKERS.iter().enumerate() {
    let mut price = 50.0 + 10.0 * j as f64;
    let mut points = Vec::with_capacity(n);
    for (t, date) in dates.iter().enumerate() {
      price *= (drift[j] + shocks[[t, j]]).exp();
      points.push(PricePoint::new(*date, price));
    }
    source = source.with_history(ticker, points);
  }
  source
}

fn config(start: NaiveDate, end: NaiveDate) -> PortfolioConfig {
  PortfolioConfig {
    tickers: TICKERS.iter().map(|t| t.to_string()).collect(),
    start,
    end,
    num_portfolios: 3_000,
    seed: Some(17),
    ..PortfolioConfig::default()
  }
}

#[test]
fn full_pipeline_over_static_prices() {
  let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
  let end = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
  let source = synthetic_source(start, 500);

  let out = PortfolioEngine::new(config(start, end))
    .run(&source)
    .unwrap();

  assert_eq!(out.prices.n_assets(), 4);
  assert_eq!(out.returns.n_periods(), out.prices.n_dates() - 1);
  assert!(out.prices.dates().iter().all(|d| *d < end));
  assert_eq!(out.samples.len(), 3_000);

  let optimum = &out.optimum;
  let sum: f64 = optimum.weights.as_slice().iter().sum();
  assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
  assert!(optimum.weights.as_slice().iter().all(|&w| w >= 0.0));
  for s in &out.samples.stats {
    assert!(optimum.stats.sharpe >= s.sharpe - 1e-6);
  }
}

#[test]
fn dirichlet_sampling_runs_end_to_end() {
  let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
  let end = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
  let source = synthetic_source(start, 300);

  let cfg = PortfolioConfig {
    sampling: SamplingScheme::Dirichlet,
    num_portfolios: 500,
    ..config(start, end)
  };
  let out = PortfolioEngine::new(cfg).run(&source).unwrap();

  assert_eq!(out.samples.len(), 500);
  let (_, best) = out.samples.best_sharpe().unwrap();
  assert!(out.optimum.stats.sharpe >= best.sharpe - 1e-6);
}

#[test]
fn missing_ticker_is_a_data_fetch_error() {
  let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
  let end = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
  let source = synthetic_source(start, 50);

  let mut cfg = config(start, end);
  cfg.tickers.push("ZZZ".into());
  cfg.fetch.backoff = std::time::Duration::ZERO;

  let res = PortfolioEngine::new(cfg).run(&source);
  match res {
    Err(PortfolioError::DataFetch { ticker, .. }) => assert_eq!(ticker, "ZZZ"),
    other => panic!("expected a data fetch error, got {other:?}"),
  }
}

#[test]
fn empty_date_range_is_a_data_fetch_error() {
  let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
  let source = synthetic_source(start, 50);
  let later = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();

  let mut cfg = config(later, NaiveDate::from_ymd_opt(2031, 1, 1).unwrap());
  cfg.fetch.max_attempts = 1;

  assert!(matches!(
    PortfolioEngine::new(cfg).run(&source),
    Err(PortfolioError::DataFetch { .. })
  ));
}
