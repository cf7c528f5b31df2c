use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use mpt_rs::portfolio::MonteCarloSampler;
use mpt_rs::portfolio::OptimizerConfig;
use mpt_rs::portfolio::PortfolioStatistics;
use mpt_rs::portfolio::ReturnsMatrix;
use mpt_rs::portfolio::SamplingScheme;
use mpt_rs::portfolio::SharpeOptimizer;
use ndarray::Array2;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;

fn statistics(n_assets: usize) -> PortfolioStatistics {
  let mut rng = StdRng::seed_from_u64(1);
  let values = Array2::random_using((1_850, n_assets), Normal::new(0.0005, 0.015).unwrap(), &mut rng);
  let returns = ReturnsMatrix::from_array(values).unwrap();
  PortfolioStatistics::new(&returns, 252.0, 0.0).unwrap()
}

fn bench_sampler(c: &mut Criterion) {
  let mut group = c.benchmark_group("MonteCarlo");

  for n_assets in [6, 30] {
    let stats = statistics(n_assets);
    for scheme in [SamplingScheme::UniformNormalized, SamplingScheme::Dirichlet] {
      let sampler = MonteCarloSampler::new(10_000, scheme, Some(7));
      group.bench_with_input(
        BenchmarkId::new(format!("{scheme:?}"), n_assets),
        &stats,
        |b, stats| b.iter(|| black_box(sampler.sample(stats).unwrap())),
      );
    }
  }

  group.finish();
}

fn bench_optimizer(c: &mut Criterion) {
  let stats = statistics(6);
  let initial = MonteCarloSampler::new(1, SamplingScheme::UniformNormalized, Some(7))
    .sample(&stats)
    .unwrap()
    .weights
    .remove(0);

  c.bench_function("SharpeOptimizer/6", |b| {
    b.iter(|| {
      black_box(
        SharpeOptimizer::new(&stats, OptimizerConfig::default())
          .optimize(&initial)
          .unwrap(),
      )
    })
  });
}

criterion_group!(benches, bench_sampler, bench_optimizer);
criterion_main!(benches);
