//! # Sharpe Optimizer
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}\in\Delta^{N-1}} \frac{\mu_p(\mathbf w)-r_f}{\sigma_p(\mathbf w)}
//! $$
//!
//! Long-only maximum Sharpe portfolio. A Nelder-Mead search over
//! softmax-parameterized weights is followed by projected-gradient ascent on
//! the simplex, which can reach weights of exactly zero.

use std::cmp::Ordering;

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::State;
use argmin::core::TerminationReason;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use ndarray::ArrayView1;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::statistics::PortfolioStatistics;
use super::types::PortfolioStats;
use super::types::WeightVector;
use crate::error::PortfolioError;
use crate::error::Result;

/// Sufficient-increase constant of the Armijo rule.
const ARMIJO: f64 = 1e-4;

/// Scalar function of portfolio weights.
pub trait Objective {
  fn value(&self, weights: ArrayView1<f64>) -> Result<f64>;
}

/// Sharpe ratio of a weighting.
#[derive(Clone, Debug)]
pub struct SharpeObjective {
  stats: PortfolioStatistics,
}

impl SharpeObjective {
  pub fn new(stats: PortfolioStatistics) -> Self {
    Self { stats }
  }
}

impl Objective for SharpeObjective {
  fn value(&self, weights: ArrayView1<f64>) -> Result<f64> {
    Ok(self.stats.evaluate_raw(weights)?.sharpe)
  }
}

/// Maximizes the wrapped objective with a minimizing solver.
#[derive(Clone, Debug)]
pub struct Maximize<O>(pub O);

impl<O: Objective> Objective for Maximize<O> {
  fn value(&self, weights: ArrayView1<f64>) -> Result<f64> {
    Ok(-self.0.value(weights)?)
  }
}

/// Objective seen through `w = softmax(x)`, so every solver iterate is long-only
/// and fully invested. Zero-volatility iterates cost `+inf`.
struct SoftmaxCost<O> {
  objective: O,
}

impl<O: Objective> CostFunction for SoftmaxCost<O> {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let w = softmax(x);
    match self.objective.value(ArrayView1::from(w.as_slice())) {
      Ok(value) => Ok(value),
      Err(PortfolioError::DegenerateInput(_)) => Ok(f64::INFINITY),
      Err(e) => Err(e.into()),
    }
  }
}

fn softmax(x: &[f64]) -> Vec<f64> {
  if x.is_empty() {
    return Vec::new();
  }

  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let sum: f64 = exps.iter().sum();

  if sum < 1e-15 {
    vec![1.0 / x.len() as f64; x.len()]
  } else {
    exps.iter().map(|&e| e / sum).collect()
  }
}

/// Euclidean projection onto `{w : w_i >= 0, sum(w) = 1}` (Duchi et al., 2008).
pub fn project_onto_simplex(v: ArrayView1<f64>) -> Array1<f64> {
  let mut u = v.to_vec();
  u.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

  let mut cumsum = 0.0;
  let mut theta = 0.0;
  for (j, &uj) in u.iter().enumerate() {
    cumsum += uj;
    let t = (cumsum - 1.0) / (j + 1) as f64;
    if uj - t > 0.0 {
      theta = t;
    }
  }

  v.mapv(|x| (x - theta).max(0.0))
}

/// Solver budgets and tolerances.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
  /// Nelder-Mead iteration budget.
  pub max_iters: u64,
  /// Nelder-Mead stops once the simplex cost spread falls below this.
  pub sd_tolerance: f64,
  /// Projected-gradient iteration budget.
  pub max_refine_iters: usize,
  /// Projected-gradient stops once no weight moves by more than this.
  pub tolerance: f64,
}

impl Default for OptimizerConfig {
  fn default() -> Self {
    Self {
      max_iters: 5_000,
      sd_tolerance: 1e-10,
      max_refine_iters: 10_000,
      tolerance: 1e-10,
    }
  }
}

/// Outcome of a solver run, whether or not it converged.
#[derive(Clone, Debug)]
pub struct OptimizationReport {
  /// Final weights.
  pub weights: WeightVector,
  /// Statistics of `weights`.
  pub stats: PortfolioStats,
  /// Whether the refinement reached its tolerance.
  pub success: bool,
  /// Human readable termination summary.
  pub message: String,
  /// Minimized objective, i.e. the negated Sharpe ratio.
  pub objective: f64,
  /// Nelder-Mead iterations.
  pub iterations: u64,
  /// Projected-gradient iterations.
  pub refine_iterations: usize,
}

/// Converged optimizer output.
#[derive(Clone, Debug)]
pub struct OptimalPortfolio {
  pub weights: WeightVector,
  pub stats: PortfolioStats,
}

impl OptimizationReport {
  /// Fail with [`PortfolioError::OptimizationFailure`] unless the run converged.
  pub fn into_optimum(self) -> Result<OptimalPortfolio> {
    if !self.success {
      return Err(PortfolioError::OptimizationFailure(self.message));
    }
    Ok(OptimalPortfolio {
      weights: self.weights,
      stats: self.stats,
    })
  }
}

/// Maximum Sharpe ratio search over the long-only simplex.
#[derive(Clone, Debug)]
pub struct SharpeOptimizer<'a> {
  stats: &'a PortfolioStatistics,
  config: OptimizerConfig,
}

impl<'a> SharpeOptimizer<'a> {
  pub fn new(stats: &'a PortfolioStatistics, config: OptimizerConfig) -> Self {
    Self { stats, config }
  }

  pub fn config(&self) -> &OptimizerConfig {
    &self.config
  }

  /// Search from `initial`. Local optimum only.
  ///
  /// Objective errors such as [`PortfolioError::DegenerateInput`] are returned
  /// as is; non-convergence is reported through [`OptimizationReport::success`].
  pub fn optimize(&self, initial: &WeightVector) -> Result<OptimizationReport> {
    let n = self.stats.n_assets();
    if initial.len() != n {
      return Err(PortfolioError::invalid(format!(
        "initial weights have {} entries, expected {n}",
        initial.len()
      )));
    }
    self.stats.evaluate(initial)?;

    let (start, iterations, nm_reason) = self.global_search(initial)?;
    let refined = self.refine(start)?;

    let weights = WeightVector::new(refined.weights.to_vec())?;
    let stats = self.stats.evaluate(&weights)?;
    let message = format!(
      "nelder-mead: {nm_reason} after {iterations} iterations; projected gradient: {} after {} iterations",
      if refined.converged {
        "converged"
      } else {
        "iteration budget exhausted"
      },
      refined.iterations
    );

    if refined.converged {
      info!(sharpe = stats.sharpe, iterations, refine_iterations = refined.iterations, "optimization converged");
    } else {
      warn!(%message, "optimization did not converge");
    }

    Ok(OptimizationReport {
      weights,
      stats,
      success: refined.converged,
      message,
      objective: -stats.sharpe,
      iterations,
      refine_iterations: refined.iterations,
    })
  }

  fn global_search(&self, initial: &WeightVector) -> Result<(Array1<f64>, u64, String)> {
    let n = initial.len();
    let x0: Vec<f64> = initial.as_slice().iter().map(|w| w.max(1e-8).ln()).collect();
    let mut simplex = Vec::with_capacity(n + 1);
    simplex.push(x0.clone());
    for i in 0..n {
      let mut point = x0.clone();
      point[i] += 1.0;
      simplex.push(point);
    }

    let cost = SoftmaxCost {
      objective: Maximize(SharpeObjective::new(self.stats.clone())),
    };
    let solver = NelderMead::new(simplex)
      .with_sd_tolerance(self.config.sd_tolerance)
      .map_err(|e| PortfolioError::OptimizationFailure(e.to_string()))?;

    let res = Executor::new(cost, solver)
      .configure(|state| state.max_iters(self.config.max_iters))
      .run()
      .map_err(|e| match e.downcast::<PortfolioError>() {
        Ok(err) => err,
        Err(e) => PortfolioError::OptimizationFailure(e.to_string()),
      })?;

    let iterations = res.state.get_iter();
    let reason = match res.state.get_termination_reason() {
      Some(TerminationReason::SolverConverged) => "converged".to_string(),
      Some(other) => format!("{other:?}"),
      None => "not terminated".to_string(),
    };
    let best = res.state.best_param.unwrap_or(x0);
    debug!(iterations, %reason, "nelder-mead finished");

    Ok((Array1::from(softmax(&best)), iterations, reason))
  }

  /// Projected-gradient ascent with Armijo backtracking.
  fn refine(&self, start: Array1<f64>) -> Result<Refinement> {
    let mut w = project_onto_simplex(start.view());
    let mut value = self.stats.evaluate_raw(w.view())?.sharpe;
    let mut step = 1.0;

    for it in 0..self.config.max_refine_iters {
      let grad = self.stats.sharpe_gradient(w.view())?;

      let mut accepted = None;
      let mut t = step;
      while t > 1e-16 {
        let candidate = project_onto_simplex((&w + &(&grad * t)).view());
        let delta = &candidate - &w;
        let candidate_value = match self.stats.evaluate_raw(candidate.view()) {
          Ok(s) => s.sharpe,
          Err(PortfolioError::DegenerateInput(_)) => f64::NEG_INFINITY,
          Err(e) => return Err(e),
        };
        if candidate_value >= value + ARMIJO * grad.dot(&delta) {
          accepted = Some((candidate, candidate_value, delta));
          break;
        }
        t *= 0.5;
      }

      let Some((candidate, candidate_value, delta)) = accepted else {
        // No ascent direction left at machine precision.
        return Ok(Refinement {
          weights: w,
          iterations: it,
          converged: true,
        });
      };

      let moved = delta.iter().fold(0.0f64, |m, d| m.max(d.abs()));
      w = candidate;
      value = candidate_value;
      step = (t * 2.0).min(1e6);

      if moved < self.config.tolerance {
        return Ok(Refinement {
          weights: w,
          iterations: it + 1,
          converged: true,
        });
      }
    }

    Ok(Refinement {
      weights: w,
      iterations: self.config.max_refine_iters,
      converged: false,
    })
  }
}

struct Refinement {
  weights: Array1<f64>,
  iterations: usize,
  converged: bool,
}
