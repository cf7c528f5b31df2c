//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Log-returns, annualized portfolio statistics, Monte-Carlo sampling of the
//! efficient frontier and maximum Sharpe ratio optimization.

pub mod data;
pub mod monte_carlo;
pub mod optimizer;
pub mod statistics;
pub mod types;

pub use data::log_returns;
pub use data::PriceMatrix;
pub use data::PricePoint;
pub use data::ReturnsMatrix;
pub use monte_carlo::MonteCarloResult;
pub use monte_carlo::MonteCarloSampler;
pub use monte_carlo::SamplingScheme;
pub use optimizer::project_onto_simplex;
pub use optimizer::Maximize;
pub use optimizer::Objective;
pub use optimizer::OptimalPortfolio;
pub use optimizer::OptimizationReport;
pub use optimizer::OptimizerConfig;
pub use optimizer::SharpeObjective;
pub use optimizer::SharpeOptimizer;
pub use statistics::PortfolioStatistics;
pub use statistics::MIN_VOLATILITY;
pub use statistics::TRADING_DAYS_PER_YEAR;
pub use types::PortfolioStats;
pub use types::WeightVector;
pub use types::WEIGHT_SUM_TOLERANCE;
