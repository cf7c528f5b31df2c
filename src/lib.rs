//! # mpt-rs
//!
//! $$
//! \max_{\mathbf w\in\Delta^{N-1}} \frac{\mu_p(\mathbf w) - r_f}{\sigma_p(\mathbf w)}
//! $$
//!
//! Modern Portfolio Theory on historical closing prices: log-returns,
//! annualized portfolio statistics, a Monte-Carlo efficient frontier and the
//! long-only maximum Sharpe ratio portfolio.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod market;
pub mod portfolio;
pub mod report;
pub mod visualization;

pub use config::PortfolioConfig;
pub use engine::EngineOutput;
pub use engine::PortfolioEngine;
pub use error::PortfolioError;
pub use error::Result;
