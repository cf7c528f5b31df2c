//! Tracing subscriber setup for the binary.

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn,mpt_rs=info,mpt=info";

/// Install a console subscriber filtered by `RUST_LOG`.
///
/// Calling it twice is a no-op.
pub fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_target(false))
    .with(filter)
    .try_init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_filter_parses() {
    let filter = EnvFilter::try_new(DEFAULT_FILTER).unwrap().to_string();
    assert!(filter.contains("mpt_rs=info"));
    assert!(filter.contains("mpt=info"));
  }
}
