//! # Visualization
//!
//! $$
//! (\sigma_p^{(k)}, \mu_p^{(k)}) \mapsto \text{scatter colored by } S^{(k)}
//! $$
//!
//! Chart builders. Nothing here touches the filesystem or a display; callers
//! decide whether to `show()` or `write_html()` the returned [`Plot`].

use plotly::common::ColorBar;
use plotly::common::ColorScale;
use plotly::common::ColorScalePalette;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::MarkerSymbol;
use plotly::common::Mode;
use plotly::layout::Axis;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;

use crate::portfolio::MonteCarloResult;
use crate::portfolio::PortfolioStats;
use crate::portfolio::PriceMatrix;

/// One line per asset, closing price against date.
pub fn price_chart(prices: &PriceMatrix) -> Plot {
  let dates: Vec<String> = prices
    .dates()
    .iter()
    .map(|d| d.format("%Y-%m-%d").to_string())
    .collect();

  let mut plot = Plot::new();
  plot.set_layout(
    Layout::new()
      .title("Closing prices")
      .x_axis(Axis::new().title("Date"))
      .y_axis(Axis::new().title("Price")),
  );

  for (j, ticker) in prices.tickers().iter().enumerate() {
    let trace = Scatter::new(dates.clone(), prices.column(j).to_vec())
      .mode(Mode::Lines)
      .line(Line::new().width(1.0))
      .name(ticker.as_str());
    plot.add_trace(trace);
  }

  plot
}

fn frontier_trace(samples: &MonteCarloResult) -> Box<Scatter<f64, f64>> {
  Scatter::new(samples.volatilities(), samples.returns())
    .mode(Mode::Markers)
    .name("random portfolios")
    .marker(
      Marker::new()
        .size(5)
        .color_array(samples.sharpes())
        .color_scale(ColorScale::Palette(ColorScalePalette::Viridis))
        .show_scale(true)
        .color_bar(ColorBar::new().title("Sharpe ratio")),
    )
}

fn frontier_layout(title: &str) -> Layout {
  Layout::new()
    .title(title)
    .x_axis(Axis::new().title("Expected volatility"))
    .y_axis(Axis::new().title("Expected return"))
    .show_legend(false)
}

/// Risk/return scatter of the sampled portfolios.
pub fn frontier_chart(samples: &MonteCarloResult) -> Plot {
  let mut plot = Plot::new();
  plot.set_layout(frontier_layout("Monte-Carlo portfolios"));
  plot.add_trace(frontier_trace(samples));
  plot
}

/// [`frontier_chart`] with the optimal portfolio marked by a star.
pub fn optimum_chart(samples: &MonteCarloResult, optimum: &PortfolioStats) -> Plot {
  let mut plot = Plot::new();
  plot.set_layout(frontier_layout("Maximum Sharpe ratio portfolio"));
  plot.add_trace(frontier_trace(samples));
  plot.add_trace(
    Scatter::new(vec![optimum.volatility], vec![optimum.expected_return])
      .mode(Mode::Markers)
      .name("optimum")
      .marker(
        Marker::new()
          .symbol(MarkerSymbol::Star)
          .size(20)
          .color("green"),
      ),
  );
  plot
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;
  use crate::portfolio::MonteCarloSampler;
  use crate::portfolio::PortfolioStatistics;
  use crate::portfolio::ReturnsMatrix;
  use crate::portfolio::SamplingScheme;

  fn samples() -> MonteCarloResult {
    let returns = ReturnsMatrix::from_array(array![
      [0.01, 0.02, -0.01],
      [-0.01, 0.00, 0.02],
      [0.02, -0.01, 0.01],
      [0.00, 0.01, 0.00]
    ])
    .unwrap();
    let stats = PortfolioStatistics::new(&returns, 252.0, 0.0).unwrap();
    MonteCarloSampler::new(20, SamplingScheme::UniformNormalized, Some(2))
      .sample(&stats)
      .unwrap()
  }

  #[test]
  fn optimum_chart_adds_the_star_trace() {
    let samples = samples();
    let optimum = samples.stats[0];

    let html = optimum_chart(&samples, &optimum).to_html();
    assert!(html.contains("Sharpe ratio"));
    assert!(html.contains("optimum"));
    assert!(frontier_chart(&samples).to_html().contains("random portfolios"));
  }
}
