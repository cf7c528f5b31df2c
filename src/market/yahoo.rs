//! Yahoo Finance daily history.

use std::time::Duration;

use chrono::DateTime;
use chrono::Datelike;
use chrono::NaiveDate;
use chrono::Utc;
use time::Month;
use time::OffsetDateTime;
use tokio::runtime::Runtime;
use tracing::debug;
use yahoo_finance_api::YahooConnector;

use super::PriceSource;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::portfolio::PricePoint;

/// Blocking Yahoo Finance client.
///
/// Closes are dividend and split adjusted.
pub struct YahooSource {
  connector: YahooConnector,
  runtime: Runtime,
  timeout: Duration,
}

impl YahooSource {
  pub fn new(timeout: Duration) -> Result<Self> {
    let connector =
      YahooConnector::new().map_err(|e| PortfolioError::data_fetch("yahoo", e.to_string()))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .map_err(|e| PortfolioError::data_fetch("yahoo", e.to_string()))?;

    Ok(Self {
      connector,
      runtime,
      timeout,
    })
  }
}

fn to_offset(ticker: &str, date: NaiveDate) -> Result<OffsetDateTime> {
  let month = Month::try_from(date.month() as u8)
    .map_err(|e| PortfolioError::data_fetch(ticker, e.to_string()))?;
  let date = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
    .map_err(|e| PortfolioError::data_fetch(ticker, e.to_string()))?;
  Ok(date.midnight().assume_utc())
}

impl PriceSource for YahooSource {
  fn close_history(
    &self,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<PricePoint>> {
    let from = to_offset(ticker, start)?;
    let to = to_offset(ticker, end)?;

    let response = self
      .runtime
      .block_on(async {
        tokio::time::timeout(
          self.timeout,
          self.connector.get_quote_history(ticker, from, to),
        )
        .await
      })
      .map_err(|_| {
        PortfolioError::data_fetch(ticker, format!("timed out after {:?}", self.timeout))
      })?
      .map_err(|e| PortfolioError::data_fetch(ticker, e.to_string()))?;

    let quotes = response
      .quotes()
      .map_err(|e| PortfolioError::data_fetch(ticker, e.to_string()))?;

    let mut points = Vec::with_capacity(quotes.len());
    for q in quotes {
      let date = DateTime::<Utc>::from_timestamp(q.timestamp as i64, 0)
        .ok_or_else(|| PortfolioError::data_fetch(ticker, "invalid quote timestamp"))?
        .date_naive();
      if date >= start && date < end {
        points.push(PricePoint::new(date, q.adjclose));
      }
    }
    if points.is_empty() {
      return Err(PortfolioError::data_fetch(
        ticker,
        format!("no quotes between {start} and {end}"),
      ));
    }
    debug!(ticker, n = points.len(), "received quotes");

    Ok(points)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_map_to_utc_midnight() {
    let date = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
    let offset = to_offset("AAPL", date).unwrap();

    assert_eq!(offset.year(), 2018);
    assert_eq!(offset.month(), Month::January);
    assert_eq!(offset.day(), 2);
    assert_eq!(offset.hour(), 0);
    assert_eq!(offset.offset(), time::UtcOffset::UTC);
    assert_eq!(offset.unix_timestamp(), 1_514_851_200);
  }

  #[test]
  fn leap_day_is_preserved() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let offset = to_offset("AAPL", date).unwrap();
    assert_eq!((offset.month(), offset.day()), (Month::February, 29));
  }
}
