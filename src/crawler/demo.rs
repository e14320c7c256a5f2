use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    crawler::MarketData,
    declare::{Index, MarketSummary, PriceSample},
    error::AgentError,
};

/// 固定的示範行情來源
///
/// Serves canned quotes so the pipeline can be exercised end to end without a
/// reachable market-data provider. Enabled via `market.demo_fallback`.
pub struct Demo {}

/// symbol, open, close
const DEMO_QUOTES: [(&str, Decimal, Decimal); 10] = [
    ("RELIANCE.NS", dec!(2900.00), dec!(2966.70)),
    ("HDFCBANK.NS", dec!(1650.00), dec!(1679.70)),
    ("ICICIBANK.NS", dec!(1200.00), dec!(1213.20)),
    ("INFY.NS", dec!(1550.00), dec!(1558.50)),
    ("TCS.NS", dec!(3850.00), dec!(3853.85)),
    ("HINDUNILVR.NS", dec!(2450.00), dec!(2447.55)),
    ("KOTAKBANK.NS", dec!(1800.00), dec!(1789.20)),
    ("LT.NS", dec!(3600.00), dec!(3571.20)),
    ("SBIN.NS", dec!(840.00), dec!(827.40)),
    ("BHARTIARTL.NS", dec!(1400.00), dec!(1379.00)),
];

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[async_trait]
impl MarketData for Demo {
    async fn get_index_summary(index: Index) -> Result<MarketSummary> {
        let (last, points) = match index {
            Index::Sensex => (dec!(80049.67), dec!(263.82)),
            Index::Nifty50 => (dec!(24374.05), dec!(91.85)),
        };
        let open = last - points;

        Ok(MarketSummary::new(
            index.name(),
            last,
            points,
            points / open * Decimal::ONE_HUNDRED,
        ))
    }

    async fn get_price_sample(symbol: &str) -> Result<PriceSample> {
        DEMO_QUOTES
            .iter()
            .find(|(demo_symbol, _, _)| *demo_symbol == symbol)
            .map(|(symbol, open, close)| PriceSample {
                symbol: symbol.to_string(),
                open: *open,
                close: *close,
                date: today(),
            })
            .ok_or_else(|| AgentError::DataUnavailable(symbol.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_price_sample() {
        let sample = Demo::get_price_sample("RELIANCE.NS").await.unwrap();
        assert_eq!(sample.open, dec!(2900.00));
        assert_eq!(sample.close, dec!(2966.70));
        assert_eq!(sample.percent_change(), Some(dec!(2.3)));
    }

    #[tokio::test]
    async fn test_get_price_sample_unknown_symbol() {
        assert!(Demo::get_price_sample("UNKNOWN.NS").await.is_err());
    }

    #[tokio::test]
    async fn test_get_index_summary() {
        let summary = Demo::get_index_summary(Index::Sensex).await.unwrap();
        assert_eq!(summary.index_name, "Sensex");
        assert!(summary.percent_change > Decimal::ZERO);
        assert!(!summary.unavailable);
    }
}
