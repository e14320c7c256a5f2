use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use concat_string::concat_string;
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::{Deserialize, Serialize};

use crate::{
    crawler::{
        yahoo::{Yahoo, HOST},
        MarketData,
    },
    declare::{Index, MarketSummary, PriceSample},
    error::AgentError,
    util::http,
};

#[derive(Serialize, Deserialize, Debug)]
struct ChartResponse {
    pub chart: Chart,
}

#[derive(Serialize, Deserialize, Debug)]
struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ChartError {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ChartResult {
    pub meta: Meta,
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Serialize, Deserialize, Debug)]
struct Meta {
    pub symbol: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Indicators {
    pub quote: Vec<Quote>,
}

/// 每根 K 棒的欄位可能為 null，未成交的分鐘沒有數據
#[derive(Serialize, Deserialize, Debug)]
struct Quote {
    pub open: Option<Vec<Option<f64>>>,
    pub close: Option<Vec<Option<f64>>>,
}

/// 抓取指定代號的當日走勢
async fn visit(ticker: &str, interval: &str) -> Result<ChartResult> {
    let url = concat_string!(
        "https://",
        HOST,
        "/v8/finance/chart/",
        urlencoding::encode(ticker),
        "?range=1d&interval=",
        interval
    );
    let response = http::get_json::<ChartResponse>(&url).await?;

    if let Some(why) = response.chart.error {
        return Err(anyhow!(
            "chart API returned an error({:?}) for {}",
            why,
            ticker
        ));
    }

    response
        .chart
        .result
        .and_then(|mut result| {
            if result.is_empty() {
                None
            } else {
                Some(result.remove(0))
            }
        })
        .ok_or_else(|| AgentError::DataUnavailable(ticker.to_string()).into())
}

impl ChartResult {
    /// 當日第一筆有效開盤價
    fn first_open(&self) -> Option<Decimal> {
        self.indicators
            .quote
            .first()?
            .open
            .as_ref()?
            .iter()
            .flatten()
            .next()
            .and_then(|open| Decimal::from_f64(*open))
    }

    /// 最近一筆有效收盤價，盤中時為最新成交價
    fn last_close(&self) -> Option<Decimal> {
        self.indicators
            .quote
            .first()?
            .close
            .as_ref()?
            .iter()
            .flatten()
            .last()
            .and_then(|close| Decimal::from_f64(*close))
            .or_else(|| {
                self.meta
                    .regular_market_price
                    .and_then(Decimal::from_f64)
            })
    }

    fn date(&self) -> NaiveDate {
        self.timestamp
            .as_ref()
            .and_then(|ts| ts.first())
            .and_then(|ts| DateTime::from_timestamp(*ts, 0))
            .map(|dt| dt.date_naive())
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[async_trait]
impl MarketData for Yahoo {
    /// 以當日第一筆開盤價為基準的盤中變動摘要
    async fn get_index_summary(index: Index) -> Result<MarketSummary> {
        let result = visit(index.ticker(), "1m").await?;
        let (open, last) = match (result.first_open(), result.last_close()) {
            (Some(open), Some(last)) if open > Decimal::ZERO => (open, last),
            _ => return Err(AgentError::DataUnavailable(index.name().to_string()).into()),
        };

        let points_change = last - open;
        let percent_change = points_change / open * Decimal::ONE_HUNDRED;

        Ok(MarketSummary::new(
            index.name(),
            last,
            points_change,
            percent_change,
        ))
    }

    async fn get_price_sample(symbol: &str) -> Result<PriceSample> {
        let result = visit(symbol, "1d").await?;
        let (open, close) = match (result.first_open(), result.last_close()) {
            (Some(open), Some(close)) => (open, close),
            _ => return Err(AgentError::DataUnavailable(symbol.to_string()).into()),
        };

        Ok(PriceSample {
            symbol: symbol.to_string(),
            open,
            close,
            date: result.date(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging;

    #[test]
    fn test_parse_chart_response() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "^NSEI", "regularMarketPrice": 24010.6},
                    "timestamp": [1719817200, 1719817260],
                    "indicators": {
                        "quote": [{
                            "open": [null, 24001.45],
                            "close": [23990.1, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let result = &response.chart.result.unwrap()[0];

        assert_eq!(result.first_open(), Decimal::from_f64(24001.45));
        assert_eq!(result.last_close(), Decimal::from_f64(23990.1));
        assert_eq!(
            result.date(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_chart_response_without_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "^NSEI", "regularMarketPrice": 24010.6},
                    "timestamp": [],
                    "indicators": {
                        "quote": [{"open": [], "close": [null]}]
                    }
                }],
                "error": null
            }
        }"#;

        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let result = &response.chart.result.unwrap()[0];

        assert_eq!(result.first_open(), None);
        // 序列裡沒有收盤價時退回 meta 的最新成交價
        assert_eq!(result.last_close(), Decimal::from_f64(24010.6));
    }

    #[tokio::test]
    #[ignore]
    async fn test_get_index_summary() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 get_index_summary".to_string());

        match Yahoo::get_index_summary(Index::Nifty50).await {
            Ok(summary) => {
                dbg!(&summary);
                logging::debug_file_async(format!("summary : {:#?}", summary));
            }
            Err(why) => {
                logging::debug_file_async(format!(
                    "Failed to get_index_summary because {:?}",
                    why
                ));
            }
        }

        logging::debug_file_async("結束 get_index_summary".to_string());
    }

    #[tokio::test]
    #[ignore]
    async fn test_get_price_sample() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 get_price_sample".to_string());

        match Yahoo::get_price_sample("TCS.NS").await {
            Ok(sample) => {
                dbg!(&sample);
                logging::debug_file_async(format!("sample : {:#?}", sample));
            }
            Err(why) => {
                logging::debug_file_async(format!(
                    "Failed to get_price_sample because {:?}",
                    why
                ));
            }
        }

        logging::debug_file_async("結束 get_price_sample".to_string());
    }
}
