use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::{
    config::SETTINGS,
    crawler::{demo::Demo, yahoo::Yahoo},
    declare::{Index, MarketSummary, PriceSample},
};

/// 內建的示範行情，所有遠端來源都失敗時的備援
pub mod demo;
/// 雅虎財經
pub mod yahoo;

/// A market-data source able to serve index snapshots and per-symbol samples.
#[async_trait]
pub trait MarketData {
    async fn get_index_summary(index: Index) -> Result<MarketSummary>;
    async fn get_price_sample(symbol: &str) -> Result<PriceSample>;
}

type IndexFetcher = fn(Index) -> BoxFuture<'static, Result<MarketSummary>>;
type SampleFetcher<'a> = fn(&'a str) -> BoxFuture<'a, Result<PriceSample>>;

/// 取得指數的當日摘要，遠端來源失敗時依序嘗試備援來源
pub async fn fetch_index_summary_from_remote_site(index: Index) -> Result<MarketSummary> {
    let mut sites: Vec<IndexFetcher> = vec![Yahoo::get_index_summary];

    if SETTINGS.market.demo_fallback {
        sites.push(Demo::get_index_summary);
    }

    for fetch_func in sites {
        if let Ok(summary) = fetch_func(index).await {
            return Ok(summary);
        }
    }

    Err(anyhow!(
        "Failed to fetch index summary({}) from all sites",
        index.name()
    ))
}

/// 取得個股的當日開收盤樣本
pub async fn fetch_price_sample_from_remote_site(symbol: &str) -> Result<PriceSample> {
    let mut sites: Vec<SampleFetcher<'_>> = vec![Yahoo::get_price_sample];

    if SETTINGS.market.demo_fallback {
        sites.push(Demo::get_price_sample);
    }

    for fetch_func in sites {
        if let Ok(sample) = fetch_func(symbol).await {
            return Ok(sample);
        }
    }

    Err(anyhow!(
        "Failed to fetch price sample({}) from all sites",
        symbol
    ))
}
