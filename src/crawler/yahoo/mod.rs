//! # Yahoo 財經採集模組
//!
//! 透過 Yahoo Finance v8 chart API 抓取指數與個股的當日行情。
//!
//! ## 站點資訊
//!
//! - 來源域名：`query1.finance.yahoo.com`
//! - 抓取技術：HTTP GET 搭配 JSON 解析。

/// chart API 採集子模組
pub mod chart;

/// Yahoo Finance API 的主機域名
const HOST: &str = "query1.finance.yahoo.com";

/// Yahoo 財經採集器
///
/// 此結構體主要作為 `MarketData` Trait 的實作載體，提供統一的採集介面。
pub struct Yahoo {}
