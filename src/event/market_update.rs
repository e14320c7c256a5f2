use anyhow::Result;
use chrono::Local;
use futures::future::join_all;

use crate::{
    bot,
    calculation::movers,
    config::SETTINGS,
    crawler,
    declare::{Index, MarketSummary, Mover, MoversReport, PriceSample},
    logging, narrative,
    util::datetime::Weekend,
};

/// 產生並發送每日行情訊息
///
/// Fetcher → Ranker → Narrative → Notifier, strictly linear. Every stage
/// substitutes a visible placeholder on failure so the run always tries to
/// deliver something; only missing delivery credentials abort the run.
pub async fn execute() -> Result<()> {
    if Local::now().is_weekend() {
        return Ok(());
    }

    bot::telegram::ensure_credentials()?;

    let summaries = fetch_index_summaries().await;
    let samples = fetch_price_samples(&SETTINGS.market.universe).await;
    let report = movers::rank(&samples, SETTINGS.market.top_n);

    let numeric_summary = build_numeric_summary(&summaries, &report);
    let reason = narrative::generate_explanation(&numeric_summary).await;
    let message = build_message(&summaries, &report, &reason);

    bot::telegram::send(&message).await?;
    logging::info_file_async("每日行情訊息已送出".to_string());

    Ok(())
}

/// 逐一取得追蹤指數的摘要，失敗的指數以替代文字呈現
async fn fetch_index_summaries() -> Vec<MarketSummary> {
    let futures: Vec<_> = Index::iterator()
        .map(|index| async move {
            match crawler::fetch_index_summary_from_remote_site(index).await {
                Ok(summary) => summary,
                Err(why) => {
                    logging::error_file_async(format!(
                        "Failed to fetch_index_summary({}) because {:?}",
                        index.name(),
                        why
                    ));
                    MarketSummary::unavailable(index.name())
                }
            }
        })
        .collect();

    join_all(futures).await
}

/// 取得追蹤個股的開收盤樣本，沒有數據的個股不參與排行
async fn fetch_price_samples(universe: &[String]) -> Vec<PriceSample> {
    let futures: Vec<_> = universe
        .iter()
        .map(|symbol| async move {
            match crawler::fetch_price_sample_from_remote_site(symbol).await {
                Ok(sample) => Some(sample),
                Err(why) => {
                    logging::warn_file_async(format!(
                        "Failed to fetch_price_sample({}) because {:?}",
                        symbol, why
                    ));
                    None
                }
            }
        })
        .collect();

    join_all(futures).await.into_iter().flatten().collect()
}

fn format_movers(movers: &[Mover]) -> String {
    if movers.is_empty() {
        return "data not available".to_string();
    }

    movers
        .iter()
        .map(|m| format!("{}: {:.2}%", m.symbol, m.percent_change))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 給文字生成服務的數字摘要
fn build_numeric_summary(summaries: &[MarketSummary], report: &MoversReport) -> String {
    let index_lines = summaries
        .iter()
        .map(MarketSummary::to_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nTop gainers: {}.\nTop losers: {}.",
        index_lines,
        format_movers(&report.gainers),
        format_movers(&report.losers)
    )
}

fn build_message(summaries: &[MarketSummary], report: &MoversReport, reason: &str) -> String {
    let index_lines = summaries
        .iter()
        .map(MarketSummary::to_line)
        .collect::<Vec<_>>()
        .join("\n");

    let mut message = format!(
        "📊 Daily Market Update:\n{}\n\n🏆 Top Gainers: {}\n📉 Top Losers: {}",
        index_lines,
        format_movers(&report.gainers),
        format_movers(&report.losers)
    );

    if report.short_of_data {
        message.push_str("\n(fewer symbols than expected had data today)");
    }

    message.push_str(&format!("\n\n📝 Reason:\n{}", reason));
    message
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn mover(symbol: &str, pct: &str) -> Mover {
        Mover {
            symbol: symbol.to_string(),
            percent_change: pct.parse().unwrap(),
        }
    }

    #[test]
    fn test_build_message() {
        let summaries = vec![
            MarketSummary::new("Sensex", dec!(80049.67), dec!(263.82), dec!(0.33)),
            MarketSummary::new("Nifty 50", dec!(24374.05), dec!(91.85), dec!(0.38)),
        ];
        let report = MoversReport {
            gainers: vec![mover("RELIANCE.NS", "2.3"), mover("HDFCBANK.NS", "1.8")],
            losers: vec![mover("SBIN.NS", "-1.5"), mover("LT.NS", "-0.8")],
            short_of_data: false,
        };

        let message = build_message(&summaries, &report, "Banking strength lifted the indices.");

        assert!(message.contains("Sensex: 80049.67, positive by 263.82 points (0.33%)"));
        assert!(message.contains("🏆 Top Gainers: RELIANCE.NS: 2.30%, HDFCBANK.NS: 1.80%"));
        assert!(message.contains("📉 Top Losers: SBIN.NS: -1.50%, LT.NS: -0.80%"));
        assert!(message.contains("📝 Reason:\nBanking strength lifted the indices."));
        assert!(!message.contains("fewer symbols than expected"));
    }

    #[test]
    fn test_build_message_with_placeholders() {
        // 指數抓取失敗與行情解讀失敗都以替代文字呈現，訊息仍然成形
        let summaries = vec![
            MarketSummary::unavailable("Sensex"),
            MarketSummary::new("Nifty 50", dec!(24374.05), dec!(-91.85), dec!(-0.38)),
        ];
        let report = MoversReport {
            gainers: vec![mover("A", "0.5")],
            losers: vec![mover("A", "0.5")],
            short_of_data: true,
        };

        let message = build_message(&summaries, &report, narrative::UNAVAILABLE_PLACEHOLDER);

        assert!(message.contains("Sensex: data not available"));
        assert!(message.contains("Nifty 50: 24374.05, negative by -91.85 points (-0.38%)"));
        assert!(message.contains("(fewer symbols than expected had data today)"));
        assert!(message.contains(narrative::UNAVAILABLE_PLACEHOLDER));
    }

    #[test]
    fn test_format_movers_empty() {
        assert_eq!(format_movers(&[]), "data not available");
    }

    #[test]
    fn test_build_numeric_summary() {
        let summaries = vec![MarketSummary::new(
            "Nifty 50",
            dec!(24374.05),
            dec!(91.85),
            dec!(0.38),
        )];
        let report = MoversReport {
            gainers: vec![mover("RELIANCE.NS", "2.3")],
            losers: vec![mover("SBIN.NS", "-1.5")],
            short_of_data: false,
        };

        let summary = build_numeric_summary(&summaries, &report);

        assert!(summary.starts_with("Nifty 50: 24374.05"));
        assert!(summary.contains("Top gainers: RELIANCE.NS: 2.30%."));
        assert!(summary.contains("Top losers: SBIN.NS: -1.50%."));
    }

    #[tokio::test]
    #[ignore]
    async fn test_execute() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 market_update::execute".to_string());

        match execute().await {
            Ok(_) => {}
            Err(why) => {
                logging::debug_file_async(format!("Failed to execute because {:?}", why));
            }
        }

        logging::debug_file_async("結束 market_update::execute".to_string());
    }
}
