use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{declare, logging};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub bot: Bot,
    #[serde(default)]
    pub narrative: Narrative,
    #[serde(default)]
    pub market: Market,
    #[serde(default)]
    pub system: System,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Bot {
    pub telegram: Telegram,
}

const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
const TELEGRAM_CHAT_IDS: &str = "TELEGRAM_CHAT_IDS";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Telegram {
    #[serde(default)]
    pub token: String,
    /// 接收每日行情訊息的聊天室
    #[serde(default)]
    pub chat_ids: Vec<i64>,
}

const NARRATIVE_API_KEY: &str = "NARRATIVE_API_KEY";
const NARRATIVE_MODEL: &str = "NARRATIVE_MODEL";
const NARRATIVE_API_URL: &str = "NARRATIVE_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Narrative {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_narrative_model")]
    pub model: String,
    #[serde(default = "default_narrative_api_url")]
    pub api_url: String,
}

impl Default for Narrative {
    fn default() -> Self {
        Narrative {
            api_key: String::new(),
            model: default_narrative_model(),
            api_url: default_narrative_api_url(),
        }
    }
}

fn default_narrative_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_narrative_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

const MARKET_TOP_N: &str = "MARKET_TOP_N";
const MARKET_UNIVERSE: &str = "MARKET_UNIVERSE";
const MARKET_CRON: &str = "MARKET_CRON";
const MARKET_DEMO_FALLBACK: &str = "MARKET_DEMO_FALLBACK";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Market {
    /// How many gainers and losers to report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Tracked stock symbols, provider tickers.
    #[serde(default = "default_universe")]
    pub universe: Vec<String>,
    /// UTC cron for the daily update, 12:30 UTC is 18:00 IST.
    #[serde(default = "default_cron")]
    pub cron: String,
    /// Use the built-in sample quotes when every remote source fails.
    #[serde(default)]
    pub demo_fallback: bool,
}

impl Default for Market {
    fn default() -> Self {
        Market {
            top_n: default_top_n(),
            universe: default_universe(),
            cron: default_cron(),
            demo_fallback: false,
        }
    }
}

fn default_top_n() -> usize {
    3
}

fn default_universe() -> Vec<String> {
    declare::DEFAULT_UNIVERSE
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_cron() -> String {
    "0 30 12 * * *".to_string()
}

const SYSTEM_HTTP_PORT: &str = "PORT";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct System {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for System {
    fn default() -> Self {
        System {
            http_port: default_http_port(),
        }
    }
}

fn default_http_port() -> u16 {
    10000
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(token) = env::var(TELEGRAM_TOKEN) {
            self.bot.telegram.token = token;
        }

        if let Ok(ids) = env::var(TELEGRAM_CHAT_IDS) {
            self.bot.telegram.chat_ids = parse_chat_ids(&ids);
        }

        if let Ok(api_key) = env::var(NARRATIVE_API_KEY) {
            self.narrative.api_key = api_key;
        }

        if let Ok(model) = env::var(NARRATIVE_MODEL) {
            self.narrative.model = model;
        }

        if let Ok(url) = env::var(NARRATIVE_API_URL) {
            self.narrative.api_url = url;
        }

        if let Ok(top_n) = env::var(MARKET_TOP_N) {
            self.market.top_n = usize::from_str(&top_n).unwrap_or(default_top_n());
        }

        if let Ok(universe) = env::var(MARKET_UNIVERSE) {
            let symbols: Vec<String> = universe
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !symbols.is_empty() {
                self.market.universe = symbols;
            }
        }

        if let Ok(cron) = env::var(MARKET_CRON) {
            self.market.cron = cron;
        }

        if let Ok(demo) = env::var(MARKET_DEMO_FALLBACK) {
            self.market.demo_fallback = matches!(demo.as_str(), "1" | "true" | "yes");
        }

        if let Ok(port) = env::var(SYSTEM_HTTP_PORT) {
            self.system.http_port = u16::from_str(&port).unwrap_or(default_http_port());
        }

        self
    }
}

/// A single id or a comma-separated list.
fn parse_chat_ids(text: &str) -> Vec<i64> {
    text.split(',')
        .filter_map(|id| match i64::from_str(id.trim()) {
            Ok(id) => Some(id),
            Err(why) => {
                logging::error_file_async(format!(
                    "Failed to parse chat id({}) because {:?}",
                    id, why
                ));
                None
            }
        })
        .collect()
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_ids() {
        assert_eq!(parse_chat_ids("123"), vec![123]);
        assert_eq!(parse_chat_ids("123, -456,789"), vec![123, -456, 789]);
        assert_eq!(parse_chat_ids("123,abc"), vec![123]);
    }

    #[test]
    fn test_market_defaults() {
        let market = Market::default();
        assert_eq!(market.top_n, 3);
        assert_eq!(market.universe.len(), 10);
        assert!(!market.demo_fallback);
    }

    #[tokio::test]
    #[ignore]
    async fn test_init() {
        dotenv::dotenv().ok();
        logging::debug_file_async(format!("SETTINGS.market: {:#?}\r\n", SETTINGS.market));
        logging::debug_file_async(format!("SETTINGS.bot: {:#?}\r\n", SETTINGS.bot));
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }
}
