use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 追蹤的大盤指數
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Index {
    /// 孟買證券交易所敏感指數 ^BSESN
    Sensex,
    /// 印度國家證券交易所五十指數 ^NSEI
    Nifty50,
}

impl Index {
    /// Provider-specific ticker symbol.
    pub fn ticker(&self) -> &'static str {
        match self {
            Index::Sensex => "^BSESN",
            Index::Nifty50 => "^NSEI",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Index::Sensex => "Sensex",
            Index::Nifty50 => "Nifty 50",
        }
    }

    pub fn iterator() -> impl Iterator<Item = Self> {
        [Self::Sensex, Self::Nifty50].iter().copied()
    }
}

/// 預設追蹤的十檔 Nifty 成分股
pub const DEFAULT_UNIVERSE: [&str; 10] = [
    "RELIANCE.NS",
    "HDFCBANK.NS",
    "ICICIBANK.NS",
    "INFY.NS",
    "TCS.NS",
    "HINDUNILVR.NS",
    "KOTAKBANK.NS",
    "LT.NS",
    "SBIN.NS",
    "BHARTIARTL.NS",
];

/// One day's open/close observation for a single symbol.
///
/// Created fresh per pipeline run from the market-data provider and dropped
/// after the message has been built.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    pub symbol: String,
    pub open: Decimal,
    pub close: Decimal,
    pub date: NaiveDate,
}

impl PriceSample {
    /// 漲幅 = (收盤價 - 開盤價) / 開盤價 * 100%
    ///
    /// Returns `None` when the open is not positive, the sample cannot be
    /// ranked without a valid baseline.
    pub fn percent_change(&self) -> Option<Decimal> {
        if self.open <= Decimal::ZERO {
            return None;
        }

        Some((self.close - self.open) / self.open * dec!(100))
    }

    /// 漲跌 = 收盤價 - 開盤價
    pub fn points_change(&self) -> Decimal {
        self.close - self.open
    }
}

/// Snapshot of a tracked index for one trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSummary {
    pub index_name: String,
    pub last_value: Decimal,
    pub points_change: Decimal,
    pub percent_change: Decimal,
    /// Set when the provider returned no usable series for the index.
    pub unavailable: bool,
}

impl MarketSummary {
    pub fn new(
        index_name: &str,
        last_value: Decimal,
        points_change: Decimal,
        percent_change: Decimal,
    ) -> Self {
        MarketSummary {
            index_name: index_name.to_string(),
            last_value,
            points_change,
            percent_change,
            unavailable: false,
        }
    }

    /// Placeholder summary so a failed fetch still renders and the pipeline
    /// keeps going.
    pub fn unavailable(index_name: &str) -> Self {
        MarketSummary {
            index_name: index_name.to_string(),
            last_value: Decimal::ZERO,
            points_change: Decimal::ZERO,
            percent_change: Decimal::ZERO,
            unavailable: true,
        }
    }

    pub fn to_line(&self) -> String {
        if self.unavailable {
            return format!("{}: data not available", self.index_name);
        }

        let direction = if self.points_change >= Decimal::ZERO {
            "positive"
        } else {
            "negative"
        };

        format!(
            "{}: {:.2}, {} by {:.2} points ({:.2}%)",
            self.index_name, self.last_value, direction, self.points_change, self.percent_change
        )
    }
}

/// One ranked entry of the movers report.
#[derive(Debug, Clone, PartialEq)]
pub struct Mover {
    pub symbol: String,
    pub percent_change: Decimal,
}

/// Top-N / bottom-N slices of the ranked universe.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoversReport {
    /// Best performers, highest percent first.
    pub gainers: Vec<Mover>,
    /// Worst performers, most negative percent first.
    pub losers: Vec<Mover>,
    /// Fewer than 2×N symbols had usable data, the slices may overlap or be
    /// shorter than requested.
    pub short_of_data: bool,
}
