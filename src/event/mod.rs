/// 每日行情訊息
pub mod market_update;
