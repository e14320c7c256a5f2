use crate::declare::{Mover, MoversReport, PriceSample};

/// Ranks the sampled universe by percent change and slices the extremes.
///
/// Symbols without a usable sample (non-positive open) are excluded from the
/// ranking entirely, not treated as a 0% change. The sort is stable, symbols
/// with an identical percent change keep their relative input order.
///
/// Gainers are the first `top_n` of the descending list. Losers are the last
/// `top_n`, reported worst-first. When fewer than `2 * top_n` symbols have
/// valid data the two slices may overlap or be shorter than requested and
/// `short_of_data` is set.
pub fn rank(samples: &[PriceSample], top_n: usize) -> MoversReport {
    let mut ranked: Vec<Mover> = samples
        .iter()
        .filter_map(|sample| {
            sample.percent_change().map(|percent_change| Mover {
                symbol: sample.symbol.clone(),
                percent_change,
            })
        })
        .collect();

    // sort_by 是穩定排序，同漲幅的股票保持輸入順序
    ranked.sort_by(|a, b| b.percent_change.cmp(&a.percent_change));

    let valid = ranked.len();
    let gainers: Vec<Mover> = ranked.iter().take(top_n).cloned().collect();
    let losers: Vec<Mover> = ranked
        .iter()
        .skip(valid.saturating_sub(top_n))
        .rev()
        .cloned()
        .collect();

    MoversReport {
        gainers,
        losers,
        short_of_data: valid < top_n * 2,
    }
}
