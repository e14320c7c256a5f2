use chrono::{DateTime, Datelike, Local, Weekday};

/// A trait representing the weekend concept.
pub trait Weekend {
    /// Determines if a given date is a weekend.
    ///
    /// Returns `true` if the date is on a Saturday or Sunday, and `false` otherwise.
    fn is_weekend(&self) -> bool;
}

impl Weekend for DateTime<Local> {
    /// Treats Saturday and Sunday as weekends.
    fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}
