//! Festive-season calendar check.

use chrono::{Datelike, NaiveDate};

/// Whether `date` falls inside the festive window: December 25 through
/// March 15, inclusive on both ends, wrapping across the new year.
pub fn is_festive_season(date: NaiveDate) -> bool {
    let month_day = (date.month(), date.day());
    month_day >= (12, 25) || month_day <= (3, 15)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn mid_january_is_festive() {
        assert!(is_festive_season(date(2026, 1, 15)));
    }

    #[test]
    fn midsummer_is_not() {
        assert!(!is_festive_season(date(2026, 7, 1)));
    }

    #[test]
    fn window_opens_on_december_25() {
        assert!(!is_festive_season(date(2025, 12, 20)));
        assert!(!is_festive_season(date(2025, 12, 24)));
        assert!(is_festive_season(date(2025, 12, 25)));
        assert!(is_festive_season(date(2025, 12, 26)));
    }

    #[test]
    fn window_closes_after_march_15() {
        assert!(is_festive_season(date(2026, 3, 15)));
        assert!(!is_festive_season(date(2026, 3, 16)));
        assert!(!is_festive_season(date(2026, 4, 1)));
    }
}
