use chrono::{Datelike, NaiveDate, Weekday};

/// First weekday strictly after the last day of absence, or `None` past the
/// end of the representable calendar.
pub fn confirmation_date(interval_end: NaiveDate) -> Option<NaiveDate> {
    let mut date = interval_end.succ_opt()?;
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date = date.succ_opt()?;
    }
    Some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn midweek_end_confirms_next_day() {
        // Tuesday -> Wednesday
        assert_eq!(confirmation_date(date(2024, 3, 5)), Some(date(2024, 3, 6)));
    }

    #[test]
    fn friday_and_weekend_roll_to_monday() {
        assert_eq!(confirmation_date(date(2024, 3, 8)), Some(date(2024, 3, 11)));
        assert_eq!(confirmation_date(date(2024, 3, 9)), Some(date(2024, 3, 11)));
        assert_eq!(confirmation_date(date(2024, 3, 10)), Some(date(2024, 3, 11)));
    }

    #[test]
    fn last_representable_day_has_no_confirmation() {
        assert_eq!(confirmation_date(NaiveDate::MAX), None);
    }
}
