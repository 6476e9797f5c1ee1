use chrono::NaiveDate;

pub const MAX_CARRY_OVER_MONTHS: u32 = 12;

/// Month anchors for a planning year: January through December, followed by
/// up to a year of carry-over months from the next year.
pub fn build_horizon(year: i32, carry_over_months: u32) -> Vec<NaiveDate> {
    let carry = carry_over_months.min(MAX_CARRY_OVER_MONTHS);
    let current = (1..=12).filter_map(|month| NaiveDate::from_ymd_opt(year, month, 1));
    let next = (1..=carry).filter_map(|month| NaiveDate::from_ymd_opt(year + 1, month, 1));
    current.chain(next).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use super::build_horizon;

    #[test]
    fn builds_plain_year() {
        let horizon = build_horizon(2026, 0);
        assert_eq!(horizon.len(), 12);
        assert_eq!(horizon[0], NaiveDate::from_ymd_opt(2026, 1, 1).expect("date"));
        assert!(horizon.iter().all(|d| d.day() == 1));
    }

    #[test]
    fn carry_over_is_capped() {
        let horizon = build_horizon(2026, 3);
        assert_eq!(horizon.len(), 15);
        assert_eq!(horizon[14], NaiveDate::from_ymd_opt(2027, 3, 1).expect("date"));
        assert_eq!(build_horizon(2026, 40).len(), 24);
    }
}
