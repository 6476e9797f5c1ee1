use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::{Holiday, HolidayVariant};

/// Reads a JSON array of `{date, name, variant, location?}` records.
pub fn load_holidays_file(path: &Path) -> Result<Vec<Holiday>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading holidays file: {}", path.display()))?;
    let holidays: Vec<Holiday> = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing holidays JSON: {}", path.display()))?;
    Ok(holidays)
}

/// Combines provider holidays with user-owned ones.
///
/// Regional entries survive only when their location matches `region`. When
/// several entries fall on the same date the national one wins, then regional,
/// then custom. The result is sorted by date.
pub fn merge_holidays(
    external: &[Holiday],
    custom: &[Holiday],
    region: Option<&str>,
) -> Vec<Holiday> {
    let region = region.map(str::trim).filter(|r| !r.is_empty());
    let mut by_date: BTreeMap<_, Holiday> = BTreeMap::new();

    for holiday in external.iter().chain(custom.iter()) {
        if holiday.variant == HolidayVariant::Regional && !matches_region(holiday, region) {
            continue;
        }
        match by_date.get(&holiday.date) {
            Some(existing) if existing.variant <= holiday.variant => {}
            _ => {
                by_date.insert(holiday.date, holiday.clone());
            }
        }
    }

    by_date.into_values().collect()
}

fn matches_region(holiday: &Holiday, region: Option<&str>) -> bool {
    match (holiday.location.as_deref(), region) {
        (Some(location), Some(region)) => location.trim().eq_ignore_ascii_case(region),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::{load_holidays_file, merge_holidays};
    use crate::types::{Holiday, HolidayVariant};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn national_wins_over_custom_on_same_date() {
        let external = vec![Holiday::national(date(2026, 12, 25), "Christmas Day")];
        let custom = vec![
            Holiday::custom(date(2026, 12, 25), "Office party"),
            Holiday::custom(date(2026, 12, 24), "Christmas Eve"),
        ];
        let merged = merge_holidays(&external, &custom, None);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].date, date(2026, 12, 24));
        assert_eq!(merged[1].variant, HolidayVariant::National);
        assert_eq!(merged[1].name, "Christmas Day");
    }

    #[test]
    fn regional_holidays_follow_region() {
        let external = vec![
            Holiday::regional(date(2026, 4, 23), "Sant Jordi", "CT"),
            Holiday::regional(date(2026, 5, 2), "Community Day", "MD"),
        ];
        let merged = merge_holidays(&external, &[], Some("ct"));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Sant Jordi");
        assert!(merge_holidays(&external, &[], None).is_empty());
    }

    #[test]
    fn loads_json_file() {
        let dir = std::env::temp_dir().join(format!("pto-bridge-holidays-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("holidays.json");
        fs::write(
            &path,
            r#"[{"date":"2026-10-12","name":"Columbus Day","variant":"national"},
                {"date":"2026-06-24","name":"Sant Joan","variant":"regional","location":"CT"}]"#,
        )
        .expect("write holidays");
        let holidays = load_holidays_file(&path).expect("load holidays");
        assert_eq!(holidays.len(), 2);
        assert_eq!(holidays[1].location.as_deref(), Some("CT"));
        let _ = fs::remove_dir_all(&dir);
    }
}
