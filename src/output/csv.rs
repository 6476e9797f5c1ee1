use anyhow::Result;
use chrono::Datelike;

use crate::metrics::Metrics;
use crate::types::{Bridge, Suggestion};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

pub fn suggestion_to_csv(suggestion: &Suggestion) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["date", "weekday", "bridge_start", "bridge_end", "efficiency"])?;
    for day in &suggestion.days {
        let bridge = suggestion.bridges.iter().find(|b| b.uses(*day));
        writer.write_record([
            day.to_string(),
            day.weekday().to_string(),
            bridge.map(|b| b.start_date.to_string()).unwrap_or_default(),
            bridge.map(|b| b.end_date.to_string()).unwrap_or_default(),
            bridge
                .map(|b| format!("{:.2}", b.efficiency))
                .unwrap_or_default(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn bridges_to_csv(bridges: &[Bridge]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "start",
        "end",
        "pto_days",
        "effective_days",
        "efficiency",
        "holiday_connections",
    ])?;
    for bridge in bridges {
        writer.write_record([
            bridge.start_date.to_string(),
            bridge.end_date.to_string(),
            bridge.pto_days_needed.to_string(),
            bridge.effective_days.to_string(),
            format!("{:.2}", bridge.efficiency),
            bridge.holiday_connections.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn alternatives_to_csv(alternatives: &[Suggestion]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["rank", "days", "effective_days", "efficiency", "dates"])?;
    for (index, alternative) in alternatives.iter().enumerate() {
        writer.write_record([
            (index + 1).to_string(),
            alternative.days.len().to_string(),
            alternative.total_effective_days().to_string(),
            format!("{:.2}", alternative.efficiency()),
            alternative.key(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// One `metric,value` row per figure, then one row per month and quarter bucket.
pub fn metrics_to_csv(metrics: &Metrics) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["metric", "value"])?;
    let (first_break, last_break) = metrics
        .first_last_break
        .as_ref()
        .map(|b| (b.first.clone(), b.last.clone()))
        .unwrap_or_default();
    let rows = [
        ("total_effective_days", metrics.total_effective_days.to_string()),
        ("bonus_days", metrics.bonus_days.to_string()),
        ("average_efficiency", format!("{:.2}", metrics.average_efficiency)),
        ("bridges_used", metrics.bridges_used.to_string()),
        ("long_weekends", metrics.long_weekends.to_string()),
        ("rest_blocks", metrics.rest_blocks.to_string()),
        ("max_working_period", metrics.max_working_period.to_string()),
        ("first_break", first_break),
        ("last_break", last_break),
        ("working_days_per_month", format!("{:.1}", metrics.working_days_per_month)),
    ];
    for (name, value) in rows {
        writer.write_record([name.to_string(), value])?;
    }
    for (month, count) in MONTHS.iter().zip(metrics.monthly_dist) {
        writer.write_record([format!("month_{month}"), count.to_string()])?;
    }
    for (index, count) in metrics.quarter_dist.iter().enumerate() {
        writer.write_record([format!("quarter_q{}", index + 1), count.to_string()])?;
    }
    for (index, count) in metrics.long_blocks_per_quarter.iter().enumerate() {
        writer.write_record([format!("long_blocks_q{}", index + 1), count.to_string()])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{bridges_to_csv, metrics_to_csv, suggestion_to_csv};
    use crate::calendar::CalendarContext;
    use crate::optimizer::assemble_suggestion;
    use crate::types::{Bridge, Holiday, Strategy};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn writes_one_row_per_day() {
        let ctx = CalendarContext::new(
            &[date(2026, 10, 1)],
            &[Holiday::national(date(2026, 10, 15), "Founders Day")],
            date(2026, 1, 1),
            false,
        );
        let bridge = Bridge::try_new(
            date(2026, 10, 15),
            date(2026, 10, 18),
            vec![date(2026, 10, 16)],
            1,
        )
        .expect("bridge");
        let suggestion = assemble_suggestion(
            &ctx,
            vec![date(2026, 10, 16), date(2026, 10, 7)],
            vec![bridge.clone()],
            Strategy::Grouped,
        );
        let csv = suggestion_to_csv(&suggestion).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2026-10-07,Wed,,,");
        assert_eq!(lines[2], "2026-10-16,Fri,2026-10-15,2026-10-18,4.00");

        let bridges = bridges_to_csv(&[bridge]).expect("csv");
        assert!(bridges.contains("2026-10-15,2026-10-18,1,4,4.00,1"));
    }

    #[test]
    fn writes_metric_rows_and_buckets() {
        let ctx = CalendarContext::new(
            &[date(2026, 10, 1)],
            &[Holiday::national(date(2026, 10, 15), "Founders Day")],
            date(2026, 1, 1),
            false,
        );
        let bridge = Bridge::try_new(
            date(2026, 10, 15),
            date(2026, 10, 18),
            vec![date(2026, 10, 16)],
            1,
        )
        .expect("bridge");
        let suggestion = assemble_suggestion(
            &ctx,
            vec![date(2026, 10, 16)],
            vec![bridge],
            Strategy::Grouped,
        );
        let csv = metrics_to_csv(&suggestion.metrics).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "metric,value");
        assert!(lines.contains(&"total_effective_days,4"));
        assert!(lines.contains(&"bonus_days,3"));
        assert!(lines.contains(&"first_break,October"));
        assert!(lines.contains(&"month_oct,1"));
        assert!(lines.contains(&"month_jan,0"));
        assert!(lines.contains(&"quarter_q4,1"));
        assert!(lines.contains(&"long_blocks_q4,0"));
        // header + 10 figures + 12 months + 4 quarters + 4 long-block quarters
        assert_eq!(lines.len(), 31);
    }
}
