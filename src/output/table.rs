use chrono::Datelike;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::metrics::Metrics;
use crate::types::{Bridge, Suggestion};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn efficiency_cell(efficiency: f64) -> Cell {
    let text = format!("{efficiency:.2}");
    if efficiency >= 4.0 {
        Cell::new(text).fg(Color::Green)
    } else if efficiency >= 3.0 {
        Cell::new(text).fg(Color::Yellow)
    } else {
        Cell::new(text)
    }
}

pub fn render_suggestion_table(suggestion: &Suggestion) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Date", "Weekday", "Bridge", "Effective", "Efficiency"]);

    for day in &suggestion.days {
        let bridge = suggestion.bridges.iter().find(|b| b.uses(*day));
        let (span, effective, efficiency) = match bridge {
            Some(b) => (
                format!("{} -> {}", b.start_date, b.end_date),
                Cell::new(b.effective_days),
                efficiency_cell(b.efficiency),
            ),
            None => ("standalone".to_string(), Cell::new(1), Cell::new("-")),
        };
        table.add_row(Row::from(vec![
            Cell::new(day.to_string()),
            Cell::new(day.weekday().to_string()),
            Cell::new(span),
            effective,
            efficiency,
        ]));
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\n{} PTO days -> {} days off ({:.2} per PTO day, strategy {})",
        suggestion.days.len(),
        suggestion.total_effective_days(),
        suggestion.efficiency(),
        suggestion.strategy
    ));
    out
}

pub fn render_bridges_table(bridges: &[Bridge]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Rank",
        "Span",
        "PTO days",
        "Effective",
        "Efficiency",
        "Holidays",
    ]);
    for (index, bridge) in bridges.iter().enumerate() {
        let pto = bridge
            .pto_days
            .iter()
            .map(|d| d.format("%a %d %b").to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(Row::from(vec![
            Cell::new(index + 1),
            Cell::new(format!("{} -> {}", bridge.start_date, bridge.end_date)),
            Cell::new(pto),
            Cell::new(bridge.effective_days),
            efficiency_cell(bridge.efficiency),
            Cell::new(bridge.holiday_connections),
        ]));
    }
    table.to_string()
}

pub fn render_alternatives_table(primary: &Suggestion, alternatives: &[Suggestion]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Option", "PTO days", "Days off", "Efficiency", "Dates"]);

    let rows = std::iter::once(("primary".to_string(), primary)).chain(
        alternatives
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("#{}", i + 1), s)),
    );
    for (label, suggestion) in rows {
        let dates = suggestion
            .days
            .iter()
            .map(|d| d.format("%d %b").to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(Row::from(vec![
            Cell::new(label),
            Cell::new(suggestion.days.len()),
            Cell::new(suggestion.total_effective_days()),
            efficiency_cell(suggestion.efficiency()),
            Cell::new(dates),
        ]));
    }
    table.to_string()
}

pub fn render_metrics_table(metrics: &Metrics) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);

    let breaks = metrics
        .first_last_break
        .as_ref()
        .map(|b| format!("{} .. {}", b.first, b.last))
        .unwrap_or_else(|| "-".to_string());
    let monthly = metrics
        .monthly_dist
        .iter()
        .zip(MONTHS)
        .filter(|(count, _)| **count > 0)
        .map(|(count, month)| format!("{month}:{count}"))
        .collect::<Vec<_>>()
        .join(" ");
    let quarters = |values: &[u32; 4]| {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("Q{}:{v}", i + 1))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let rows: Vec<(&str, String)> = vec![
        ("Total days off", metrics.total_effective_days.to_string()),
        ("Bonus days", metrics.bonus_days.to_string()),
        ("Average efficiency", format!("{:.2}", metrics.average_efficiency)),
        ("Bridges used", metrics.bridges_used.to_string()),
        ("Long weekends", metrics.long_weekends.to_string()),
        ("Rest blocks", metrics.rest_blocks.to_string()),
        ("Longest working stretch", metrics.max_working_period.to_string()),
        ("First / last break", breaks),
        ("Workdays per month", format!("{:.1}", metrics.working_days_per_month)),
        ("By quarter", quarters(&metrics.quarter_dist)),
        ("Long blocks by quarter", quarters(&metrics.long_blocks_per_quarter)),
        ("By month", if monthly.is_empty() { "-".to_string() } else { monthly }),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::{render_alternatives_table, render_metrics_table, render_suggestion_table};
    use crate::metrics::Metrics;
    use crate::types::{Strategy, Suggestion};

    #[test]
    fn renders_empty_views() {
        let empty = Suggestion::empty(Strategy::Balanced);
        assert!(render_suggestion_table(&empty).contains("0 PTO days -> 0 days off"));
        assert!(render_alternatives_table(&empty, &[]).contains("primary"));
        let metrics = render_metrics_table(&Metrics::default());
        assert!(metrics.contains("Bonus days"));
        assert!(metrics.contains("Q1:0 Q2:0 Q3:0 Q4:0"));
    }
}
