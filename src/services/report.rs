use chrono_tz::Tz;
use crate::models::window::{DayReport, WindowOutcome, WindowReport, WindowSummary, WindowedStats};

pub const RULE_WIDTH: usize = 60;

pub fn format_summary(summary: &WindowSummary) -> Vec<String> {
    vec![
        format!("Open: {:.2} | Close: {:.2}", summary.open, summary.close),
        format!("High: {:.2} | Low: {:.2}", summary.high, summary.low),
        format!(
            "Change: {:+.2} ({:+.2}%) | Volatility: {:.2}",
            summary.change, summary.change_pct, summary.volatility
        ),
    ]
}

pub fn format_outcome(report: &WindowReport) -> Vec<String> {
    let window = &report.window;
    match &report.outcome {
        WindowOutcome::Summary(summary) => {
            let mut lines = vec![format!("  [{}]", window)];
            lines.extend(format_summary(summary).into_iter().map(|l| format!("    {}", l)));
            lines
        }
        WindowOutcome::NoData => match &report.empty_hint {
            Some(hint) => vec![format!("  [{}] No data available ({})", window, hint)],
            None => vec![format!("  [{}] No data available", window)],
        },
        WindowOutcome::Failed(reason) => vec![format!("  [{}] Error: {}", window, reason)],
    }
}

pub fn format_day(day: &DayReport) -> String {
    let mut out = format!("\nDate: {}\n", day.date.format("%Y-%m-%d"));
    for report in &day.windows {
        for line in format_outcome(report) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

/// 报告标题中的时区名，上海时区显示为 Beijing Time
pub fn zone_label(tz: Tz) -> String {
    if tz == chrono_tz::Asia::Shanghai {
        "Beijing Time".to_string()
    } else {
        tz.name().to_string()
    }
}

/// 完整的控制台报告
pub fn render(symbol: &str, stats: &WindowedStats) -> String {
    let mut out = format!(
        "\nAnalysis for {} ({})\n{}\n",
        symbol, zone_label(stats.tz), "-".repeat(RULE_WIDTH)
    );
    for day in &stats.days {
        out.push_str(&format_day(day));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::window::WindowReport;
    use chrono::NaiveDate;

    fn summary() -> WindowSummary {
        WindowSummary {
            open: 100.0,
            close: 101.0,
            high: 105.0,
            low: 99.0,
            change: 1.0,
            change_pct: 1.0,
            volatility: 6.0,
        }
    }

    #[test]
    fn summary_lines_use_two_decimals_and_signs() {
        let lines = format_summary(&summary());
        assert_eq!(lines[0], "Open: 100.00 | Close: 101.00");
        assert_eq!(lines[1], "High: 105.00 | Low: 99.00");
        assert_eq!(lines[2], "Change: +1.00 (+1.00%) | Volatility: 6.00");

        let down = WindowSummary { change: -2.5, change_pct: -2.5, ..summary() };
        assert_eq!(format_summary(&down)[2], "Change: -2.50 (-2.50%) | Volatility: 6.00");
    }

    #[test]
    fn report_lists_every_window() {
        let stats = WindowedStats {
            tz: chrono_tz::Asia::Shanghai,
            days: vec![DayReport {
                date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
                windows: vec![
                    WindowReport {
                        window: "16:00 - 16:30".to_string(),
                        outcome: WindowOutcome::Summary(summary()),
                        empty_hint: None,
                    },
                    WindowReport {
                        window: "21:00 - 24:00".to_string(),
                        outcome: WindowOutcome::NoData,
                        empty_hint: Some("or Market Closed".to_string()),
                    },
                    WindowReport {
                        window: "09:00 - 09:30".to_string(),
                        outcome: WindowOutcome::NoData,
                        empty_hint: None,
                    },
                ],
            }],
        };
        let text = render("GC=F", &stats);
        assert!(text.contains("Analysis for GC=F (Beijing Time)"));
        assert!(text.contains("Date: 2024-05-06"));
        assert!(text.contains("  [16:00 - 16:30]\n    Open: 100.00 | Close: 101.00"));
        assert!(text.contains("  [21:00 - 24:00] No data available (or Market Closed)\n"));
        assert!(text.contains("  [09:00 - 09:30] No data available\n"));
    }

    #[test]
    fn zone_labels() {
        assert_eq!(zone_label(chrono_tz::Asia::Shanghai), "Beijing Time");
        assert_eq!(zone_label(chrono_tz::UTC), "UTC");
        assert_eq!(zone_label(chrono_tz::America::New_York), "America/New_York");
    }

    #[test]
    fn day_block_ends_each_line_with_newline() {
        let day = DayReport {
            date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            windows: vec![WindowReport {
                window: "16:00 - 16:30".to_string(),
                outcome: WindowOutcome::Failed("open price is 0".to_string()),
                empty_hint: None,
            }],
        };
        assert_eq!(format_day(&day), "\nDate: 2024-05-06\n  [16:00 - 16:30] Error: open price is 0\n");
    }
}
