use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::BTreeMap;
use crate::models::price::{PricePoint, PriceSeries};
use crate::models::window::{
    DayReport, TimeWindow, WindowOutcome, WindowReport, WindowSummary, WindowedStats,
};

/// 按序列时区的自然日分组，日期升序
pub fn partition_by_day(series: &PriceSeries) -> BTreeMap<NaiveDate, Vec<&PricePoint>> {
    let mut days: BTreeMap<NaiveDate, Vec<&PricePoint>> = BTreeMap::new();
    for point in series.points() {
        days.entry(point.timestamp.date_naive())
            .or_insert_with(Vec::new)
            .push(point);
    }
    days
}

/// 计算某一天某一时段的结果，起止时刻均为闭区间
pub fn summarize_window(
    date: NaiveDate,
    day_points: &[&PricePoint],
    window: &TimeWindow,
    series: &PriceSeries,
) -> WindowOutcome {
    let (start, end) = match window.bounds(date, series.tz()) {
        Ok(bounds) => bounds,
        Err(e) => {
            warn!("Window {} on {} skipped: {}", window.name, date, e);
            return WindowOutcome::Failed(e.to_string());
        }
    };

    let selected: Vec<&PricePoint> = day_points
        .iter()
        .copied()
        .filter(|p| p.timestamp >= start && p.timestamp <= end)
        .collect();

    if selected.is_empty() {
        return WindowOutcome::NoData;
    }

    match WindowSummary::from_points(&selected) {
        Ok(summary) => WindowOutcome::Summary(summary),
        Err(e) => {
            warn!("Window {} on {} failed: {}", window.name, date, e);
            WindowOutcome::Failed(e.to_string())
        }
    }
}

/// 对每一天、每个时段计算统计结果
pub fn summarize(series: &PriceSeries, windows: &[TimeWindow]) -> WindowedStats {
    let days = partition_by_day(series)
        .into_iter()
        .map(|(date, day_points)| {
            debug!("{}: {} bars", date, day_points.len());
            let windows = windows
                .iter()
                .map(|window| WindowReport {
                    window: window.name.clone(),
                    outcome: summarize_window(date, &day_points, window, series),
                    empty_hint: window.empty_hint.clone(),
                })
                .collect();
            DayReport { date, windows }
        })
        .collect();

    WindowedStats { tz: series.tz(), days }
}
