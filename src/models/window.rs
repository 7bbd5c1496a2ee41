use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use crate::errors::{Result, IntradayError};
use crate::models::price::PricePoint;
use crate::util;

/// 每日固定的时钟时段，例如 16:00 - 16:30
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub description: String,
    /// 无数据时附在 "No data available" 后的提示
    pub empty_hint: Option<String>,
}

impl TimeWindow {
    /// 创建时段，开始时间不得晚于结束时间（不跨午夜）
    pub fn new(name: &str, start: NaiveTime, end: NaiveTime, description: &str) -> Result<Self> {
        if start > end {
            return Err(IntradayError::InvalidWindow(format!(
                "{}: start {} is after end {}", name, start, end
            )));
        }
        Ok(Self {
            name: name.to_string(),
            start,
            end,
            description: description.to_string(),
            empty_hint: None,
        })
    }

    pub fn with_empty_hint(mut self, hint: &str) -> Self {
        self.empty_hint = Some(hint.to_string());
        self
    }

    pub fn parse(name: &str, start: &str, end: &str, description: &str) -> Result<Self> {
        Self::new(name, util::parse_clock_time(start)?, util::parse_clock_time(end)?, description)
    }

    /// 解析命令行格式 "START-END[=DESCRIPTION]"，名称取 "START - END"
    pub fn from_arg(arg: &str) -> Result<Self> {
        let (range, description) = match arg.split_once('=') {
            Some((range, desc)) => (range, desc.trim()),
            None => (arg, ""),
        };
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| IntradayError::InvalidWindow(format!("Expected START-END, got {:?}", arg)))?;
        let name = format!("{} - {}", start.trim(), end.trim());
        Self::parse(&name, start, end, description)
    }

    /// 将时段落到某一天，得到带时区的起止时刻
    pub fn bounds(&self, date: NaiveDate, tz: Tz) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
        let start = tz
            .from_local_datetime(&date.and_time(self.start))
            .earliest()
            .ok_or_else(|| nonexistent(date, self.start, tz))?;
        let end = tz
            .from_local_datetime(&date.and_time(self.end))
            .latest()
            .ok_or_else(|| nonexistent(date, self.end, tz))?;
        Ok((start, end))
    }
}

fn nonexistent(date: NaiveDate, time: NaiveTime, tz: Tz) -> IntradayError {
    IntradayError::TimezoneError(format!("{} {} does not exist in {}", date, time, tz))
}

/// 时段内的开高低收统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub change: f64,
    pub change_pct: f64,
    pub volatility: f64,
}

impl WindowSummary {
    /// `points` 须已按时间排序且非空
    pub fn from_points(points: &[&PricePoint]) -> Result<Self> {
        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(IntradayError::DataError("Cannot summarize an empty window".to_string())),
        };

        let open = first.open;
        let close = last.close;
        let high = points.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
        let low = points.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);
        let change = close - open;

        if open == 0.0 {
            return Err(IntradayError::DivisionUndefined(format!(
                "open price is 0 at {}, percentage change undefined", first.timestamp
            )));
        }

        Ok(Self {
            open,
            close,
            high,
            low,
            change,
            change_pct: change / open * 100.0,
            volatility: high - low,
        })
    }
}

/// 单个 (日期, 时段) 的计算结果
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    Summary(WindowSummary),
    /// 该时段当天没有任何K线
    NoData,
    /// 计算失败，仅影响该时段
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowReport {
    pub window: String,
    pub outcome: WindowOutcome,
    pub empty_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub date: NaiveDate,
    pub windows: Vec<WindowReport>,
}

/// (日期, 时段名) -> 结果；日期升序，时段按配置顺序
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedStats {
    pub tz: Tz,
    pub days: Vec<DayReport>,
}

impl WindowedStats {
    pub fn get(&self, date: NaiveDate, window: &str) -> Option<&WindowOutcome> {
        self.days
            .iter()
            .find(|d| d.date == date)?
            .windows
            .iter()
            .find(|w| w.window == window)
            .map(|w| &w.outcome)
    }
}
