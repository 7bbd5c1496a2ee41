use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use crate::errors::{Result, IntradayError};

// 时钟时间解析，支持 HH:MM 与 HH:MM:SS
pub fn parse_clock_time(text: &str) -> Result<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| IntradayError::InvalidWindow(format!("Invalid clock time: {}", text)))
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| IntradayError::TimezoneError(format!("{}: {}", name, e)))
}

// 拆分 "5d" / "15m" / "1wk" 这类令牌
fn split_token(token: &str) -> Result<(u32, &str)> {
    let token = token.trim();
    let digits = token.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits == token.len() {
        return Err(IntradayError::InvalidParameter(format!("Invalid token: {:?}", token)));
    }
    let count = token[..digits].parse::<u32>()?;
    if count == 0 {
        return Err(IntradayError::InvalidParameter(format!("Token count must be positive: {:?}", token)));
    }
    Ok((count, &token[digits..]))
}

/// 回看周期令牌转换为时长
pub fn parse_period(token: &str) -> Result<Duration> {
    let (count, unit) = split_token(token)?;
    let days = match unit {
        "d" => 1,
        "wk" => 7,
        "mo" => 30,
        "y" => 365,
        _ => return Err(IntradayError::InvalidParameter(format!("Unknown period unit: {:?}", token))),
    };
    Ok(Duration::days(i64::from(count) * days))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl IntervalUnit {
    /// Polygon 聚合接口使用的 timespan 名称
    pub fn timespan(&self) -> &'static str {
        match self {
            IntervalUnit::Minute => "minute",
            IntervalUnit::Hour => "hour",
            IntervalUnit::Day => "day",
            IntervalUnit::Week => "week",
            IntervalUnit::Month => "month",
        }
    }
}

/// 采样粒度，例如 5m = 5 x Minute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub multiplier: u32,
    pub unit: IntervalUnit,
}

pub fn parse_interval(token: &str) -> Result<Interval> {
    let (multiplier, unit) = split_token(token)?;
    let unit = match unit {
        "m" => IntervalUnit::Minute,
        "h" => IntervalUnit::Hour,
        "d" => IntervalUnit::Day,
        "wk" => IntervalUnit::Week,
        "mo" => IntervalUnit::Month,
        _ => return Err(IntradayError::InvalidParameter(format!("Unknown interval unit: {:?}", token))),
    };
    Ok(Interval { multiplier, unit })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_accepts_both_forms() {
        assert_eq!(parse_clock_time("16:00").unwrap(), NaiveTime::from_hms_opt(16, 0, 0).unwrap());
        assert_eq!(parse_clock_time("23:59:59").unwrap(), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        assert!(parse_clock_time("24:00").is_err());
        assert!(parse_clock_time("noon").is_err());
    }

    #[test]
    fn period_tokens() {
        assert_eq!(parse_period("5d").unwrap(), Duration::days(5));
        assert_eq!(parse_period("2wk").unwrap(), Duration::days(14));
        assert_eq!(parse_period("1mo").unwrap(), Duration::days(30));
        assert!(parse_period("0d").is_err());
        assert!(parse_period("d").is_err());
        assert!(parse_period("5").is_err());
        assert!(parse_period("5x").is_err());
    }

    #[test]
    fn interval_tokens() {
        assert_eq!(
            parse_interval("5m").unwrap(),
            Interval { multiplier: 5, unit: IntervalUnit::Minute }
        );
        assert_eq!(parse_interval("1h").unwrap().unit.timespan(), "hour");
        assert!(parse_interval("1s").is_err());
    }

    #[test]
    fn timezone_names() {
        assert_eq!(parse_timezone("Asia/Shanghai").unwrap(), chrono_tz::Asia::Shanghai);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
