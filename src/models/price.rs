use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use log::{debug, warn};
use crate::errors::{Result, IntradayError};

/// 单根K线，时间戳已带时区
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Tz>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

/// 按时间严格递增、同一时区的价格序列
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    tz: Tz,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// 校验顺序与时区后构建序列
    pub fn new(symbol: &str, tz: Tz, points: Vec<PricePoint>) -> Result<Self> {
        if let Some(p) = points.iter().find(|p| p.timestamp.timezone() != tz) {
            return Err(IntradayError::DataError(format!(
                "Point {} is not in series timezone {}", p.timestamp, tz
            )));
        }
        if let Some(pair) = points.windows(2).find(|w| w[0].timestamp >= w[1].timestamp) {
            return Err(IntradayError::DataError(format!(
                "Timestamps not strictly increasing: {} then {}", pair[0].timestamp, pair[1].timestamp
            )));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            tz,
            points,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

/// 供应商返回的原始K线，时间戳尚未带时区
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub symbol: String,
    /// 数据源时区，缺省视为 UTC
    pub timezone: Option<Tz>,
    pub bars: Vec<RawBar>,
}

impl RawSeries {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 本地化到数据源时区，再转换到目标时区，排序并去重
    pub fn normalize(self, target: Tz) -> Result<PriceSeries> {
        let source = self.timezone.unwrap_or(Tz::UTC);
        let mut points = Vec::with_capacity(self.bars.len());

        for bar in &self.bars {
            let localized = match source.from_local_datetime(&bar.timestamp).earliest() {
                Some(dt) => dt,
                None => {
                    warn!("Skipping bar at nonexistent local time {} in {}", bar.timestamp, source);
                    continue;
                }
            };
            points.push(PricePoint {
                timestamp: localized.with_timezone(&target),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            });
        }

        points.sort_by_key(|p| p.timestamp);
        let before = points.len();
        points.dedup_by_key(|p| p.timestamp);
        if points.len() < before {
            warn!("Dropped {} duplicate bars for {}", before - points.len(), self.symbol);
        }

        debug!("Normalized {} bars for {} from {} to {}", points.len(), self.symbol, source, target);
        PriceSeries::new(&self.symbol, target, points)
    }
}
