//! 图表用指标：MACD 与 RSI。
//!
//! 所有指标都在抽样后的序列上计算，而不是原始分钟级序列。
//! EMA 使用首值作为种子的递推形式：
//! `ema[0] = x[0]`, `ema[i] = x[i] * a + ema[i-1] * (1 - a)`, `a = 2 / (period + 1)`。

use log::debug;
use ta::indicators::{ExponentialMovingAverage, MovingAverageConvergenceDivergence};
use ta::Next;
use crate::errors::{Result, IntradayError};
use crate::models::price::{PricePoint, PriceSeries};

/// 一天分钟线抽样后的目标点数
pub const DEFAULT_TARGET_POINTS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdParams {
    pub short: usize,
    pub long: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self { short: 12, long: 26, signal: 9 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub macd: MacdParams,
    pub rsi_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self { macd: MacdParams::default(), rsi_period: 14 }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("MACD short", self.macd.short),
            ("MACD long", self.macd.long),
            ("MACD signal", self.macd.signal),
            ("RSI", self.rsi_period),
        ];
        for (name, period) in periods {
            if period == 0 {
                return Err(IntradayError::InvalidParameter(format!("{} period must be >= 1", name)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// 抽样后的序列及与之逐点对齐的指标
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub points: Vec<PricePoint>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
    /// 预热期内为 None
    pub rsi: Vec<Option<f64>>,
}

/// 按总点数与目标点数求抽样步长，最小为 1
pub fn sample_stride(total: usize, target: usize) -> usize {
    if target == 0 {
        return 1;
    }
    (total / target).max(1)
}

/// 按位置每隔 `stride` 取一点，从第 0 点开始，不做聚合
pub fn downsample(points: &[PricePoint], stride: usize) -> Vec<PricePoint> {
    points.iter().step_by(stride.max(1)).copied().collect()
}

fn invalid_period(name: &str, e: impl std::fmt::Debug) -> IntradayError {
    IntradayError::InvalidParameter(format!("{} period: {:?}", name, e))
}

/// `ta` 的 EMA 以首值为种子，与上面的递推一致
pub fn ema(values: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut indicator = ExponentialMovingAverage::new(period)
        .map_err(|e| invalid_period("EMA", e))?;
    Ok(values.iter().map(|&value| indicator.next(value)).collect())
}

pub fn macd(values: &[f64], params: &MacdParams) -> Result<MacdLines> {
    let mut indicator = MovingAverageConvergenceDivergence::new(params.short, params.long, params.signal)
        .map_err(|e| invalid_period("MACD", e))?;

    let mut lines = MacdLines {
        macd: Vec::with_capacity(values.len()),
        signal: Vec::with_capacity(values.len()),
        histogram: Vec::with_capacity(values.len()),
    };
    for &value in values {
        let out = indicator.next(value);
        lines.macd.push(out.macd);
        lines.signal.push(out.signal);
        lines.histogram.push(out.histogram);
    }
    Ok(lines)
}

/// 简单滚动均值版 RSI。
///
/// 第一个差分按 0 计入涨跌；前 `period - 1` 个输出为 None。
/// 平均跌幅为 0 时返回 100，涨跌均为 0 时返回 50。
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    debug_assert!(period >= 1, "RSI period must be >= 1");
    let n = values.len();
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let delta = values[i] - values[i - 1];
        if delta > 0.0 {
            gains[i] = delta;
        } else if delta < 0.0 {
            losses[i] = -delta;
        }
    }

    (0..n)
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let from = i + 1 - period;
            let avg_gain = gains[from..=i].iter().sum::<f64>() / period as f64;
            let avg_loss = losses[from..=i].iter().sum::<f64>() / period as f64;
            Some(rsi_value(avg_gain, avg_loss))
        })
        .collect()
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// 抽样后计算 MACD / RSI
pub fn compute_indicators(
    series: &PriceSeries,
    sample_stride: usize,
    params: &IndicatorParams,
) -> Result<IndicatorSeries> {
    if sample_stride == 0 {
        return Err(IntradayError::InvalidParameter("sample stride must be >= 1".to_string()));
    }
    params.validate()?;

    let points = downsample(series.points(), sample_stride);
    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    debug!(
        "Sampled {} of {} points for {} (stride {})",
        points.len(), series.len(), series.symbol(), sample_stride
    );

    let MacdLines { macd, signal, histogram } = macd(&closes, &params.macd)?;
    let rsi = rsi(&closes, params.rsi_period);

    Ok(IndicatorSeries { points, macd, signal, histogram, rsi })
}
