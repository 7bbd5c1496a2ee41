use crate::config::Config;
use crate::errors::{Result, IntradayError};
use crate::models::price::{PriceSeries, RawSeries};
use crate::scrapers::base::{FetchRequest, SeriesSource};
use log::{info, warn};
use std::time::Duration;

// 单次尝试；空结果按失败处理
async fn attempt(source: &dyn SeriesSource, request: &FetchRequest) -> Result<RawSeries> {
    let raw = source.fetch_series(request).await?;
    if raw.is_empty() {
        return Err(IntradayError::EmptyResult { symbol: request.symbol.clone() });
    }
    Ok(raw)
}

/// 先直连一次，失败或为空时改走备用通道，最多重试 `max_retries` 次，
/// 每次间隔固定 `retry_delay`，首次成功即返回。
/// 令牌不合法时直接返回 `InvalidParameter`，不发起任何请求。
pub async fn fetch_with_fallback(
    primary: &dyn SeriesSource,
    fallback: &dyn SeriesSource,
    request: &FetchRequest,
    max_retries: u32,
    retry_delay: Duration,
) -> Result<RawSeries> {
    request.validate()?;

    match attempt(primary, request).await {
        Ok(raw) => return Ok(raw),
        Err(e) => warn!("[{}] {} failed: {}", primary.source_name(), request.symbol, e),
    }

    for n in 1..=max_retries {
        if n > 1 {
            tokio::time::sleep(retry_delay).await;
        }
        info!("[{}] retry {}/{} for {}", fallback.source_name(), n, max_retries, request.symbol);
        match attempt(fallback, request).await {
            Ok(raw) => return Ok(raw),
            Err(e) => warn!("[{}] attempt {} failed: {}", fallback.source_name(), n, e),
        }
    }

    Err(IntradayError::DataUnavailable {
        symbol: request.symbol.clone(),
        attempts: max_retries + 1,
    })
}

/// 获取并归一化到配置的目标时区
pub async fn acquire(
    primary: &dyn SeriesSource,
    fallback: &dyn SeriesSource,
    request: &FetchRequest,
    config: &Config,
) -> Result<PriceSeries> {
    let raw = fetch_with_fallback(primary, fallback, request, config.max_retries, config.retry_delay).await?;
    let series = raw.normalize(config.target_tz)?;
    info!("Fetched {} bars for {} ({})", series.len(), series.symbol(), series.tz());
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price::RawBar;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    enum Reply {
        Bars(usize),
        Fail,
    }

    struct FakeSource {
        name: &'static str,
        replies: Mutex<VecDeque<Reply>>,
        calls: Mutex<u32>,
    }

    impl FakeSource {
        fn new(name: &'static str, replies: Vec<Reply>) -> Self {
            Self {
                name,
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl SeriesSource for FakeSource {
        fn source_name(&self) -> &str {
            self.name
        }

        async fn fetch_series(&self, request: &FetchRequest) -> Result<RawSeries> {
            *self.calls.lock().unwrap() += 1;
            let reply = self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Fail);
            match reply {
                Reply::Fail => Err(IntradayError::TransportFailure("connection reset".to_string())),
                Reply::Bars(n) => {
                    let start = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap().and_hms_opt(8, 0, 0).unwrap();
                    let bars = (0..n)
                        .map(|i| RawBar {
                            timestamp: start + chrono::Duration::minutes(5 * i as i64),
                            open: 1.0,
                            high: 1.0,
                            low: 1.0,
                            close: 1.0,
                            volume: None,
                        })
                        .collect();
                    Ok(RawSeries { symbol: request.symbol.clone(), timezone: None, bars })
                }
            }
        }
    }

    fn request() -> FetchRequest {
        FetchRequest::new("GC=F", "5d", "5m")
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let primary = FakeSource::new("direct", vec![Reply::Bars(3)]);
        let fallback = FakeSource::new("proxy", vec![]);
        let raw = fetch_with_fallback(&primary, &fallback, &request(), 3, Duration::ZERO).await.unwrap();
        assert_eq!(raw.bars.len(), 3);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn fallback_short_circuits_on_first_success() {
        let primary = FakeSource::new("direct", vec![Reply::Fail]);
        let fallback = FakeSource::new("proxy", vec![Reply::Bars(0), Reply::Bars(2), Reply::Bars(9)]);
        let raw = fetch_with_fallback(&primary, &fallback, &request(), 3, Duration::ZERO).await.unwrap();
        assert_eq!(raw.bars.len(), 2);
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 2);
    }

    #[tokio::test]
    async fn empty_primary_triggers_fallback() {
        let primary = FakeSource::new("direct", vec![Reply::Bars(0)]);
        let fallback = FakeSource::new("proxy", vec![Reply::Bars(1)]);
        let raw = fetch_with_fallback(&primary, &fallback, &request(), 3, Duration::ZERO).await.unwrap();
        assert_eq!(raw.bars.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_is_data_unavailable() {
        let primary = FakeSource::new("direct", vec![]);
        let fallback = FakeSource::new("proxy", vec![]);
        let err = fetch_with_fallback(&primary, &fallback, &request(), 3, Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, IntradayError::DataUnavailable { attempts: 4, .. }));
        assert!(err.is_acquisition_failure());
        assert_eq!(fallback.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn bad_period_fails_without_calling_sources() {
        let primary = FakeSource::new("direct", vec![Reply::Bars(3)]);
        let fallback = FakeSource::new("proxy", vec![Reply::Bars(3)]);
        let started = tokio::time::Instant::now();
        let request = FetchRequest::new("GC=F", "5x", "5m");
        let config = Config::new();
        let err = acquire(&primary, &fallback, &request, &config).await.unwrap_err();
        assert!(matches!(err, IntradayError::InvalidParameter(_)));
        assert!(!err.is_acquisition_failure());
        assert_eq!(primary.calls(), 0);
        assert_eq!(fallback.calls(), 0);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_between_fallback_attempts() {
        let primary = FakeSource::new("direct", vec![]);
        let fallback = FakeSource::new("proxy", vec![]);
        let started = tokio::time::Instant::now();
        let _ = fetch_with_fallback(&primary, &fallback, &request(), 3, Duration::from_secs(2)).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn acquire_normalizes_to_target_tz() {
        let primary = FakeSource::new("direct", vec![Reply::Bars(2)]);
        let fallback = FakeSource::new("proxy", vec![]);
        let config = Config::new().with_retry_delay(Duration::ZERO);
        let series = acquire(&primary, &fallback, &request(), &config).await.unwrap();
        assert_eq!(series.tz(), chrono_tz::Asia::Shanghai);
        assert_eq!(series.points()[0].timestamp.format("%H:%M").to_string(), "16:00");
    }
}
