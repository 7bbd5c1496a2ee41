use crate::models::price::{RawBar, RawSeries};
use crate::errors::{Result, IntradayError};
use crate::scrapers::base::{build_client, transport_label, FetchRequest, SeriesSource};
use crate::util;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use log::{debug, info, warn};

const AGGS_URL: &str = "https://api.polygon.io/v2/aggs/ticker";

/// API key 的环境变量
pub const API_KEY_ENV: &str = "POLYGON_API_KEY";

#[derive(Debug, Deserialize)]
struct AggsResponse {
    status: Option<String>,
    error: Option<String>,
    message: Option<String>,
    #[serde(default)]
    results: Vec<AggBar>,
}

#[derive(Debug, Deserialize)]
struct AggBar {
    /// 毫秒时间戳
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: Option<f64>,
}

/// Polygon 聚合K线抓取器
pub struct PolygonScraper {
    client: Client,
    api_key: String,
    label: String,
}

impl PolygonScraper {
    pub fn new(api_key: &str, proxy: Option<&str>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(IntradayError::InvalidParameter(format!("{} is empty", API_KEY_ENV)));
        }
        Ok(Self {
            client: build_client(proxy)?,
            api_key: api_key.trim().to_string(),
            label: transport_label("polygon", proxy),
        })
    }

    pub fn from_env(proxy: Option<&str>) -> Result<Self> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| IntradayError::InvalidParameter(format!("{} is not set", API_KEY_ENV)))?;
        Self::new(&key, proxy)
    }
}

/// 回看周期换算成 [from, to] 日期区间，截止到 `today`
pub fn date_range(period: &str, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let span = util::parse_period(period)?;
    Ok((today - span, today))
}

fn parse_aggs(symbol: &str, body: &str) -> Result<RawSeries> {
    let response: AggsResponse = serde_json::from_str(body)?;

    if let Some(status) = response.status.as_deref() {
        if status != "OK" && status != "DELAYED" {
            let detail = response.error.or(response.message).unwrap_or_default();
            return Err(IntradayError::TransportFailure(format!("Polygon status {} for {}: {}", status, symbol, detail)));
        }
    }

    let mut bars = Vec::with_capacity(response.results.len());
    for agg in response.results {
        match DateTime::from_timestamp_millis(agg.t) {
            Some(dt) => bars.push(RawBar {
                timestamp: dt.naive_utc(),
                open: agg.o,
                high: agg.h,
                low: agg.l,
                close: agg.c,
                volume: agg.v,
            }),
            None => warn!("Skipping aggregate with invalid timestamp {}", agg.t),
        }
    }

    // 毫秒时间戳不带时区信息，归一化时按 UTC 处理
    Ok(RawSeries {
        symbol: symbol.to_string(),
        timezone: None,
        bars,
    })
}

#[async_trait]
impl SeriesSource for PolygonScraper {
    fn source_name(&self) -> &str {
        &self.label
    }

    async fn fetch_series(&self, request: &FetchRequest) -> Result<RawSeries> {
        let interval = util::parse_interval(&request.interval)?;
        let (from, to) = date_range(&request.period, Utc::now().date_naive())?;
        info!("[{}] 获取 {} 行情 {} ~ {} ({})", self.label, request.symbol, from, to, request.interval);

        let url = format!(
            "{}/{}/range/{}/{}/{}/{}",
            AGGS_URL,
            request.symbol,
            interval.multiplier,
            interval.unit.timespan(),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        );

        let response = self.client
            .get(url)
            .query(&[
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", "50000"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| IntradayError::TransportFailure(e.without_url().to_string()))?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(IntradayError::TransportFailure(format!("HTTP status {} for {}", status, request.symbol)));
        }

        let series = parse_aggs(&request.symbol, &text)?;
        debug!("获取到 {} 条K线记录", series.bars.len());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_ends_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let (from, to) = date_range("1d", today).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        assert_eq!(to, today);
    }

    #[test]
    fn parses_aggregates() {
        let body = r#"{"ticker":"X:ETHUSD","status":"OK","resultsCount":2,"results":[
            {"v":1.5,"vw":3001.2,"o":3000.0,"c":3002.0,"h":3003.0,"l":2999.0,"t":1714953600000,"n":10},
            {"o":3002.0,"c":3001.0,"h":3004.0,"l":3000.5,"t":1714953660000}
        ]}"#;
        let series = parse_aggs("X:ETHUSD", body).unwrap();
        assert_eq!(series.bars.len(), 2);
        assert_eq!(series.timezone, None);
        assert_eq!(series.bars[0].volume, Some(1.5));
        assert_eq!(series.bars[1].volume, None);
        assert_eq!(series.bars[1].timestamp.to_string(), "2024-05-06 00:01:00");
    }

    #[test]
    fn error_status_is_transport_failure() {
        let body = r#"{"status":"NOT_AUTHORIZED","request_id":"x","message":"Unknown API Key"}"#;
        assert!(matches!(parse_aggs("X:ETHUSD", body), Err(IntradayError::TransportFailure(_))));
    }

    #[test]
    fn no_results_is_empty() {
        let body = r#"{"ticker":"X:ETHUSD","status":"OK","resultsCount":0}"#;
        assert!(parse_aggs("X:ETHUSD", body).unwrap().is_empty());
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(PolygonScraper::new("  ", None).is_err());
    }
}
