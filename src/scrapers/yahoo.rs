use crate::models::price::{RawBar, RawSeries};
use crate::errors::{Result, IntradayError};
use crate::scrapers::base::{build_client, transport_label, FetchRequest, SeriesSource};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde_json::Value;
use log::{debug, info};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance 图表接口抓取器
pub struct YahooScraper {
    client: Client,
    label: String,
}

impl YahooScraper {
    /// 创建抓取器，`proxy` 为 None 时直连
    pub fn new(proxy: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: build_client(proxy)?,
            label: transport_label("yahoo", proxy),
        })
    }
}

// 取 quote 中第 i 个数值，null 视为缺失
fn quote_value(quote: &Value, field: &str, i: usize) -> Option<f64> {
    quote.get(field)?.as_array()?.get(i)?.as_f64()
}

/// 解析图表接口返回的 JSON
pub fn parse_chart_response(symbol: &str, json: &Value) -> Result<RawSeries> {
    let chart = json.get("chart")
        .ok_or_else(|| IntradayError::TransportFailure("Missing chart object".to_string()))?;

    if let Some(error) = chart.get("error").filter(|e| !e.is_null()) {
        let message = error.get("description").and_then(|d| d.as_str()).unwrap_or("unknown error");
        return Err(IntradayError::TransportFailure(format!("Yahoo error for {}: {}", symbol, message)));
    }

    let mut bars = Vec::new();
    let result = match chart.get("result").and_then(|r| r.as_array()).and_then(|r| r.first()) {
        Some(result) => result,
        None => return Ok(RawSeries { symbol: symbol.to_string(), timezone: None, bars }),
    };

    if let Some(tz) = result.pointer("/meta/exchangeTimezoneName").and_then(|t| t.as_str()) {
        debug!("{} trades in {}", symbol, tz);
    }

    let timestamps = result.get("timestamp").and_then(|t| t.as_array());
    let quote = result.pointer("/indicators/quote/0");

    if let (Some(timestamps), Some(quote)) = (timestamps, quote) {
        for (i, ts) in timestamps.iter().enumerate() {
            let secs = match ts.as_i64() {
                Some(secs) => secs,
                None => continue,
            };
            let timestamp = match DateTime::from_timestamp(secs, 0) {
                Some(dt) => dt.naive_utc(),
                None => continue,
            };
            // 停牌或缺失的K线整行跳过
            if let (Some(open), Some(high), Some(low), Some(close)) = (
                quote_value(quote, "open", i),
                quote_value(quote, "high", i),
                quote_value(quote, "low", i),
                quote_value(quote, "close", i),
            ) {
                bars.push(RawBar {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume: quote_value(quote, "volume", i),
                });
            }
        }
    }

    // 时间戳为 Unix 秒，即 UTC
    Ok(RawSeries {
        symbol: symbol.to_string(),
        timezone: Some(chrono_tz::UTC),
        bars,
    })
}

#[async_trait]
impl SeriesSource for YahooScraper {
    fn source_name(&self) -> &str {
        &self.label
    }

    async fn fetch_series(&self, request: &FetchRequest) -> Result<RawSeries> {
        request.validate()?;
        info!("[{}] 获取 {} 行情 period={} interval={}", self.label, request.symbol, request.period, request.interval);

        let response = self.client
            .get(format!("{}/{}", CHART_URL, request.symbol))
            .query(&[
                ("range", request.period.as_str()),
                ("interval", request.interval.as_str()),
                ("includePrePost", "false"),
            ])
            .send()
            .await
            .map_err(|e| IntradayError::TransportFailure(e.to_string()))?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(IntradayError::TransportFailure(format!("HTTP status {} for {}", status, request.symbol)));
        }

        let json: Value = serde_json::from_str(&text)?;
        let series = parse_chart_response(&request.symbol, &json)?;
        debug!("获取到 {} 条K线记录", series.bars.len());
        Ok(series)
    }
}
