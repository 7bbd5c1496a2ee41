use crate::models::price::RawSeries;
use crate::errors::{Result, IntradayError};
use crate::util;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// One request to a market-data vendor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    /// Lookback token, e.g. "5d"
    pub period: String,
    /// Sampling token, e.g. "5m"
    pub interval: String,
}

impl FetchRequest {
    pub fn new(symbol: &str, period: &str, interval: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            period: period.to_string(),
            interval: interval.to_string(),
        }
    }

    /// 校验周期与粒度令牌；用户输入错误不应进入重试
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(IntradayError::InvalidParameter("symbol is empty".to_string()));
        }
        util::parse_period(&self.period)?;
        util::parse_interval(&self.interval)?;
        Ok(())
    }
}

/// Base trait for OHLC series sources
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Vendor and transport label used in logs, e.g. "yahoo/direct"
    fn source_name(&self) -> &str;

    /// Fetch OHLC rows for the request; an empty `bars` vec is a valid reply
    async fn fetch_series(&self, request: &FetchRequest) -> Result<RawSeries>;
}

/// 构建 HTTP 客户端；无代理时忽略系统代理环境变量，保证是直连
pub fn build_client(proxy: Option<&str>) -> Result<Client> {
    let builder = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("Mozilla/5.0 (compatible; intraday_windows)");

    let builder = match proxy {
        Some(url) => builder.proxy(Proxy::all(url).map_err(|e| {
            IntradayError::TransportFailure(format!("Invalid proxy {}: {}", url, e))
        })?),
        None => builder.no_proxy(),
    };

    builder.build().map_err(IntradayError::RequestError)
}

/// 传输通道标签
pub fn transport_label(vendor: &str, proxy: Option<&str>) -> String {
    match proxy {
        Some(_) => format!("{}/proxy", vendor),
        None => format!("{}/direct", vendor),
    }
}
