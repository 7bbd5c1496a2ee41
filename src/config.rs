use chrono_tz::Tz;
use log::info;
use std::time::Duration;
use crate::models::window::TimeWindow;
use crate::services::indicators::{IndicatorParams, DEFAULT_TARGET_POINTS};

/// 备用代理地址的环境变量
pub const PROXY_ENV: &str = "MARKET_DATA_PROXY";

pub struct Config {
    pub target_tz: Tz,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub proxy_url: Option<String>,
    pub windows: Vec<TimeWindow>,
    pub chart_target_points: usize,
    pub indicators: IndicatorParams,
}

impl Config {
    pub fn new() -> Self {
        Self {
            target_tz: chrono_tz::Asia::Shanghai,
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            proxy_url: None,
            windows: default_windows(),
            chart_target_points: DEFAULT_TARGET_POINTS,
            indicators: IndicatorParams::default(),
        }
    }

    pub fn with_target_tz(mut self, tz: Tz) -> Self {
        self.target_tz = tz;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_proxy_url(mut self, url: Option<&str>) -> Self {
        self.proxy_url = url.map(|u| u.to_string());
        self
    }

    // 从环境变量读取代理，空值视为未配置
    pub fn with_proxy_from_env(self) -> Self {
        match std::env::var(PROXY_ENV) {
            Ok(url) if !url.trim().is_empty() => {
                info!("Using fallback proxy from {}", PROXY_ENV);
                self.with_proxy_url(Some(url.trim()))
            }
            _ => self,
        }
    }

    pub fn with_windows(mut self, windows: Vec<TimeWindow>) -> Self {
        self.windows = windows;
        self
    }

    pub fn with_chart_target_points(mut self, points: usize) -> Self {
        self.chart_target_points = points;
        self
    }

    pub fn with_indicators(mut self, params: IndicatorParams) -> Self {
        self.indicators = params;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// 欧盘开盘与美盘重叠两个时段（北京时间）
pub fn default_windows() -> Vec<TimeWindow> {
    vec![
        TimeWindow::parse("16:00 - 16:30", "16:00", "16:30", "European Open")
            .expect("static window definition"),
        TimeWindow::parse("21:00 - 24:00", "21:00", "23:59:59", "US Open / Overlap")
            .expect("static window definition")
            .with_empty_hint("or Market Closed"),
    ]
}
