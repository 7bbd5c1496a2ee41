// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod services;
pub mod scrapers;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::price::{PricePoint, PriceSeries, RawBar, RawSeries};
pub use models::window::{TimeWindow, WindowOutcome, WindowSummary, WindowedStats};
pub use services::indicators::{compute_indicators, IndicatorSeries};
pub use services::window_stats::summarize;
pub use config::Config;
pub use errors::{Result, IntradayError};
