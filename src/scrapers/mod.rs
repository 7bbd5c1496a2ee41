pub mod base;
pub mod polygon;
pub mod yahoo;

use std::str::FromStr;
use crate::errors::{Result, IntradayError};
use base::SeriesSource;
use polygon::PolygonScraper;
use yahoo::YahooScraper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Yahoo,
    Polygon,
}

impl FromStr for SourceKind {
    type Err = IntradayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(SourceKind::Yahoo),
            "polygon" => Ok(SourceKind::Polygon),
            _ => Err(IntradayError::InvalidParameter(format!("Unknown source: {}", s))),
        }
    }
}

/// 同一数据源的直连与备用通道；未配置代理时备用通道同样直连
pub fn build_source_pair(
    kind: SourceKind,
    proxy: Option<&str>,
) -> Result<(Box<dyn SeriesSource>, Box<dyn SeriesSource>)> {
    let pair: (Box<dyn SeriesSource>, Box<dyn SeriesSource>) = match kind {
        SourceKind::Yahoo => (
            Box::new(YahooScraper::new(None)?),
            Box::new(YahooScraper::new(proxy)?),
        ),
        SourceKind::Polygon => (
            Box::new(PolygonScraper::from_env(None)?),
            Box::new(PolygonScraper::from_env(proxy)?),
        ),
    };
    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_names() {
        assert_eq!("Yahoo".parse::<SourceKind>().unwrap(), SourceKind::Yahoo);
        assert_eq!("polygon".parse::<SourceKind>().unwrap(), SourceKind::Polygon);
        assert!("bloomberg".parse::<SourceKind>().is_err());
    }

    #[test]
    fn yahoo_pair_labels_transport() {
        let (primary, fallback) = build_source_pair(SourceKind::Yahoo, Some("http://127.0.0.1:7890")).unwrap();
        assert_eq!(primary.source_name(), "yahoo/direct");
        assert_eq!(fallback.source_name(), "yahoo/proxy");
    }
}
