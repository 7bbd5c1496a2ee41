use thiserror::Error;
use std::num::ParseIntError;

#[derive(Error, Debug)]
pub enum IntradayError {
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Parse int error: {0}")]
    ParseIntError(#[from] ParseIntError),

    /// 网络或数据供应商返回的错误
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// 请求成功但没有任何数据行
    #[error("Empty result for {symbol}")]
    EmptyResult { symbol: String },

    /// 直连与所有备用通道均失败
    #[error("Data unavailable for {symbol} after {attempts} attempts")]
    DataUnavailable { symbol: String, attempts: u32 },

    #[error("Division undefined: {0}")]
    DivisionUndefined(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Timezone error: {0}")]
    TimezoneError(String),

    #[error("Data error: {0}")]
    DataError(String),
}

impl IntradayError {
    /// 是否属于获取阶段的可恢复错误（顶层只提示“无数据”）
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            IntradayError::TransportFailure(_)
                | IntradayError::EmptyResult { .. }
                | IntradayError::DataUnavailable { .. }
                | IntradayError::RequestError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, IntradayError>;
