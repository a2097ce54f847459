use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// 上游接口标识
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamApi {
    /// 订单明细接口, 载荷位于 `result.data`
    Orders,
    /// 店铺/客户信息接口, 载荷位于 `data`
    Shop,
}

impl fmt::Display for UpstreamApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamApi::Orders => f.write_str("API 1"),
            UpstreamApi::Shop => f.write_str("API 2"),
        }
    }
}

/// 上游载荷解析错误
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Invalid {0} response structure")]
    MissingStructure(UpstreamApi),

    #[error("Failed to parse invoice data from {api}")]
    MalformedJson {
        api: UpstreamApi,
        #[source]
        source: serde_json::Error,
    },

    #[error("No data found in {0} response")]
    EmptyResult(UpstreamApi),
}

/// PDF 渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read font file {path}: {source}")]
    FontIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid font file {path}: {reason}")]
    InvalidFont { path: String, reason: String },

    #[error("render task failed: {0}")]
    Task(String),
}

/// 发票生成流程中的错误
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("Missing required parameters")]
    Validation,

    #[error("{api} request failed: {source}")]
    Upstream {
        api: UpstreamApi,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl InvoiceError {
    /// 失败阶段, 用于日志
    pub fn stage(&self) -> &'static str {
        match self {
            InvoiceError::Validation => "validate",
            InvoiceError::Client(_) => "startup",
            InvoiceError::Upstream { .. } => "fetch",
            InvoiceError::Normalize(_) => "normalize",
            InvoiceError::Render(_) => "render",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for InvoiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            InvoiceError::Validation => (StatusCode::BAD_REQUEST, self.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch invoice data: {}", self),
            ),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
