use crate::error::InvoiceError;
use crate::service::InvoiceService;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

/// 查询参数
#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub shop_id: Option<String>,
    pub order_id: Option<String>,
}

impl InvoiceQuery {
    /// 两个参数都必须存在且非空
    fn ids(&self) -> Result<(&str, &str), InvoiceError> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }
        match (present(&self.shop_id), present(&self.order_id)) {
            (Some(shop_id), Some(order_id)) => Ok((shop_id, order_id)),
            _ => Err(InvoiceError::Validation),
        }
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 生成发票 PDF
pub async fn generate_invoice(
    State(service): State<Arc<InvoiceService>>,
    query: Result<Query<InvoiceQuery>, QueryRejection>,
) -> Response {
    // 查询串本身无法解析 (重复参数/非法编码) 也按缺参处理
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::error!(
                stage = InvoiceError::Validation.stage(),
                error = %rejection,
                "Rejected invoice request"
            );
            return InvoiceError::Validation.into_response();
        }
    };

    let (shop_id, order_id) = match query.ids() {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(
                shop_id = query.shop_id.as_deref().unwrap_or_default(),
                order_id = query.order_id.as_deref().unwrap_or_default(),
                stage = e.stage(),
                error = %e,
                "Rejected invoice request"
            );
            return e.into_response();
        }
    };

    match service.generate(shop_id, order_id).await {
        Ok(rendered) => {
            let file_id: String = rendered
                .order_id
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect();
            let disposition = format!("inline; filename=\"invoice-{}.pdf\"", file_id);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, rendered.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                rendered.bytes,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
