use std::sync::Arc;

use crate::error::{InvoiceError, RenderError};
use crate::render::InvoiceRenderer;
use crate::service::client::UpstreamClient;
use crate::service::normalizer::normalize;

/// 生成好的发票文档
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    pub order_id: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// 发票服务: 拉取 -> 合并 -> 渲染
pub struct InvoiceService {
    client: UpstreamClient,
    renderer: Arc<dyn InvoiceRenderer>,
}

impl InvoiceService {
    pub fn new(client: UpstreamClient, renderer: Arc<dyn InvoiceRenderer>) -> Self {
        Self { client, renderer }
    }

    /// 生成单张发票; 任一阶段失败都记录 shop_id / order_id / 阶段
    pub async fn generate(&self, shop_id: &str, order_id: &str) -> Result<RenderedInvoice, InvoiceError> {
        match self.run(shop_id, order_id).await {
            Ok(rendered) => {
                tracing::info!(
                    shop_id,
                    order_id,
                    bytes = rendered.bytes.len(),
                    "Invoice is ready"
                );
                Ok(rendered)
            }
            Err(e) => {
                tracing::error!(
                    shop_id,
                    order_id,
                    stage = e.stage(),
                    error = %e,
                    "Error fetching invoice data"
                );
                Err(e)
            }
        }
    }

    async fn run(&self, shop_id: &str, order_id: &str) -> Result<RenderedInvoice, InvoiceError> {
        let payloads = self.client.fetch(shop_id, order_id).await?;
        let invoice = normalize(&payloads.orders, &payloads.shop)?;

        // 渲染是纯 CPU 计算, 放到阻塞线程池
        let renderer = Arc::clone(&self.renderer);
        let invoice_id = invoice.order_id.clone();
        let bytes = tokio::task::spawn_blocking(move || renderer.render(&invoice))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))??;

        Ok(RenderedInvoice {
            order_id: invoice_id,
            content_type: self.renderer.content_type(),
            bytes,
        })
    }
}
