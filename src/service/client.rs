use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::{InvoiceError, UpstreamApi};

/// 两个上游接口的原始响应
#[derive(Debug, Clone)]
pub struct RawPayloads {
    pub orders: Value,
    pub shop: Value,
}

/// 上游订单接口客户端
pub struct UpstreamClient {
    client: Client,
    orders_url: String,
    shop_url: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, InvoiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(InvoiceError::Client)?;

        Ok(Self {
            client,
            orders_url: config.api1_url.clone(),
            shop_url: config.api2_url.clone(),
        })
    }

    /// 并行请求两个接口, 任一失败即整体失败
    pub async fn fetch(&self, shop_id: &str, order_id: &str) -> Result<RawPayloads, InvoiceError> {
        // 两个接口的店铺参数大小写不同, 保持原样
        let orders = self.get_json(
            UpstreamApi::Orders,
            &self.orders_url,
            [("ShopId", shop_id), ("order_id", order_id)],
        );
        let shop = self.get_json(
            UpstreamApi::Shop,
            &self.shop_url,
            [("shop_id", shop_id), ("order_id", order_id)],
        );

        let (orders, shop) = futures::future::try_join(orders, shop).await?;
        Ok(RawPayloads { orders, shop })
    }

    async fn get_json(
        &self,
        api: UpstreamApi,
        url: &str,
        query: [(&str, &str); 2],
    ) -> Result<Value, InvoiceError> {
        tracing::debug!("GET {} ({}) {:?}", url, api, query);

        let upstream = |source| InvoiceError::Upstream { api, source };
        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?;

        response.json::<Value>().await.map_err(upstream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> UpstreamClient {
        client_with_timeout(server, 5)
    }

    fn client_with_timeout(server: &MockServer, timeout_secs: u64) -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            api1_url: format!("{}/orders", server.uri()),
            api2_url: format!("{}/shop", server.uri()),
            timeout_secs,
        })
        .expect("client construction should not fail")
    }

    #[tokio::test]
    async fn fetch_uses_each_upstreams_parameter_names() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/orders"))
            .and(query_param("ShopId", "S1"))
            .and(query_param("order_id", "O9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "data": "[]" } })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shop"))
            .and(query_param("shop_id", "S1"))
            .and(query_param("order_id", "O9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "[]" })))
            .expect(1)
            .mount(&server)
            .await;

        let payloads = test_client(&server).fetch("S1", "O9").await.expect("fetch");
        assert_eq!(payloads.orders["result"]["data"], "[]");
        assert_eq!(payloads.shop["data"], "[]");
    }

    #[tokio::test]
    async fn either_upstream_failing_fails_the_fetch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "data": "[]" } })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shop"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = test_client(&server).fetch("S1", "O9").await.unwrap_err();
        assert!(matches!(
            err,
            InvoiceError::Upstream {
                api: UpstreamApi::Shop,
                ..
            }
        ));
        assert_eq!(err.stage(), "fetch");
    }

    #[tokio::test]
    async fn non_json_body_is_an_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_string("maintenance"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "[]" })))
            .mount(&server)
            .await;

        let err = test_client(&server).fetch("S1", "O9").await.unwrap_err();
        assert!(matches!(
            err,
            InvoiceError::Upstream {
                api: UpstreamApi::Orders,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/orders"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "result": { "data": "[]" } }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "[]" })))
            .mount(&server)
            .await;

        let err = client_with_timeout(&server, 1)
            .fetch("S1", "O9")
            .await
            .unwrap_err();
        match &err {
            InvoiceError::Upstream {
                api: UpstreamApi::Orders,
                source,
            } => assert!(source.is_timeout()),
            other => panic!("expected an API 1 timeout, got {other:?}"),
        }
        assert_eq!(err.stage(), "fetch");
    }
}
