pub mod handlers;

pub use handlers::{generate_invoice, health_check, InvoiceQuery};

use crate::service::InvoiceService;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// 构建路由
pub fn build_app(service: Arc<InvoiceService>) -> Router {
    let invoice_routes = Router::new()
        .route("/invoice", get(generate_invoice))
        .with_state(service);

    Router::new()
        .route("/health", get(health_check))
        .merge(invoice_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamConfig;
    use crate::render::{FontBook, TableRenderer};
    use crate::service::UpstreamClient;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use std::sync::Mutex;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app(server: &MockServer) -> Router {
        let client = UpstreamClient::new(&UpstreamConfig {
            api1_url: format!("{}/orders", server.uri()),
            api2_url: format!("{}/shop", server.uri()),
            timeout_secs: 5,
        })
        .expect("client");
        let renderer = Arc::new(TableRenderer::new(FontBook::builtin()));
        build_app(Arc::new(InvoiceService::new(client, renderer)))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, content_type, body.to_vec())
    }

    async fn mount_shop(server: &MockServer) {
        let records = json!([{
            "name": "Asha Patel",
            "mobile_no": "9876543210",
            "shop_area": "Old Town",
            "shop_city": "Pune",
            "trans_date": { "Value": "2024-01-01 18:10" }
        }]);
        Mock::given(method("GET"))
            .and(path("/shop"))
            .and(query_param("shop_id", "12"))
            .and(query_param("order_id", "345"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": records.to_string() })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let server = MockServer::start().await;
        let (status, _, body) = call(test_app(&server), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn missing_order_id_is_rejected_without_upstream_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (status, _, body) = call(test_app(&server), "/invoice?shop_id=12").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"], "Missing required parameters");

        let (status, _, _) = call(test_app(&server), "/invoice?shop_id=12&order_id=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unparseable_query_gets_the_json_error_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (status, content_type, body) =
            call(test_app(&server), "/invoice?shop_id=1&shop_id=2&order_id=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"], "Missing required parameters");
    }

    #[tokio::test]
    async fn valid_request_streams_a_pdf() {
        let server = MockServer::start().await;
        let records = json!([{
            "Order_Id": "345",
            "Shop_Name": "Spice Route",
            "Amount": 160,
            "Total_Amount": 168,
            "Currency": "INR",
            "OrderedItemList": [
                { "Item_Name": "Paneer Tikka", "Quantity": 2, "Price": 80, "Amount": 160 }
            ],
            "OrderTaxList": [{ "Tax_Name": "GST", "Tax_Amount": 8 }]
        }]);
        Mock::given(method("GET"))
            .and(path("/orders"))
            .and(query_param("ShopId", "12"))
            .and(query_param("order_id", "345"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "result": { "data": records.to_string() } })),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_shop(&server).await;

        let (status, content_type, body) =
            call(test_app(&server), "/invoice?shop_id=12&order_id=345").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/pdf"));
        assert!(body.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("(Paneer Tikka) Tj"));
        assert!(text.contains("(Customer: Asha Patel) Tj"));
    }

    #[tokio::test]
    async fn malformed_source_data_is_reported_not_crashed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "result": { "data": "{not json" } })),
            )
            .mount(&server)
            .await;
        mount_shop(&server).await;

        let (status, _, body) = call(test_app(&server), "/invoice?shop_id=12&order_id=345").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            json["error"],
            "Failed to fetch invoice data: Failed to parse invoice data from API 1"
        );
    }

    #[tokio::test]
    async fn upstream_failure_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        mount_shop(&server).await;

        let (status, _, body) = call(test_app(&server), "/invoice?shop_id=12&order_id=345").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        let message = json["error"].as_str().expect("error message");
        assert!(message.starts_with("Failed to fetch invoice data: API 1 request failed"));
    }

    /// 收集日志输出
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn rejected_request_is_logged_with_stage_and_ids() {
        let server = MockServer::start().await;
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (status, _, _) = call(test_app(&server), "/invoice?shop_id=12&order_id=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let output = logs.contents();
        assert!(output.contains("Rejected invoice request"), "{output}");
        assert!(output.contains("stage=\"validate\""), "{output}");
        assert!(output.contains("shop_id=\"12\""), "{output}");
    }
}
