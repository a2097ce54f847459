use bigdecimal::{BigDecimal, Zero};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{NormalizeError, UpstreamApi};
use crate::models::{Invoice, LineItem, OrderRecord, OrderSummary, ShopRecord, TaxLine};

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_SHOP_NAME: &str = "Food Shop";
const DEFAULT_TAX_NAME: &str = "Tax";

/// 解析两个上游响应并合并为发票 (纯函数, 无 I/O)
pub fn normalize(orders_body: &Value, shop_body: &Value) -> Result<Invoice, NormalizeError> {
    let order: OrderRecord = first_record(
        UpstreamApi::Orders,
        orders_body.get("result").and_then(|r| r.get("data")),
    )?;
    let shop: ShopRecord = first_record(UpstreamApi::Shop, shop_body.get("data"))?;

    Ok(merge(&order, &shop))
}

/// 取出双重编码的 JSON 字符串, 解析后返回数组第一条
fn first_record<T: DeserializeOwned>(
    api: UpstreamApi,
    field: Option<&Value>,
) -> Result<T, NormalizeError> {
    let encoded = field
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingStructure(api))?;

    let parsed: Value = serde_json::from_str(encoded).map_err(|source| {
        tracing::warn!("Invalid JSON in {} response: {}", api, encoded);
        NormalizeError::MalformedJson { api, source }
    })?;

    let first = match parsed {
        Value::Array(mut records) if !records.is_empty() => records.swap_remove(0),
        _ => return Err(NormalizeError::EmptyResult(api)),
    };

    // 非对象元素在这里报错, 结构体反序列化本身对字段是宽松的
    let object: Map<String, Value> = serde_json::from_value(first)
        .map_err(|source| NormalizeError::MalformedJson { api, source })?;
    serde_json::from_value(Value::Object(object))
        .map_err(|source| NormalizeError::MalformedJson { api, source })
}

/// 按字段优先级合并两份订单记录
pub fn merge(order: &OrderRecord, shop: &ShopRecord) -> Invoice {
    let user = order.user.as_ref();

    let summary = OrderSummary {
        shop_name: text(
            [&order.shop_name, &shop.shop_name],
            DEFAULT_SHOP_NAME,
        ),
        shop_address: join_address(shop.address_parts()),
        shop_email: text([&shop.shop_email], NOT_AVAILABLE),
        user_name: text(
            [&shop.name, &user.and_then(|u| u.name.clone())],
            NOT_AVAILABLE,
        ),
        user_mobile: text(
            [&shop.mobile_no, &user.and_then(|u| u.mobile_no.clone())],
            NOT_AVAILABLE,
        ),
        user_email: text([&shop.email], NOT_AVAILABLE),
        delivery_method: text(
            [
                &shop.delivery_method_name,
                &order.delivery.as_ref().and_then(|d| d.method_name.clone()),
            ],
            NOT_AVAILABLE,
        ),
        user_address: text([&shop.user_address], NOT_AVAILABLE),
        delivery_pickup_time: text(
            [&shop.delivery_pickup_time, &order.delivery_pickup_time],
            NOT_AVAILABLE,
        ),
        transaction_date: text([&shop.trans_date, &order.trans_date], NOT_AVAILABLE),
        tax_reg_no: text([&shop.tax_reg_no, &order.tax_reg_no], NOT_AVAILABLE),
        amount: amount([&order.amount, &shop.total_amount]),
        discount: amount([&order.discount, &shop.discount]),
        charges: amount([&order.charges, &shop.charges]),
        payment_charges: amount([&order.payment_charges]),
        total_amount: amount([&order.total_amount, &shop.total_amount]),
        payment_method: text(
            [&order.payment_method, &shop.payment_method],
            NOT_AVAILABLE,
        ),
        order_paid_status: text([&shop.order_paid_status], NOT_AVAILABLE),
        currency: text([&order.currency, &shop.currency], ""),
    };

    Invoice {
        order_id: text([&order.order_id, &shop.order_id], NOT_AVAILABLE),
        order: summary,
        items: order
            .items
            .iter()
            .map(|item| LineItem {
                name: item.name.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                quantity: item.quantity.clone().unwrap_or_else(BigDecimal::zero),
                unit_price: item.unit_price.clone().unwrap_or_else(BigDecimal::zero),
                amount: item.amount.clone().unwrap_or_else(BigDecimal::zero),
            })
            .collect(),
        tax_list: order
            .taxes
            .iter()
            .map(|tax| TaxLine {
                name: tax.name.clone().unwrap_or_else(|| DEFAULT_TAX_NAME.to_string()),
                amount: tax.amount.clone().unwrap_or_else(BigDecimal::zero),
            })
            .collect(),
    }
}

/// 第一个非空文本, 否则默认值
fn text<const N: usize>(candidates: [&Option<String>; N], default: &str) -> String {
    candidates
        .into_iter()
        .find_map(|c| c.as_deref().filter(|s| !s.trim().is_empty()))
        .unwrap_or(default)
        .to_string()
}

/// 第一个非零金额, 否则 0
fn amount<const N: usize>(candidates: [&Option<BigDecimal>; N]) -> BigDecimal {
    candidates
        .into_iter()
        .find_map(|c| c.as_ref().filter(|v| !v.is_zero()))
        .cloned()
        .unwrap_or_else(BigDecimal::zero)
}

/// 地址各段以 ", " 连接, 跳过空段; 全空时为 "N/A"
fn join_address(parts: [Option<&str>; 5]) -> String {
    let joined = parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    if joined.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        joined
    }
}
