use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde_json::{Map, Value};

/// 订单明细接口 (API 1) `result.data` 数组中的一条订单
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrderRecord {
    #[serde(rename = "Order_Id", deserialize_with = "lenient::text")]
    pub order_id: Option<String>,
    #[serde(rename = "Shop_Name", deserialize_with = "lenient::text")]
    pub shop_name: Option<String>,
    #[serde(rename = "UserModel", deserialize_with = "lenient::object")]
    pub user: Option<OrderUser>,
    #[serde(rename = "DeliveryModel", deserialize_with = "lenient::object")]
    pub delivery: Option<OrderDelivery>,
    #[serde(rename = "Order_DeliveryPickup_Time", deserialize_with = "lenient::text")]
    pub delivery_pickup_time: Option<String>,
    #[serde(rename = "Trans_Date", deserialize_with = "lenient::text")]
    pub trans_date: Option<String>,
    #[serde(rename = "tax_reg_no", deserialize_with = "lenient::text")]
    pub tax_reg_no: Option<String>,
    #[serde(rename = "Amount", deserialize_with = "lenient::decimal")]
    pub amount: Option<BigDecimal>,
    #[serde(rename = "Discount", deserialize_with = "lenient::decimal")]
    pub discount: Option<BigDecimal>,
    #[serde(rename = "Charges", deserialize_with = "lenient::decimal")]
    pub charges: Option<BigDecimal>,
    #[serde(rename = "Payment_Charges", deserialize_with = "lenient::decimal")]
    pub payment_charges: Option<BigDecimal>,
    #[serde(rename = "Total_Amount", deserialize_with = "lenient::decimal")]
    pub total_amount: Option<BigDecimal>,
    #[serde(rename = "Payment_Method", deserialize_with = "lenient::text")]
    pub payment_method: Option<String>,
    #[serde(rename = "Currency", deserialize_with = "lenient::text")]
    pub currency: Option<String>,
    #[serde(rename = "OrderedItemList", deserialize_with = "lenient::list")]
    pub items: Vec<OrderedItem>,
    #[serde(rename = "OrderTaxList", deserialize_with = "lenient::list")]
    pub taxes: Vec<OrderTax>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrderUser {
    #[serde(rename = "Name", deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(rename = "Mobile_No", deserialize_with = "lenient::text")]
    pub mobile_no: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrderDelivery {
    #[serde(rename = "Delivery_Method_Name", deserialize_with = "lenient::text")]
    pub method_name: Option<String>,
}

/// 订单商品行; 上游字段名不统一, 按顺序取第一个出现的键
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedItem {
    pub name: Option<String>,
    pub quantity: Option<BigDecimal>,
    pub unit_price: Option<BigDecimal>,
    pub amount: Option<BigDecimal>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderTax {
    pub name: Option<String>,
    pub amount: Option<BigDecimal>,
}

/// 店铺/客户信息接口 (API 2) `data` 数组中的一条订单
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShopRecord {
    #[serde(deserialize_with = "lenient::text")]
    pub order_id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub shop_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub shop_address: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub shop_area: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub shop_city: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub shop_state: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub shop_country: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub shop_email: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub mobile_no: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub delivery_method_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub user_address: Option<String>,
    /// `{ "Value": "..." }` 包装
    #[serde(rename = "Order_DeliveryPickup_Time", deserialize_with = "lenient::text")]
    pub delivery_pickup_time: Option<String>,
    /// `{ "Value": "..." }` 包装
    #[serde(deserialize_with = "lenient::text")]
    pub trans_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub tax_reg_no: Option<String>,
    #[serde(deserialize_with = "lenient::decimal")]
    pub total_amount: Option<BigDecimal>,
    #[serde(deserialize_with = "lenient::decimal")]
    pub discount: Option<BigDecimal>,
    #[serde(deserialize_with = "lenient::decimal")]
    pub charges: Option<BigDecimal>,
    #[serde(deserialize_with = "lenient::text")]
    pub payment_method: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub order_paid_status: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub currency: Option<String>,
}

impl ShopRecord {
    /// 地址五段, 依次为街道/区域/城市/州/国家
    pub fn address_parts(&self) -> [Option<&str>; 5] {
        [
            self.shop_address.as_deref(),
            self.shop_area.as_deref(),
            self.shop_city.as_deref(),
            self.shop_state.as_deref(),
            self.shop_country.as_deref(),
        ]
    }
}

trait FromObject {
    fn from_object(map: &Map<String, Value>) -> Self;
}

impl FromObject for OrderedItem {
    fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            name: lenient::pick_text(map, &["Item_Name", "Name", "name"]),
            quantity: lenient::pick_decimal(map, &["Quantity", "Qty", "quantity"]),
            unit_price: lenient::pick_decimal(map, &["Price", "Unit_Price", "Rate", "price"]),
            amount: lenient::pick_decimal(map, &["Amount", "Total", "amount"]),
        }
    }
}

impl FromObject for OrderTax {
    fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            name: lenient::pick_text(map, &["Tax_Name", "Name", "name"]),
            amount: lenient::pick_decimal(map, &["Tax_Amount", "Amount", "amount"]),
        }
    }
}

/// 宽松解析: 类型不符的字段按缺失处理, 不让整条记录失败
mod lenient {
    use super::FromObject;
    use bigdecimal::BigDecimal;
    use serde::{de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::{Map, Value};
    use std::str::FromStr;

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(value_text(&Value::deserialize(d)?))
    }

    pub(super) fn decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BigDecimal>, D::Error> {
        Ok(value_decimal(&Value::deserialize(d)?))
    }

    pub(super) fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(d)? {
            v @ Value::Object(_) => Ok(serde_json::from_value(v).ok()),
            _ => Ok(None),
        }
    }

    pub(super) fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromObject,
    {
        match Value::deserialize(d)? {
            Value::Array(items) => Ok(items
                .iter()
                .filter_map(Value::as_object)
                .map(T::from_object)
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    pub(super) fn pick_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| map.get(*k).and_then(value_text))
    }

    pub(super) fn pick_decimal(map: &Map<String, Value>, keys: &[&str]) -> Option<BigDecimal> {
        keys.iter().find_map(|k| map.get(*k).and_then(value_decimal))
    }

    fn value_text(v: &Value) -> Option<String> {
        match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(map) => map.get("Value").and_then(value_text),
            _ => None,
        }
    }

    fn value_decimal(v: &Value) -> Option<BigDecimal> {
        match v {
            Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
            Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }
}
