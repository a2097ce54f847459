use bigdecimal::BigDecimal;
use serde::Serialize;

/// 合并后的发票 (每个请求新建, 渲染一次后丢弃)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub order_id: String,
    pub order: OrderSummary,
    pub items: Vec<LineItem>,
    pub tax_list: Vec<TaxLine>,
}

/// 订单头信息, 所有字段都有默认值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub shop_name: String,
    pub shop_address: String,
    pub shop_email: String,
    pub user_name: String,
    pub user_mobile: String,
    pub user_email: String,
    pub delivery_method: String,
    pub user_address: String,
    pub delivery_pickup_time: String,
    pub transaction_date: String,
    pub tax_reg_no: String,
    pub amount: BigDecimal,
    pub discount: BigDecimal,
    pub charges: BigDecimal,
    pub payment_charges: BigDecimal,
    pub total_amount: BigDecimal,
    pub payment_method: String,
    pub order_paid_status: String,
    /// 空串表示金额不加货币前缀
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxLine {
    pub name: String,
    pub amount: BigDecimal,
}

impl OrderSummary {
    /// 带货币前缀的金额, 如 `INR 126.50`
    pub fn money(&self, value: &BigDecimal) -> String {
        let amount = format_amount(value);
        if self.currency.is_empty() {
            amount
        } else {
            format!("{} {}", self.currency, amount)
        }
    }
}

/// 金额四舍五入到两位小数
pub fn format_amount(value: &BigDecimal) -> String {
    value.round(2).with_scale(2).to_string()
}

/// 整数数量去掉小数部分
pub fn format_quantity(value: &BigDecimal) -> String {
    let whole = value.with_scale(0);
    if &whole == value {
        whole.to_string()
    } else {
        value.to_string()
    }
}
