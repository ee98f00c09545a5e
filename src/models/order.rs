use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fulfilment stage of an order.
///
/// Orders move open -> processing -> fulfilled; the Order Detail screen
/// writes the stage back through the order service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Processing,
    Fulfilled,
}

impl OrderStatus {
    /// Parse a status string as the API reports it. Unknown or missing
    /// values fall back to `Open`, the stage every order starts in.
    pub fn from_str(s: Option<&str>) -> Self {
        match s.map(|v| v.to_lowercase()) {
            Some(v) if v == "fulfilled" => OrderStatus::Fulfilled,
            Some(v) if v == "processing" => OrderStatus::Processing,
            _ => OrderStatus::Open,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Open
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "open"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Fulfilled => write!(f, "fulfilled"),
        }
    }
}

/// A single line item on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub image: Vec<String>,
    pub quantity: i64,
    pub price: Option<Decimal>,
}

/// Shipping and contact details captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub fullname: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// An order as shown on the Orders list and Order Detail screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub reference: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    pub sub_total: Option<Decimal>,
    pub shipping_fee: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub tax_price: Option<Decimal>,
    pub total: Option<Decimal>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_delivered: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_status: OrderStatus,
    pub payment_method: Option<String>,
    pub shipping_details: Option<ShippingDetails>,
    pub created_at: Option<DateTime<Utc>>,
}
