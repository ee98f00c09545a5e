use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product category as managed on the Categories screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A product listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image: Vec<String>,
    pub quantity: Option<i64>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// A discount code and its value, as shown on the Discounts screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub discount_code: String,
    pub discount_value: Option<Decimal>,
    #[serde(default)]
    pub enabled: bool,
    pub expires_at: Option<DateTime<Utc>>,
}
