use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The tenant/store record tied to the logged-in identity.
///
/// The `merchant_code` scopes every catalog and order call the views
/// make, and `currency` drives price formatting throughout the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub merchant_code: String,
    pub merchant_name: Option<String>,
    pub merchant_email: Option<String>,
    pub currency: Option<String>,
    pub logo: Option<String>,
}

/// Per-region tax rate configured for the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub rate: Option<Decimal>,
}

/// Per-region shipping fee configured for the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRate {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub amount: Option<Decimal>,
}
