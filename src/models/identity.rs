use serde::{Deserialize, Serialize};

/// Resolved profile of the logged-in seller account.
///
/// Fetched with a valid access token; cleared on logout. The `username`
/// is the durable handle the token refresh flow is keyed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}
