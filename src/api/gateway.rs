//! The account-service seam the session coordinator depends on.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::models::{Identity, Merchant};

/// Refresh credential issued for a known username.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshCredential {
    pub refresh_token: String,
}

/// A freshly minted access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
}

/// Account-service calls the coordinator makes.
///
/// [`crate::api::ApiClient`] is the production implementation; tests
/// substitute an in-memory stub. All calls are fallible with
/// [`ApiError`]; the coordinator logs and swallows those failures.
pub trait AuthGateway: Send + Sync + 'static {
    /// Resolve the seller identity behind an access token.
    fn fetch_identity(&self, token: &str) -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// Resolve the merchant record tied to an access token.
    fn fetch_merchant(&self, token: &str) -> impl Future<Output = Result<Merchant, ApiError>> + Send;

    /// Look up the refresh credential for a previously seen username.
    fn refresh_credential(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<RefreshCredential, ApiError>> + Send;

    /// Exchange a refresh credential for a new access token.
    fn exchange_refresh_credential(
        &self,
        credential: &RefreshCredential,
    ) -> impl Future<Output = Result<TokenGrant, ApiError>> + Send;
}
