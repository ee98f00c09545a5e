//! Reqwest implementation of the account-service gateway.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::gateway::{AuthGateway, RefreshCredential, TokenGrant};
use crate::api::ApiError;
use crate::config::Config;
use crate::models::{Identity, Merchant};

/// HTTP request timeout in seconds.
/// Long enough for a slow platform response, short enough that a dead
/// connection does not stall the refresh schedule.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Account-service client.
/// Clone is cheap - reqwest::Client shares its connection pool via Arc.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    account_base_url: String,
    api_base_url: String,
}

impl ApiClient {
    /// Create a client against the hosts in the config.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            account_base_url: config.account_base_url().to_string(),
            api_base_url: config.api_base_url().to_string(),
        })
    }

    async fn check_response(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(%status, "account service returned an error");
        Err(ApiError::from_status(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, token: Option<&str>) -> Result<T, ApiError> {
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = Self::check_response(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

impl AuthGateway for ApiClient {
    async fn fetch_identity(&self, token: &str) -> Result<Identity, ApiError> {
        let url = format!("{}/users/auth", self.account_base_url);
        self.get_json(&url, Some(token)).await
    }

    async fn fetch_merchant(&self, token: &str) -> Result<Merchant, ApiError> {
        let url = format!("{}/merchants/me", self.api_base_url);
        self.get_json(&url, Some(token)).await
    }

    async fn refresh_credential(&self, username: &str) -> Result<RefreshCredential, ApiError> {
        let url = format!("{}/users/{}/refresh-token", self.account_base_url, username);
        self.get_json(&url, None).await
    }

    async fn exchange_refresh_credential(
        &self,
        credential: &RefreshCredential,
    ) -> Result<TokenGrant, ApiError> {
        let url = format!("{}/users/refresh-token", self.account_base_url);
        let response = self.client.post(&url).json(credential).send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }
}
