//! REST gateway for the Fintrack API.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use fintrack_core::gateway::GatewayTrait;
use fintrack_core::summary::{Budget, CurrentUser, PeriodSummary, TotalBalance};
use fintrack_core::transactions::{NewTransaction, NewTransfer, Transaction, TransferReceipt};
use fintrack_core::wallets::{NewWallet, Wallet, WalletId, WalletUpdate};

use crate::error::{ClientError, Result};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path prefix of every REST endpoint.
pub const API_PREFIX: &str = "/api";

/// Client for the Fintrack REST API.
///
/// Holds the bearer token of the signed-in user. A 401 response clears it,
/// and every later request goes out unauthenticated until a new token is
/// set.
#[derive(Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpGateway {
    /// Create a new gateway.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server origin, e.g. "http://localhost:8000". The `/api`
    ///   prefix is added per request.
    /// * `token` - Bearer token, if already signed in.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(token.filter(|t| !t.is_empty())),
        })
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) =
            token.filter(|t| !t.is_empty());
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Create headers for an API request. Multipart requests let reqwest set
    /// the content type.
    fn headers(&self, with_json: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if with_json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(token) = token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::auth("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    /// Sends a request and returns the JSON body, `None` for an empty body.
    async fn send(&self, request: RequestBuilder) -> Result<Option<Value>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                warn!("Access token rejected, clearing it");
                self.set_token(None);
            }
            return Err(ClientError::api(
                status.as_u16(),
                error_message(status.as_u16(), &body),
            ));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body, e
            );
            e
        })?;
        Ok(Some(value))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let value = self.send(request).await?.unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// GET /api/wallets/
    pub async fn fetch_wallets(&self) -> Result<Vec<Wallet>> {
        let request = self.client.get(self.url("/wallets/")).headers(self.headers(true)?);
        self.send_json(request).await
    }

    /// GET /api/wallets/user/total
    pub async fn fetch_total_balance(&self) -> Result<TotalBalance> {
        let request = self
            .client
            .get(self.url("/wallets/user/total"))
            .headers(self.headers(true)?);
        self.send_json(request).await
    }

    /// GET /api/financial_summary/current
    pub async fn fetch_current_summary(&self) -> Result<PeriodSummary> {
        let request = self
            .client
            .get(self.url("/financial_summary/current"))
            .headers(self.headers(true)?);
        self.send_json(request).await
    }

    /// GET /api/users/me
    pub async fn fetch_current_user(&self) -> Result<CurrentUser> {
        let request = self.client.get(self.url("/users/me")).headers(self.headers(true)?);
        self.send_json(request).await
    }

    /// GET /api/transactions/
    pub async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        let request = self
            .client
            .get(self.url("/transactions/"))
            .headers(self.headers(true)?);
        self.send_json(request).await
    }

    /// GET /api/budget/current
    pub async fn fetch_current_budget(&self) -> Result<Option<Budget>> {
        let request = self
            .client
            .get(self.url("/budget/current"))
            .headers(self.headers(true)?);
        self.send_json(request).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// POST /api/wallets/
    pub async fn post_wallet(&self, new_wallet: &NewWallet) -> Result<Wallet> {
        debug!("Creating wallet: {:?}", new_wallet);
        let request = self
            .client
            .post(self.url("/wallets/"))
            .headers(self.headers(true)?)
            .json(new_wallet);
        self.send_json(request).await
    }

    /// PUT /api/wallets/{id}
    pub async fn put_wallet(&self, wallet_id: WalletId, update: &WalletUpdate) -> Result<Wallet> {
        let request = self
            .client
            .put(self.url(&format!("/wallets/{}", wallet_id)))
            .headers(self.headers(true)?)
            .json(update);
        self.send_json(request).await
    }

    /// DELETE /api/wallets/{id}
    pub async fn remove_wallet(&self, wallet_id: WalletId) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/wallets/{}", wallet_id)))
            .headers(self.headers(true)?);
        self.send(request).await?;
        Ok(())
    }

    /// POST /api/transactions/ as multipart form data.
    pub async fn post_transaction(&self, new_transaction: &NewTransaction) -> Result<Transaction> {
        let form = new_transaction
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        let request = self
            .client
            .post(self.url("/transactions/"))
            .headers(self.headers(false)?)
            .multipart(form);
        self.send_json(request).await
    }

    /// POST /api/transactions/transfer
    ///
    /// The receipt is optional: older servers answer with a bare message.
    pub async fn post_transfer(&self, transfer: &NewTransfer) -> Result<Option<TransferReceipt>> {
        let request = self
            .client
            .post(self.url("/transactions/transfer"))
            .headers(self.headers(true)?)
            .json(transfer);
        let body = self.send(request).await?;
        Ok(body.and_then(|value| match serde_json::from_value(value) {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                debug!("Transfer response without receipt: {}", e);
                None
            }
        }))
    }
}

/// Error text for a failed response: the `detail` or `message` field of a
/// JSON body, else a generic message with the status code.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|data| message_from(&data))
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

fn message_from(data: &Value) -> Option<String> {
    ["detail", "message"].iter().find_map(|key| match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        // Validation errors come as a list of `{loc, msg}` objects.
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    })
}

#[async_trait]
impl GatewayTrait for HttpGateway {
    async fn get_wallets(&self) -> fintrack_core::Result<Vec<Wallet>> {
        Ok(self.fetch_wallets().await?)
    }

    async fn get_user_total_balance(&self) -> fintrack_core::Result<TotalBalance> {
        Ok(self.fetch_total_balance().await?)
    }

    async fn get_current_summary(&self) -> fintrack_core::Result<PeriodSummary> {
        Ok(self.fetch_current_summary().await?)
    }

    async fn get_current_user(&self) -> fintrack_core::Result<CurrentUser> {
        Ok(self.fetch_current_user().await?)
    }

    async fn create_wallet(&self, new_wallet: NewWallet) -> fintrack_core::Result<Wallet> {
        Ok(self.post_wallet(&new_wallet).await?)
    }

    async fn update_wallet(
        &self,
        wallet_id: WalletId,
        update: WalletUpdate,
    ) -> fintrack_core::Result<Wallet> {
        Ok(self.put_wallet(wallet_id, &update).await?)
    }

    async fn delete_wallet(&self, wallet_id: WalletId) -> fintrack_core::Result<()> {
        Ok(self.remove_wallet(wallet_id).await?)
    }

    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
    ) -> fintrack_core::Result<Transaction> {
        Ok(self.post_transaction(&new_transaction).await?)
    }

    async fn create_transfer(
        &self,
        transfer: NewTransfer,
    ) -> fintrack_core::Result<Option<TransferReceipt>> {
        Ok(self.post_transfer(&transfer).await?)
    }

    async fn get_transactions(&self) -> fintrack_core::Result<Vec<Transaction>> {
        Ok(self.fetch_transactions().await?)
    }

    async fn get_current_budget(&self) -> fintrack_core::Result<Option<Budget>> {
        Ok(self.fetch_current_budget().await?)
    }
}
