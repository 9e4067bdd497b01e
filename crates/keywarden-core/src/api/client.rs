//! API client for the vault's REST endpoints.
//!
//! All data endpoints require a bearer token obtained from `/auth/login`.
//! The client holds the token as plain state; session lifetime and expiry
//! live in `auth::SessionStore`, not here.

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::{AuthGrant, Authenticator};
use crate::models::{
    AuditLog, AuditLogFilters, Category, CategoryDraft, CategoryPatch, Credential,
    CredentialDraft, CredentialFilters, CredentialPatch, Page,
};

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Response body of `POST /auth/login`. This shape is the wire contract with
/// the server and must not drift.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// API client for the vault server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL (e.g.
    /// `http://localhost:8000/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token (after logout).
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .put(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send PUT request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// DELETE with no response body expected (204).
    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        let response = self
            .client
            .delete(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Exchange the master password for a token grant.
    pub async fn login(&self, password: &str) -> Result<LoginResponse> {
        let url = self.url("/auth/login");
        let body = serde_json::json!({ "password": password });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .context("Failed to parse login response")
    }

    // ===== Credentials =====

    /// Fetch a page of credentials matching the filters.
    pub async fn list_credentials(&self, filters: &CredentialFilters) -> Result<Page<Credential>> {
        self.get_with_query("/credentials", filters).await
    }

    /// Fetch a single credential with decrypted fields.
    pub async fn get_credential(&self, id: i64) -> Result<Credential> {
        self.get(&format!("/credentials/{}", id)).await
    }

    pub async fn create_credential(&self, draft: &CredentialDraft) -> Result<Credential> {
        self.post("/credentials", draft).await
    }

    pub async fn update_credential(&self, id: i64, patch: &CredentialPatch) -> Result<Credential> {
        self.put(&format!("/credentials/{}", id), patch).await
    }

    pub async fn delete_credential(&self, id: i64) -> Result<()> {
        self.delete(&format!("/credentials/{}", id)).await
    }

    /// Record a copy action in the audit trail. The copy itself happens
    /// client-side; this call only logs it.
    pub async fn log_copy(&self, id: i64, field: &str) -> Result<()> {
        let url = self.url(&format!("/credentials/{}/copy", id));
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .query(&[("field", field)])
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Categories =====

    /// Fetch all categories with their credential counts.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.get("/categories").await
    }

    pub async fn get_category(&self, id: i64) -> Result<Category> {
        self.get(&format!("/categories/{}", id)).await
    }

    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<Category> {
        self.post("/categories", draft).await
    }

    pub async fn update_category(&self, id: i64, patch: &CategoryPatch) -> Result<Category> {
        self.put(&format!("/categories/{}", id), patch).await
    }

    /// Delete a category. Credentials that pointed at it are orphaned
    /// server-side, not deleted.
    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.delete(&format!("/categories/{}", id)).await
    }

    // ===== Audit logs =====

    /// Fetch a page of audit log entries, newest first.
    pub async fn list_audit_logs(&self, filters: &AuditLogFilters) -> Result<Page<AuditLog>> {
        self.get_with_query("/audit-logs", filters).await
    }

    // ===== Export =====

    /// Download the full credential export as xlsx bytes.
    pub async fn export_excel(&self) -> Result<Vec<u8>> {
        let url = self.url("/export/excel");
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        let bytes = response
            .bytes()
            .await
            .context("Failed to read export body")?;
        debug!(size = bytes.len(), "Export downloaded");
        Ok(bytes.to_vec())
    }
}

impl Authenticator for ApiClient {
    async fn authenticate(&self, password: &str) -> Result<AuthGrant> {
        let response = self.login(password).await?;
        Ok(AuthGrant {
            access_token: response.access_token,
            expires_in: response.expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_login_response() {
        let json = r#"{"access_token": "eyJhbGciOi.fake.token", "token_type": "bearer", "expires_in": 86400}"#;
        let response: LoginResponse = serde_json::from_str(json).expect("login response parses");
        assert_eq!(response.access_token, "eyJhbGciOi.fake.token");
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.expires_in, 86400);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(
            client.url("/credentials"),
            "http://localhost:8000/api/credentials"
        );
    }

    #[test]
    fn parse_credential_page() {
        let json = r#"{
            "items": [{
                "id": 1,
                "name": "backup-host",
                "type": "linux",
                "host": "backup01",
                "port": 22,
                "username": "root",
                "password": null,
                "extra_data": null,
                "category_id": null,
                "tags": [],
                "description": null,
                "created_at": "2024-01-15T10:00:00",
                "updated_at": null,
                "category_name": null,
                "category_color": null
            }],
            "total": 1,
            "page": 1,
            "page_size": 20,
            "total_pages": 1
        }"#;

        let page: Page<Credential> = serde_json::from_str(json).expect("page parses");
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items[0].name, "backup-host");
    }
}
