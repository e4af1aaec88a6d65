//! Readwise v2 REST API source.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::models::{BookDetails, Credential, HighlightPage};
use crate::sources::{HighlightSource, SourceError};
use crate::utils::HttpClient;

pub const READWISE_API_BASE: &str = "https://readwise.io/api/v2";

/// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY: usize = 200;

/// Readwise highlights source
///
/// Uses `GET /highlights/` for listings and `GET /books/{id}/` for parent
/// records, authenticating with `Authorization: Token <key>`.
#[derive(Debug, Clone)]
pub struct ReadwiseSource {
    client: HttpClient,
    base_url: String,
}

impl ReadwiseSource {
    /// Create a source against the public Readwise API
    pub fn new() -> Self {
        Self::with_client(HttpClient::new(), READWISE_API_BASE)
    }

    /// Create a source against a different base URL (e.g. a local mock server)
    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_client(HttpClient::new(), base_url)
    }

    pub fn with_client(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a source from the `[api]` configuration section
    pub fn from_config(config: &ApiConfig) -> Result<Self, SourceError> {
        let client = HttpClient::with_timeout(config.timeout())?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Issue an authorized GET and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        credential: &Credential,
    ) -> Result<T, SourceError> {
        let authorization = credential
            .authorization()
            .ok_or(SourceError::CredentialMissing)?;

        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            tracing::debug!("HTTP {} from {}: {}", status.as_u16(), url, snippet);
            return Err(SourceError::from_status(
                status.as_u16(),
                format!("GET {} returned {}: {}", url, status, snippet),
            ));
        }

        let decoded = serde_json::from_str(&body)
            .inspect_err(|e| tracing::debug!("Unexpected response from {}: {}", url, e))?;
        Ok(decoded)
    }
}

impl Default for ReadwiseSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HighlightSource for ReadwiseSource {
    fn id(&self) -> &str {
        "readwise"
    }

    fn name(&self) -> &str {
        "Readwise"
    }

    async fn list_highlights(
        &self,
        credential: &Credential,
        page: Option<u64>,
        page_size: u32,
    ) -> Result<HighlightPage, SourceError> {
        let mut query = Vec::with_capacity(2);
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        query.push(("page_size", page_size.to_string()));

        self.get_json(&self.build_url("/highlights/"), &query, credential)
            .await
    }

    async fn get_book(
        &self,
        credential: &Credential,
        book_id: u64,
    ) -> Result<BookDetails, SourceError> {
        let url = self.build_url(&format!("/books/{}/", book_id));
        self.get_json(&url, &[], credential).await
    }
}
