// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{DiscogsError, Result};
use crate::models::{
    ArtistDetailResponse, ArtistSearchResponse, ReleaseDetailResponse, ReleasesResponse,
};
use async_trait::async_trait;
use discotheque_domain::{
    Artist, ArtistDetail, ArtistId, DiscographyFilter, PageToken, Paged, Release, ReleaseDetail,
    ReleaseId,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, trace};
use url::Url;

const DISCOGS_API_BASE: &str = "https://api.discogs.com";
const DEFAULT_PER_PAGE: u32 = 30;
const USER_AGENT: &str = concat!(
    "Discotheque/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/discotheque-app/discotheque)"
);

/// Read-only operations against the discography catalog.
///
/// Implementations must be safe to share between concurrently running
/// pagers and detail lookups.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn search_artists(&self, query: &str, page: PageToken) -> Result<Paged<Artist>>;

    async fn artist_detail(&self, id: ArtistId) -> Result<ArtistDetail>;

    async fn artist_releases(
        &self,
        artist_id: ArtistId,
        filter: DiscographyFilter,
        page: PageToken,
    ) -> Result<Paged<Release>>;

    async fn release_detail(&self, id: ReleaseId) -> Result<ReleaseDetail>;
}

/// Discogs API client.
#[derive(Debug, Clone)]
pub struct DiscogsClient {
    client: Client,
    token: Option<String>,
    /// Base URL stored without a trailing slash.
    base_url: String,
    per_page: u32,
}

impl DiscogsClient {
    /// Create a client with default settings and no token.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> DiscogsClientBuilder {
        DiscogsClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    fn url(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| DiscogsError::InvalidUrl(e.to_string()))
    }

    fn request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.as_deref() {
            Some(token) if !token.trim().is_empty() => {
                // Discogs uses its own token scheme: "Discogs token=<value>"
                request.header("Authorization", format!("Discogs token={}", token.trim()))
            }
            _ => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        trace!(target: "discogs", "GET {}", url);

        let response = self.request(self.client.get(url)).send().await?;
        let status = response.status();
        debug!(target: "discogs", "response status: {}", status);

        let body = response.text().await?;
        trace!(target: "discogs", "response body: {}", body);

        parse_discogs_body(status, &body)
    }
}

#[async_trait]
impl CatalogApi for DiscogsClient {
    #[instrument(skip(self))]
    async fn search_artists(&self, query: &str, page: PageToken) -> Result<Paged<Artist>> {
        let mut url = self.url("/database/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", "artist")
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", &page.to_string());

        let response: ArtistSearchResponse = self.get(url).await?;
        Ok(response.into_domain())
    }

    #[instrument(skip(self))]
    async fn artist_detail(&self, id: ArtistId) -> Result<ArtistDetail> {
        let url = self.url(&format!("/artists/{}", id))?;
        let response: ArtistDetailResponse = self.get(url).await?;
        Ok(response.into_domain())
    }

    #[instrument(skip(self))]
    async fn artist_releases(
        &self,
        artist_id: ArtistId,
        filter: DiscographyFilter,
        page: PageToken,
    ) -> Result<Paged<Release>> {
        let mut url = self.url(&format!("/artists/{}/releases", artist_id))?;
        url.query_pairs_mut()
            .append_pair("sort", filter.sort_by.api_sort())
            .append_pair("sort_order", filter.sort_by.api_order())
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", &page.to_string());

        let response: ReleasesResponse = self.get(url).await?;
        Ok(response.into_domain())
    }

    #[instrument(skip(self))]
    async fn release_detail(&self, id: ReleaseId) -> Result<ReleaseDetail> {
        let url = self.url(&format!("/releases/{}", id))?;
        let response: ReleaseDetailResponse = self.get(url).await?;
        Ok(response.into_domain())
    }
}

/// Builder for configuring a Discogs client.
#[derive(Debug)]
pub struct DiscogsClientBuilder {
    base_url: String,
    token: Option<String>,
    user_agent: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    per_page: u32,
}

impl Default for DiscogsClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DISCOGS_API_BASE.to_string(),
            token: None,
            user_agent: USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl DiscogsClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Page size requested from paginated endpoints.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn build(self) -> Result<DiscogsClient> {
        let client = Client::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .user_agent(self.user_agent)
            .build()
            .map_err(|e| DiscogsError::ClientBuild(e.to_string()))?;

        let base_url = self.base_url.trim_end_matches('/').to_string();
        debug!(target: "discogs", base_url = %base_url, "Initialized Discogs client");

        Ok(DiscogsClient {
            client,
            token: self.token,
            base_url,
            per_page: self.per_page,
        })
    }
}

fn parse_discogs_body<T: DeserializeOwned>(status: StatusCode, response_body: &str) -> Result<T> {
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(response_body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|message| message.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| response_body.to_string());
        return Err(DiscogsError::HttpStatus { status, message });
    }

    let trimmed = response_body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(DiscogsError::EmptyBody);
    }

    Ok(serde_json::from_str(trimmed)?)
}
