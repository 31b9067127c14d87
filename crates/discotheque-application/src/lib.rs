// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Context;
use discotheque_config::{AppConfig, DiscogsConfig};
use discotheque_discogs::{CatalogApi, DiscogsClient};
use std::sync::Arc;
use std::time::Duration;

pub mod detail;
pub mod discography;
pub mod events;
pub mod search;

pub use detail::{
    ArtistDetailViewModel, DetailEvent, DetailFetcher, DetailIntent, DetailViewModel,
    GetArtistDetail, GetReleaseDetail, ReleaseDetailViewModel,
};
pub use discography::{DiscographyIntent, DiscographyParams, DiscographyViewModel};
pub use events::{EventPublisher, InMemoryEventBus, TracingEventPublisher};
pub use search::{ArtistSearchIntent, ArtistSearchViewModel};

use tracing::info;

/// Shared services every screen controller is built from.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    catalog: Arc<dyn CatalogApi>,
    events: Arc<dyn EventPublisher>,
}

impl AppState {
    /// Build the catalog client from configuration; events go to the log.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let client =
            build_catalog_client(&config.discogs).context("failed to build Discogs client")?;
        Ok(Self::with_parts(
            config,
            Arc::new(client),
            Arc::new(TracingEventPublisher),
        ))
    }

    pub fn with_parts(
        config: AppConfig,
        catalog: Arc<dyn CatalogApi>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            catalog,
            events,
        }
    }

    pub fn on_start(&self) {
        info!(
            target: "application",
            base_url = %self.config.discogs.base_url,
            per_page = self.config.discogs.per_page,
            "application state initialized"
        );
    }

    pub fn catalog(&self) -> Arc<dyn CatalogApi> {
        Arc::clone(&self.catalog)
    }

    pub fn artist_search(&self) -> ArtistSearchViewModel {
        ArtistSearchViewModel::new(self.catalog(), Arc::clone(&self.events))
    }

    pub fn discography(&self) -> DiscographyViewModel {
        DiscographyViewModel::new(self.catalog(), Arc::clone(&self.events))
    }

    pub fn artist_detail(&self) -> ArtistDetailViewModel {
        DetailViewModel::new(GetArtistDetail::new(self.catalog()), Arc::clone(&self.events))
    }

    pub fn release_detail(&self) -> ReleaseDetailViewModel {
        DetailViewModel::new(GetReleaseDetail::new(self.catalog()), Arc::clone(&self.events))
    }
}

/// Discogs client configured from the `[discogs]` section.
pub fn build_catalog_client(config: &DiscogsConfig) -> discotheque_discogs::Result<DiscogsClient> {
    let mut builder = DiscogsClient::builder()
        .base_url(config.base_url.as_str())
        .token(config.token.clone())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(Duration::from_secs(config.read_timeout_secs))
        .per_page(config.per_page);
    if let Some(user_agent) = config.user_agent.as_deref() {
        builder = builder.user_agent(user_agent);
    }
    builder.build()
}
