// SPDX-License-Identifier: GPL-3.0-or-later

use crate::events::{publish_event, EventPublisher};
use discotheque_discogs::CatalogApi;
use discotheque_domain::{is_blank_query, Artist};
use discotheque_paging::{ArtistSearchSource, LoadOutcome, PagingSnapshot, PagingSwitcher};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtistSearchIntent {
    Search(String),
    ClearSearch,
}

/// Artist search screen: the current query and its paged results.
pub struct ArtistSearchViewModel {
    results: PagingSwitcher<String, ArtistSearchSource>,
    events: Arc<dyn EventPublisher>,
}

impl ArtistSearchViewModel {
    pub fn new(api: Arc<dyn CatalogApi>, events: Arc<dyn EventPublisher>) -> Self {
        let results = PagingSwitcher::new(String::new(), move |query: &String| {
            (!is_blank_query(query)).then(|| ArtistSearchSource::new(Arc::clone(&api), query.as_str()))
        });
        Self { results, events }
    }

    /// Must be called from within a tokio runtime.
    pub fn on_intent(&self, intent: ArtistSearchIntent) {
        match intent {
            ArtistSearchIntent::Search(query) => {
                publish_event(self.events.as_ref(), "artist.search", json!({ "query": query }));
                if !self.results.set_params(query) {
                    debug!(target: "application", "search query unchanged");
                }
            }
            ArtistSearchIntent::ClearSearch => {
                publish_event(self.events.as_ref(), "artist.search.cleared", json!({}));
                self.results.set_params(String::new());
            }
        }
    }

    pub fn search_query(&self) -> watch::Receiver<String> {
        self.results.params()
    }

    pub fn current_query(&self) -> String {
        self.results.current_params()
    }

    /// True while no search is active.
    pub fn is_search_empty(&self) -> bool {
        is_blank_query(&self.results.current_params())
    }

    pub fn artists(&self) -> watch::Receiver<PagingSnapshot<Artist>> {
        self.results.subscribe()
    }

    pub fn snapshot(&self) -> PagingSnapshot<Artist> {
        self.results.snapshot()
    }

    pub fn load_more(&self) -> bool {
        self.results.load_more()
    }

    /// Like [`Self::load_more`], but resolves once the page is in [`Self::snapshot`].
    pub async fn load_more_and_wait(&self) -> Option<LoadOutcome> {
        self.results.load_more_and_wait().await
    }

    pub fn refresh(&self) -> bool {
        self.results.refresh(None)
    }

    pub fn retry(&self) -> bool {
        self.results.retry()
    }
}
