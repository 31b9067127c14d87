// SPDX-License-Identifier: GPL-3.0-or-later

use crate::events::{publish_event, EventPublisher};
use discotheque_discogs::CatalogApi;
use discotheque_domain::{ArtistId, DiscographyFilter, Release};
use discotheque_paging::{LoadOutcome, PagingSnapshot, PagingSwitcher, ReleasesSource};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscographyIntent {
    Load(ArtistId),
    ApplyFilter(ArtistId, DiscographyFilter),
}

pub type DiscographyParams = (Option<ArtistId>, DiscographyFilter);

/// Release listing of one artist under the selected sort order.
pub struct DiscographyViewModel {
    releases: PagingSwitcher<DiscographyParams, ReleasesSource>,
    events: Arc<dyn EventPublisher>,
}

impl DiscographyViewModel {
    pub fn new(api: Arc<dyn CatalogApi>, events: Arc<dyn EventPublisher>) -> Self {
        let releases = PagingSwitcher::new(
            (None, DiscographyFilter::default()),
            move |(artist_id, filter): &DiscographyParams| {
                artist_id.map(|artist_id| ReleasesSource::new(Arc::clone(&api), artist_id, *filter))
            },
        );
        Self { releases, events }
    }

    /// Must be called from within a tokio runtime.
    pub fn on_intent(&self, intent: DiscographyIntent) {
        match intent {
            DiscographyIntent::Load(artist_id) => {
                publish_event(
                    self.events.as_ref(),
                    "discography.load",
                    json!({ "artist_id": artist_id }),
                );
                let filter = self.current_filter();
                self.releases.set_params((Some(artist_id), filter));
            }
            DiscographyIntent::ApplyFilter(artist_id, filter) => {
                publish_event(
                    self.events.as_ref(),
                    "discography.filter.applied",
                    json!({ "artist_id": artist_id, "sort": filter.sort_by }),
                );
                self.releases.set_params((Some(artist_id), filter));
            }
        }
    }

    pub fn artist_id(&self) -> Option<ArtistId> {
        self.releases.current_params().0
    }

    pub fn current_filter(&self) -> DiscographyFilter {
        self.releases.current_params().1
    }

    /// Observable artist and filter selection.
    pub fn params(&self) -> watch::Receiver<DiscographyParams> {
        self.releases.params()
    }

    pub fn releases(&self) -> watch::Receiver<PagingSnapshot<Release>> {
        self.releases.subscribe()
    }

    pub fn snapshot(&self) -> PagingSnapshot<Release> {
        self.releases.snapshot()
    }

    pub fn load_more(&self) -> bool {
        self.releases.load_more()
    }

    pub async fn load_more_and_wait(&self) -> Option<LoadOutcome> {
        self.releases.load_more_and_wait().await
    }

    pub fn refresh(&self) -> bool {
        self.releases.refresh(None)
    }

    pub fn retry(&self) -> bool {
        self.releases.retry()
    }
}
