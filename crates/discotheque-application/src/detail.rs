// SPDX-License-Identifier: GPL-3.0-or-later

use crate::events::{publish_event, EventPublisher};
use async_trait::async_trait;
use discotheque_discogs::{CatalogApi, DiscogsError};
use discotheque_domain::{ArtistDetail, ArtistId, ReleaseDetail, ReleaseId};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Looks up one catalog entity by id.
#[async_trait]
pub trait DetailFetcher: Send + Sync + 'static {
    type Id: Copy + fmt::Display + Serialize + Send + Sync + 'static;
    type Detail: Clone + Send + Sync + 'static;

    /// Telemetry event published for [`DetailIntent::Load`].
    const LOAD_EVENT: &'static str;
    /// Telemetry event published for [`DetailIntent::Retry`].
    const RETRY_EVENT: &'static str;

    async fn fetch(&self, id: Self::Id) -> Result<Self::Detail, DiscogsError>;
}

pub struct GetArtistDetail {
    api: Arc<dyn CatalogApi>,
}

impl GetArtistDetail {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DetailFetcher for GetArtistDetail {
    type Id = ArtistId;
    type Detail = ArtistDetail;

    const LOAD_EVENT: &'static str = "artist.detail.load";
    const RETRY_EVENT: &'static str = "artist.detail.retry";

    async fn fetch(&self, id: ArtistId) -> Result<ArtistDetail, DiscogsError> {
        self.api.artist_detail(id).await
    }
}

pub struct GetReleaseDetail {
    api: Arc<dyn CatalogApi>,
}

impl GetReleaseDetail {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DetailFetcher for GetReleaseDetail {
    type Id = ReleaseId;
    type Detail = ReleaseDetail;

    const LOAD_EVENT: &'static str = "release.detail.load";
    const RETRY_EVENT: &'static str = "release.detail.retry";

    async fn fetch(&self, id: ReleaseId) -> Result<ReleaseDetail, DiscogsError> {
        self.api.release_detail(id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailIntent<Id> {
    Load(Id),
    Retry(Id),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailEvent<D> {
    Loading,
    Success(D),
    Error(String),
}

impl<D> DetailEvent<D> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn detail(&self) -> Option<&D> {
        match self {
            Self::Success(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Lookup {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Detail screen controller: one lookup at a time, latest intent wins.
///
/// Starts out `Loading` until the first intent resolves. Retries re-fetch
/// from the catalog; nothing is cached between lookups.
pub struct DetailViewModel<F: DetailFetcher> {
    fetcher: Arc<F>,
    events: Arc<dyn EventPublisher>,
    state: Arc<watch::Sender<DetailEvent<F::Detail>>>,
    lookup: Arc<Mutex<Lookup>>,
}

pub type ArtistDetailViewModel = DetailViewModel<GetArtistDetail>;
pub type ReleaseDetailViewModel = DetailViewModel<GetReleaseDetail>;

impl<F: DetailFetcher> DetailViewModel<F> {
    pub fn new(fetcher: F, events: Arc<dyn EventPublisher>) -> Self {
        let (state, _) = watch::channel(DetailEvent::Loading);
        Self {
            fetcher: Arc::new(fetcher),
            events,
            state: Arc::new(state),
            lookup: Arc::new(Mutex::new(Lookup::default())),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailEvent<F::Detail>> {
        self.state.subscribe()
    }

    pub fn event(&self) -> DetailEvent<F::Detail> {
        self.state.borrow().clone()
    }

    /// Must be called from within a tokio runtime.
    pub fn on_intent(&self, intent: DetailIntent<F::Id>) {
        let (id, event_name) = match intent {
            DetailIntent::Load(id) => (id, F::LOAD_EVENT),
            DetailIntent::Retry(id) => (id, F::RETRY_EVENT),
        };
        publish_event(self.events.as_ref(), event_name, json!({ "id": id }));
        self.fetch(id);
    }

    /// Waits for the current lookup to finish and returns its outcome.
    pub async fn settled(&self) -> DetailEvent<F::Detail> {
        let mut events = self.state.subscribe();
        let settled = match events.wait_for(|event| !event.is_loading()).await {
            Ok(event) => (*event).clone(),
            Err(_) => self.event(),
        };
        settled
    }

    fn fetch(&self, id: F::Id) {
        let mut lookup = lock(&self.lookup);
        if let Some(previous) = lookup.task.take() {
            previous.abort();
        }
        lookup.generation += 1;
        let generation = lookup.generation;
        self.state.send_replace(DetailEvent::Loading);
        debug!(target: "application", %id, generation, "fetching detail");

        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        let shared = Arc::clone(&self.lookup);
        lookup.task = Some(tokio::spawn(async move {
            let event = match fetcher.fetch(id).await {
                Ok(detail) => DetailEvent::Success(detail),
                Err(error) => {
                    warn!(target: "application", %id, %error, "detail lookup failed");
                    DetailEvent::Error(error.to_string())
                }
            };
            let lookup = lock(&shared);
            if lookup.generation == generation {
                state.send_replace(event);
            } else {
                debug!(target: "application", %id, "discarding superseded detail lookup");
            }
        }));
    }
}

impl<F: DetailFetcher> Drop for DetailViewModel<F> {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.lookup).task.take() {
            task.abort();
        }
    }
}

fn lock(lookup: &Mutex<Lookup>) -> MutexGuard<'_, Lookup> {
    lookup.lock().unwrap_or_else(PoisonError::into_inner)
}
