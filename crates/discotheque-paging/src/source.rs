// SPDX-License-Identifier: GPL-3.0-or-later

use async_trait::async_trait;
use discotheque_discogs::{CatalogApi, DiscogsError};
use discotheque_domain::{
    Artist, ArtistId, DiscographyFilter, ListItem, PageToken, Paged, Release, FIRST_PAGE,
};
use std::sync::Arc;
use tracing::debug;

/// One loaded page plus the keys of its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub prev_key: Option<PageToken>,
    pub next_key: Option<PageToken>,
}

impl<T> Page<T> {
    /// Builds the page fetched for `key`; there is a next page only while the
    /// server reports `page < pages`.
    pub fn from_paged(key: PageToken, paged: Paged<T>) -> Self {
        Self {
            prev_key: (key > FIRST_PAGE).then(|| key - 1),
            next_key: paged.pagination.has_next().then(|| key + 1),
            items: paged.items,
        }
    }
}

/// Pages loaded so far and the position the list is anchored at.
#[derive(Debug)]
pub struct PagingState<'a, T> {
    pub pages: &'a [Page<T>],
    pub anchor_position: Option<usize>,
}

impl<'a, T> PagingState<'a, T> {
    /// Page containing the item at `position`; positions past the end resolve to the last page.
    pub fn closest_page_to_position(&self, position: usize) -> Option<&'a Page<T>> {
        let mut start = 0;
        for page in self.pages {
            let end = start + page.items.len();
            if position < end {
                return Some(page);
            }
            start = end;
        }
        self.pages.last()
    }
}

/// Fetches single pages of a listing for a fixed set of parameters.
#[async_trait]
pub trait PagingSource: Send + Sync + 'static {
    type Item: ListItem + Clone + Send + Sync + 'static;

    /// Load the page for `key`, or the first page when `key` is `None`.
    /// Failures are returned as-is; retrying is up to the caller.
    async fn load(&self, key: Option<PageToken>) -> Result<Page<Self::Item>, DiscogsError>;

    /// Key to resume from after invalidation, near the anchor position.
    fn refresh_key(&self, state: &PagingState<'_, Self::Item>) -> Option<PageToken> {
        let anchor = state.anchor_position?;
        let page = state.closest_page_to_position(anchor)?;
        page.prev_key
            .map(|key| key + 1)
            .or_else(|| page.next_key.map(|key| key - 1))
    }
}

/// Artist search results for one query.
pub struct ArtistSearchSource {
    api: Arc<dyn CatalogApi>,
    query: String,
}

impl ArtistSearchSource {
    pub fn new(api: Arc<dyn CatalogApi>, query: impl Into<String>) -> Self {
        Self {
            api,
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[async_trait]
impl PagingSource for ArtistSearchSource {
    type Item = Artist;

    async fn load(&self, key: Option<PageToken>) -> Result<Page<Artist>, DiscogsError> {
        let page = key.unwrap_or(FIRST_PAGE);
        debug!(target: "paging", query = %self.query, page, "loading artist search page");
        let paged = self.api.search_artists(&self.query, page).await?;
        Ok(Page::from_paged(page, paged))
    }
}

/// Releases of one artist under one sort selection.
pub struct ReleasesSource {
    api: Arc<dyn CatalogApi>,
    artist_id: ArtistId,
    filter: DiscographyFilter,
}

impl ReleasesSource {
    pub fn new(api: Arc<dyn CatalogApi>, artist_id: ArtistId, filter: DiscographyFilter) -> Self {
        Self {
            api,
            artist_id,
            filter,
        }
    }

    pub fn artist_id(&self) -> ArtistId {
        self.artist_id
    }

    pub fn filter(&self) -> DiscographyFilter {
        self.filter
    }
}

#[async_trait]
impl PagingSource for ReleasesSource {
    type Item = Release;

    async fn load(&self, key: Option<PageToken>) -> Result<Page<Release>, DiscogsError> {
        let page = key.unwrap_or(FIRST_PAGE);
        debug!(
            target: "paging",
            artist_id = %self.artist_id,
            sort = %self.filter.sort_by,
            page,
            "loading releases page"
        );
        let paged = self
            .api
            .artist_releases(self.artist_id, self.filter, page)
            .await?;
        Ok(Page::from_paged(page, paged))
    }
}
