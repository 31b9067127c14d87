// SPDX-License-Identifier: GPL-3.0-or-later

use crate::source::{Page, PagingSource, PagingState};
use discotheque_domain::{ListItem, LoadState, LoadStates, PageToken, FIRST_PAGE};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, warn};

/// What the pager currently shows: accumulated items plus refresh/append states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingSnapshot<T> {
    pub items: Vec<T>,
    pub load_states: LoadStates,
    pub next_key: Option<PageToken>,
}

impl<T> PagingSnapshot<T> {
    /// Nothing requested yet.
    pub fn idle() -> Self {
        Self {
            items: Vec::new(),
            load_states: LoadStates::default(),
            next_key: None,
        }
    }

    /// A list that is known to be empty without fetching anything.
    pub fn empty() -> Self {
        let done = LoadState::NotLoading {
            end_of_pagination: true,
        };
        Self {
            items: Vec::new(),
            load_states: LoadStates {
                refresh: done.clone(),
                append: done,
            },
            next_key: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of a single `refresh`, `load_more` or `retry` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was fetched and applied.
    Applied,
    /// The fetch failed; the error is in the load states.
    Failed,
    /// Nothing was fetched (already in flight, nothing to load, or already fetched).
    Skipped,
    /// The fetch finished after a newer refresh replaced it; the result was dropped.
    Stale,
}

struct PagerState<T> {
    pages: Vec<Page<T>>,
    fetched: BTreeSet<PageToken>,
    seen_ids: HashSet<u64>,
    load_states: LoadStates,
    refresh_in_flight: bool,
    append_in_flight: bool,
    /// Key used by the most recent refresh, reused by `retry`.
    refresh_key: Option<PageToken>,
    generation: u64,
}

impl<T: ListItem + Clone> PagerState<T> {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            fetched: BTreeSet::new(),
            seen_ids: HashSet::new(),
            load_states: LoadStates::default(),
            refresh_in_flight: false,
            append_in_flight: false,
            refresh_key: None,
            generation: 0,
        }
    }

    fn next_key(&self) -> Option<PageToken> {
        self.pages.last().and_then(|page| page.next_key)
    }

    /// Drops items whose id is already in the list.
    fn keep_unseen(&mut self, page: Page<T>) -> Page<T> {
        let seen_ids = &mut self.seen_ids;
        Page {
            items: page
                .items
                .into_iter()
                .filter(|item| seen_ids.insert(item.item_id()))
                .collect(),
            prev_key: page.prev_key,
            next_key: page.next_key,
        }
    }

    fn snapshot(&self) -> PagingSnapshot<T> {
        PagingSnapshot {
            items: self
                .pages
                .iter()
                .flat_map(|page| page.items.iter().cloned())
                .collect(),
            load_states: self.load_states.clone(),
            next_key: self.next_key(),
        }
    }
}

/// Incremental list controller for one parameter set.
///
/// Accumulates pages from a [`PagingSource`] and publishes a [`PagingSnapshot`]
/// after every state change. At most one refresh and one append run at a time;
/// overlapping calls return [`LoadOutcome::Skipped`] instead of queueing.
pub struct Pager<S: PagingSource> {
    source: S,
    state: Mutex<PagerState<S::Item>>,
    snapshots: watch::Sender<PagingSnapshot<S::Item>>,
}

impl<S: PagingSource> Pager<S> {
    pub fn new(source: S) -> Self {
        let (snapshots, _) = watch::channel(PagingSnapshot::idle());
        Self {
            source,
            state: Mutex::new(PagerState::new()),
            snapshots,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Receiver that starts with the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PagingSnapshot<S::Item>> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> PagingSnapshot<S::Item> {
        self.snapshots.borrow().clone()
    }

    /// Page tokens fetched successfully for the current list, ascending.
    pub fn fetched_pages(&self) -> Vec<PageToken> {
        self.lock().fetched.iter().copied().collect()
    }

    /// Reload the list, resuming near `anchor_position` when given.
    ///
    /// Loaded items stay visible until the new page arrives and are replaced wholesale on success.
    pub async fn refresh(&self, anchor_position: Option<usize>) -> LoadOutcome {
        let key = anchor_position.and_then(|anchor| {
            let state = self.lock();
            self.source.refresh_key(&PagingState {
                pages: &state.pages,
                anchor_position: Some(anchor),
            })
        });
        self.refresh_from(key).await
    }

    /// Fetch the page after the last loaded one and append it.
    pub async fn load_more(&self) -> LoadOutcome {
        let (key, guard) = {
            let mut state = self.lock();
            if state.refresh_in_flight || state.append_in_flight {
                debug!(target: "paging", "load more ignored: fetch in flight");
                return LoadOutcome::Skipped;
            }
            if state.pages.is_empty() || state.load_states.refresh.is_error() {
                return LoadOutcome::Skipped;
            }
            let Some(key) = state.next_key() else {
                return LoadOutcome::Skipped;
            };
            if state.fetched.contains(&key) {
                debug!(target: "paging", key, "load more ignored: page already fetched");
                return LoadOutcome::Skipped;
            }
            let replaced = std::mem::replace(&mut state.load_states.append, LoadState::Loading);
            state.append_in_flight = true;
            self.publish(&state);
            (key, InFlight::new(self, Fetch::Append, state.generation, replaced))
        };

        let result = self.source.load(Some(key)).await;

        let generation = guard.finish();
        let mut state = self.lock();
        if state.generation != generation {
            debug!(target: "paging", key, "dropping append superseded by refresh");
            return LoadOutcome::Stale;
        }
        state.append_in_flight = false;
        let outcome = match result {
            Ok(page) => {
                state.fetched.insert(key);
                let page = state.keep_unseen(page);
                let end_of_pagination = page.next_key.is_none();
                debug!(target: "paging", key, items = page.items.len(), end_of_pagination, "page appended");
                state.pages.push(page);
                state.load_states.append = LoadState::NotLoading { end_of_pagination };
                LoadOutcome::Applied
            }
            Err(error) => {
                warn!(target: "paging", key, %error, "append failed");
                state.load_states.append = LoadState::Error(error.to_string());
                LoadOutcome::Failed
            }
        };
        self.publish(&state);
        outcome
    }

    /// Re-issue whichever operation failed last, refresh first.
    pub async fn retry(&self) -> LoadOutcome {
        let (refresh_failed, append_failed, key) = {
            let state = self.lock();
            (
                state.load_states.refresh.is_error(),
                state.load_states.append.is_error(),
                state.refresh_key,
            )
        };
        if refresh_failed {
            self.refresh_from(key).await
        } else if append_failed {
            self.load_more().await
        } else {
            LoadOutcome::Skipped
        }
    }

    async fn refresh_from(&self, key: Option<PageToken>) -> LoadOutcome {
        let guard = {
            let mut state = self.lock();
            if state.refresh_in_flight {
                debug!(target: "paging", "refresh ignored: refresh in flight");
                return LoadOutcome::Skipped;
            }
            state.generation += 1;
            state.refresh_in_flight = true;
            state.refresh_key = key;
            let replaced = std::mem::replace(&mut state.load_states.refresh, LoadState::Loading);
            if state.append_in_flight {
                state.append_in_flight = false;
                state.load_states.append = LoadState::IDLE;
            }
            self.publish(&state);
            InFlight::new(self, Fetch::Refresh, state.generation, replaced)
        };

        let requested = key.unwrap_or(FIRST_PAGE);
        let result = self.source.load(key).await;

        let generation = guard.finish();
        let mut state = self.lock();
        if state.generation != generation {
            return LoadOutcome::Stale;
        }
        state.refresh_in_flight = false;
        let outcome = match result {
            Ok(page) => {
                state.pages.clear();
                state.fetched.clear();
                state.seen_ids.clear();
                state.fetched.insert(requested);
                let page = state.keep_unseen(page);
                let end_of_pagination = page.next_key.is_none();
                debug!(target: "paging", key = requested, items = page.items.len(), end_of_pagination, "list refreshed");
                state.pages.push(page);
                state.load_states = LoadStates {
                    refresh: LoadState::IDLE,
                    append: LoadState::NotLoading { end_of_pagination },
                };
                LoadOutcome::Applied
            }
            Err(error) => {
                warn!(target: "paging", key = requested, %error, "refresh failed");
                state.load_states.refresh = LoadState::Error(error.to_string());
                LoadOutcome::Failed
            }
        };
        self.publish(&state);
        outcome
    }

    fn publish(&self, state: &PagerState<S::Item>) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn lock(&self) -> MutexGuard<'_, PagerState<S::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy)]
enum Fetch {
    Refresh,
    Append,
}

/// Marks one refresh or append as in flight until it finishes.
///
/// When the fetching future is dropped first, the flag is cleared and the load
/// state it replaced is restored, unless a newer refresh has taken over.
struct InFlight<'a, S: PagingSource> {
    pager: &'a Pager<S>,
    fetch: Fetch,
    generation: u64,
    replaced: Option<LoadState>,
}

impl<'a, S: PagingSource> InFlight<'a, S> {
    fn new(pager: &'a Pager<S>, fetch: Fetch, generation: u64, replaced: LoadState) -> Self {
        Self {
            pager,
            fetch,
            generation,
            replaced: Some(replaced),
        }
    }

    /// The fetch completed; its result is applied by the caller.
    fn finish(mut self) -> u64 {
        self.replaced = None;
        self.generation
    }
}

impl<S: PagingSource> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        let Some(replaced) = self.replaced.take() else {
            return;
        };
        let mut state = self.pager.lock();
        if state.generation != self.generation {
            return;
        }
        match self.fetch {
            Fetch::Refresh if state.refresh_in_flight => {
                state.refresh_in_flight = false;
                state.load_states.refresh = replaced;
            }
            Fetch::Append if state.append_in_flight => {
                state.append_in_flight = false;
                state.load_states.append = replaced;
            }
            _ => return,
        }
        debug!(target: "paging", fetch = ?self.fetch, "fetch cancelled before completion");
        self.pager.publish(&state);
    }
}
