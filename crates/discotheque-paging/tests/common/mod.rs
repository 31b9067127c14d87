//! Scripted paging source shared by the pager and switcher tests.

#![allow(dead_code)]

use async_trait::async_trait;
use discotheque_discogs::{DiscogsError, StatusCode};
use discotheque_domain::{ListItem, PageToken, FIRST_PAGE};
use discotheque_paging::{Page, PagingSnapshot, PagingSource};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItem {
    pub id: u64,
    pub label: String,
}

impl ListItem for TestItem {
    fn item_id(&self) -> u64 {
        self.id
    }
}

struct Script {
    label: String,
    pages: Vec<Vec<u64>>,
    calls: Mutex<Vec<PageToken>>,
    completed: Mutex<Vec<PageToken>>,
    failing: Mutex<HashSet<PageToken>>,
    gates: Mutex<HashMap<PageToken, watch::Sender<bool>>>,
}

/// Serves fixed pages of ids. Clones share call records, failures and gates.
#[derive(Clone)]
pub struct FakeSource {
    script: Arc<Script>,
}

impl FakeSource {
    pub fn with_pages(label: &str, pages: Vec<Vec<u64>>) -> Self {
        Self {
            script: Arc::new(Script {
                label: label.to_string(),
                pages,
                calls: Mutex::new(Vec::new()),
                completed: Mutex::new(Vec::new()),
                failing: Mutex::new(HashSet::new()),
                gates: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// `count` pages of two consecutive ids each.
    pub fn sequential(label: &str, count: u64) -> Self {
        Self::with_pages(
            label,
            (0..count).map(|page| vec![page * 2 + 1, page * 2 + 2]).collect(),
        )
    }

    /// Page numbers requested so far, including requests still in progress.
    pub fn calls(&self) -> Vec<PageToken> {
        self.script.calls.lock().unwrap().clone()
    }

    /// Page numbers whose load ran to a successful end.
    pub fn completed(&self) -> Vec<PageToken> {
        self.script.completed.lock().unwrap().clone()
    }

    pub fn fail(&self, page: PageToken) {
        self.script.failing.lock().unwrap().insert(page);
    }

    pub fn heal(&self, page: PageToken) {
        self.script.failing.lock().unwrap().remove(&page);
    }

    /// Loads of `page` block until [`FakeSource::open`] is called.
    pub fn hold(&self, page: PageToken) {
        let (gate, _) = watch::channel(false);
        self.script.gates.lock().unwrap().insert(page, gate);
    }

    pub fn open(&self, page: PageToken) {
        if let Some(gate) = self.script.gates.lock().unwrap().get(&page) {
            gate.send_replace(true);
        }
    }

    pub async fn wait_for_calls(&self, count: usize) {
        tokio::time::timeout(WAIT, async {
            while self.calls().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("source was not called in time");
    }

    pub fn items(&self, ids: &[u64]) -> Vec<TestItem> {
        ids.iter().map(|id| self.item(*id)).collect()
    }

    fn item(&self, id: u64) -> TestItem {
        TestItem {
            id,
            label: format!("{}-{}", self.script.label, id),
        }
    }
}

#[async_trait]
impl PagingSource for FakeSource {
    type Item = TestItem;

    async fn load(&self, key: Option<PageToken>) -> Result<Page<TestItem>, DiscogsError> {
        let page = key.unwrap_or(FIRST_PAGE);
        self.script.calls.lock().unwrap().push(page);

        let gate = self
            .script
            .gates
            .lock()
            .unwrap()
            .get(&page)
            .map(|gate| gate.subscribe());
        if let Some(mut gate) = gate {
            let _ = gate.wait_for(|open| *open).await;
        }

        if self.script.failing.lock().unwrap().contains(&page) {
            return Err(DiscogsError::HttpStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "scripted failure".to_string(),
            });
        }

        self.script.completed.lock().unwrap().push(page);
        let ids = self
            .script
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        Ok(Page {
            items: self.items(&ids),
            prev_key: (page > FIRST_PAGE).then(|| page - 1),
            next_key: ((page as usize) < self.script.pages.len()).then(|| page + 1),
        })
    }
}

/// Waits until the published snapshot satisfies `predicate` and returns it.
pub async fn wait_until<T: Clone>(
    snapshots: &mut watch::Receiver<PagingSnapshot<T>>,
    predicate: impl FnMut(&PagingSnapshot<T>) -> bool,
) -> PagingSnapshot<T> {
    let snapshot = tokio::time::timeout(WAIT, snapshots.wait_for(predicate))
        .await
        .expect("snapshot condition not reached in time")
        .expect("snapshot channel closed");
    (*snapshot).clone()
}

pub fn ids<T: ListItem>(items: &[T]) -> Vec<u64> {
    items.iter().map(ListItem::item_id).collect()
}
