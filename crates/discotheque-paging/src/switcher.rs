// SPDX-License-Identifier: GPL-3.0-or-later

use crate::pager::{LoadOutcome, Pager, PagingSnapshot};
use crate::source::PagingSource;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

type SourceFactory<P, S> = Box<dyn Fn(&P) -> Option<S> + Send + Sync>;

/// Pager bound to one parameter value, together with every task working for it.
struct ActivePager<S: PagingSource> {
    pager: Arc<Pager<S>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<S: PagingSource> Drop for ActivePager<S> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

struct SwitchState<S: PagingSource> {
    generation: u64,
    active: Option<ActivePager<S>>,
}

/// Re-derives a paged list whenever its parameter value changes.
///
/// Every distinct value gets a fresh [`Pager`] starting at the first page. The
/// previous pager's tasks are aborted and its snapshots are fenced off by a
/// generation counter, so nothing from an abandoned value reaches the output.
/// When the factory yields no source (e.g. a blank query) the output becomes
/// empty without any fetch.
///
/// Tasks are spawned on the ambient tokio runtime. Dropping the switcher
/// aborts all of them.
pub struct PagingSwitcher<P, S: PagingSource> {
    factory: SourceFactory<P, S>,
    params: watch::Sender<P>,
    output: Arc<watch::Sender<PagingSnapshot<S::Item>>>,
    state: Arc<Mutex<SwitchState<S>>>,
}

impl<P, S> PagingSwitcher<P, S>
where
    P: Clone + PartialEq + Send + Sync + 'static,
    S: PagingSource,
{
    pub fn new<F>(initial: P, factory: F) -> Self
    where
        F: Fn(&P) -> Option<S> + Send + Sync + 'static,
    {
        let (params, _) = watch::channel(initial.clone());
        let (output, _) = watch::channel(PagingSnapshot::idle());
        let switcher = Self {
            factory: Box::new(factory),
            params,
            output: Arc::new(output),
            state: Arc::new(Mutex::new(SwitchState {
                generation: 0,
                active: None,
            })),
        };
        {
            let mut state = switcher.lock();
            switcher.activate(&mut state, &initial);
        }
        switcher
    }

    /// Current parameter value, observable.
    pub fn params(&self) -> watch::Receiver<P> {
        self.params.subscribe()
    }

    pub fn current_params(&self) -> P {
        self.params.borrow().clone()
    }

    /// Replace the parameter value. Returns false when it equals the current one.
    pub fn set_params(&self, params: P) -> bool {
        let mut state = self.lock();
        let changed = self.params.send_if_modified(|current| {
            if *current == params {
                false
            } else {
                *current = params.clone();
                true
            }
        });
        if changed {
            self.activate(&mut state, &params);
        }
        changed
    }

    /// Receiver replaying the latest snapshot, then every change.
    pub fn subscribe(&self) -> watch::Receiver<PagingSnapshot<S::Item>> {
        self.output.subscribe()
    }

    pub fn snapshot(&self) -> PagingSnapshot<S::Item> {
        self.output.borrow().clone()
    }

    /// Pager serving the current parameter value, if any.
    pub fn pager(&self) -> Option<Arc<Pager<S>>> {
        self.lock()
            .active
            .as_ref()
            .map(|active| Arc::clone(&active.pager))
    }

    /// Start loading the next page. Returns false when there is no active pager.
    pub fn load_more(&self) -> bool {
        self.dispatch("load_more", |pager| async move { pager.load_more().await })
    }

    /// Load the next page and wait for it to be applied or fail.
    ///
    /// The output carries the pager's latest snapshot by the time this returns.
    /// `None` when there is no active pager.
    pub async fn load_more_and_wait(&self) -> Option<LoadOutcome> {
        let (pager, generation) = {
            let state = self.lock();
            let active = state.active.as_ref()?;
            (Arc::clone(&active.pager), state.generation)
        };
        let outcome = pager.load_more().await;
        trace!(target: "paging", ?outcome, "awaited load_more finished");
        forward(
            &Arc::downgrade(&self.state),
            generation,
            &self.output,
            &mut pager.subscribe(),
        );
        Some(outcome)
    }

    /// Reload the current list, resuming near `anchor_position` when given.
    pub fn refresh(&self, anchor_position: Option<usize>) -> bool {
        self.dispatch("refresh", move |pager| async move {
            pager.refresh(anchor_position).await
        })
    }

    /// Re-issue the failed refresh or append of the current list.
    pub fn retry(&self) -> bool {
        self.dispatch("retry", |pager| async move { pager.retry().await })
    }

    /// Abandon the current pager and all of its in-flight work, leaving the
    /// output empty.
    pub fn close(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.active = None;
        debug!(target: "paging", generation = state.generation, "switcher closed");
        self.output.send_replace(PagingSnapshot::empty());
    }

    fn dispatch<F, Fut>(&self, operation: &'static str, op: F) -> bool
    where
        F: FnOnce(Arc<Pager<S>>) -> Fut,
        Fut: Future<Output = LoadOutcome> + Send + 'static,
    {
        let mut state = self.lock();
        let Some(active) = state.active.as_mut() else {
            trace!(target: "paging", operation, "no active pager");
            return false;
        };
        active.tasks.retain(|task| !task.is_finished());
        let fut = op(Arc::clone(&active.pager));
        active.tasks.push(tokio::spawn(async move {
            let outcome = fut.await;
            trace!(target: "paging", operation, ?outcome, "pager operation finished");
        }));
        true
    }

    fn activate(&self, state: &mut SwitchState<S>, params: &P) {
        state.generation += 1;
        // Dropping the previous pager aborts its tasks.
        state.active = None;
        let generation = state.generation;

        let Some(source) = (self.factory)(params) else {
            debug!(target: "paging", generation, "parameters yield no source, publishing empty list");
            self.output.send_replace(PagingSnapshot::empty());
            return;
        };

        debug!(target: "paging", generation, "starting pager for new parameters");
        let pager = Arc::new(Pager::new(source));
        let mut snapshots = pager.subscribe();
        self.output.send_replace(snapshots.borrow_and_update().clone());

        let forwarder = {
            let state = Arc::downgrade(&self.state);
            let output = Arc::clone(&self.output);
            tokio::spawn(async move {
                while snapshots.changed().await.is_ok() {
                    if !forward(&state, generation, &output, &mut snapshots) {
                        break;
                    }
                }
            })
        };
        let refresh = {
            let pager = Arc::clone(&pager);
            tokio::spawn(async move {
                let outcome = pager.refresh(None).await;
                trace!(target: "paging", ?outcome, "initial refresh finished");
            })
        };

        state.active = Some(ActivePager {
            pager,
            tasks: vec![forwarder, refresh],
        });
    }

    fn lock(&self) -> MutexGuard<'_, SwitchState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publishes the pager's latest snapshot unless `generation` is no longer current.
/// Returns false once it never will be.
///
/// The snapshot is read under the switch lock, so concurrent forwards cannot
/// publish an older snapshot after a newer one.
fn forward<S: PagingSource>(
    state: &Weak<Mutex<SwitchState<S>>>,
    generation: u64,
    output: &watch::Sender<PagingSnapshot<S::Item>>,
    snapshots: &mut watch::Receiver<PagingSnapshot<S::Item>>,
) -> bool {
    let Some(state) = state.upgrade() else {
        return false;
    };
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if state.generation != generation {
        trace!(target: "paging", generation, "discarding snapshot from abandoned parameters");
        return false;
    }
    output.send_replace(snapshots.borrow_and_update().clone());
    true
}
