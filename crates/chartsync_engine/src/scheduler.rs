//! Group scheduling across record types.

use crate::clock::{Clock, SystemClock};
use crate::config::SyncGroup;
use crate::coordinator::ModelSync;
use crate::error::SyncResult;
use crate::events::{GroupOutcome, SyncGroupEvent, SyncProgress};
use crate::history::{MemorySyncHistory, SyncHistory};
use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info};

type Observer = Box<dyn Fn(&SyncGroupEvent) + Send + Sync>;
type SessionGate = Box<dyn Fn() -> bool + Send + Sync>;
type PurgeHook = Box<dyn Fn() + Send + Sync>;

/// Triggers registered syncs group by group, on a timer or on demand.
///
/// Coordinators for different record types may run concurrently (they touch
/// disjoint records), but total concurrency is capped by `max_parallel` to
/// bound network and store contention. Within one coordinator, push-then-pull
/// ordering is the coordinator's own guarantee.
pub struct SyncGroupScheduler {
    syncs: Vec<Arc<dyn ModelSync>>,
    history: Arc<dyn SyncHistory>,
    clock: Arc<dyn Clock>,
    session_gate: SessionGate,
    observers: RwLock<Vec<Observer>>,
    purge_hook: Option<PurgeHook>,
    max_parallel: usize,
    stopped: Mutex<bool>,
    wakeup: Condvar,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncGroupScheduler {
    /// Creates a scheduler over the registered syncs.
    pub fn new(syncs: Vec<Arc<dyn ModelSync>>) -> Self {
        Self {
            syncs,
            history: Arc::new(MemorySyncHistory::new()),
            clock: Arc::new(SystemClock),
            session_gate: Box::new(|| true),
            observers: RwLock::new(Vec::new()),
            purge_hook: None,
            max_parallel: 1,
            stopped: Mutex::new(false),
            wakeup: Condvar::new(),
            timers: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the last-sync bookkeeping store.
    pub fn with_history(mut self, history: Arc<dyn SyncHistory>) -> Self {
        self.history = history;
        self
    }

    /// Replaces the clock used for bookkeeping timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Installs the predicate consulted before running a sync that requires
    /// an approved session. Gated syncs are silently skipped while the
    /// predicate returns false; a skip is not a failure.
    pub fn with_session_gate(
        mut self,
        gate: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        self.session_gate = Box::new(gate);
        self
    }

    /// Caps how many coordinators run concurrently within one group.
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Installs a hook that runs after a full [`sync_all`](Self::sync_all)
    /// in which every record type succeeded. The application layer typically
    /// purges unreferenced cached records here.
    pub fn with_purge_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.purge_hook = Some(Box::new(hook));
        self
    }

    /// Registers an observer for group progress events.
    pub fn subscribe(&self, observer: impl Fn(&SyncGroupEvent) + Send + Sync + 'static) {
        self.observers.write().push(Box::new(observer));
    }

    /// When the group last completed with every record type succeeding.
    pub fn last_synced_at(&self, group: SyncGroup) -> Option<DateTime<Utc>> {
        self.history.last_success(group)
    }

    /// Runs every sync in `group` once, out-of-cadence. Does not disturb the
    /// scheduled timers.
    pub fn run_group(&self, group: SyncGroup) -> GroupOutcome {
        self.emit(SyncGroupEvent {
            group,
            progress: SyncProgress::Syncing,
        });

        let runnable: Vec<Arc<dyn ModelSync>> = self
            .syncs
            .iter()
            .filter(|sync| sync.config().group == group)
            .filter(|sync| {
                let allowed = !sync.requires_approved_session() || (self.session_gate)();
                if !allowed {
                    debug!(name = sync.name(), "skipping sync pending session approval");
                }
                allowed
            })
            .cloned()
            .collect();

        let results = self.run_bounded(runnable);

        let mut failures: Vec<(String, String)> = Vec::new();
        for (name, result) in &results {
            if let Err(err) = result {
                error!(name = %name, error = %err, "sync failed");
                failures.push((name.clone(), err.to_string()));
            }
        }

        let outcome = if failures.is_empty() {
            GroupOutcome::AllSucceeded
        } else if failures.len() == results.len() {
            GroupOutcome::AllFailed
        } else {
            GroupOutcome::PartialFailure(failures.iter().map(|(name, _)| name.clone()).collect())
        };

        match &outcome {
            GroupOutcome::AllSucceeded => {
                self.history.record_success(group, self.clock.now());
                self.emit(SyncGroupEvent {
                    group,
                    progress: SyncProgress::Succeeded,
                });
            }
            _ => {
                let reason = failures
                    .first()
                    .map(|(_, message)| message.clone())
                    .unwrap_or_default();
                self.emit(SyncGroupEvent {
                    group,
                    progress: SyncProgress::Failed { reason },
                });
            }
        }

        info!(%group, ?outcome, "group sync finished");
        outcome
    }

    /// Runs every group once, in scheduling order.
    ///
    /// If every record type in every group succeeded, the purge hook runs.
    pub fn sync_all(&self) -> Vec<(SyncGroup, GroupOutcome)> {
        let outcomes: Vec<(SyncGroup, GroupOutcome)> = self
            .groups()
            .into_iter()
            .map(|group| (group, self.run_group(group)))
            .collect();

        let all_succeeded =
            !outcomes.is_empty() && outcomes.iter().all(|(_, outcome)| outcome.is_success());
        if all_succeeded {
            if let Some(hook) = &self.purge_hook {
                debug!("all groups synced, running purge hook");
                hook();
            }
        }

        outcomes
    }

    /// Starts one timer per group; the timers run until
    /// [`stop`](Self::stop). Call on an `Arc` clone — the timer threads keep
    /// the scheduler alive.
    pub fn start(self: Arc<Self>) {
        let mut timers = self.timers.lock();
        if !timers.is_empty() {
            return;
        }
        *self.stopped.lock() = false;

        for group in self.groups() {
            let period = self.period_for(group);
            let scheduler = Arc::clone(&self);
            timers.push(std::thread::spawn(move || {
                scheduler.timer_loop(group, period);
            }));
        }
    }

    /// Stops the timers and waits for them to exit. Syncs already running
    /// finish normally.
    pub fn stop(&self) {
        *self.stopped.lock() = true;
        self.wakeup.notify_all();

        let handles: Vec<JoinHandle<()>> = self.timers.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.join();
        }
    }

    fn timer_loop(&self, group: SyncGroup, period: Duration) {
        loop {
            {
                let mut stopped = self.stopped.lock();
                if !*stopped {
                    self.wakeup.wait_for(&mut stopped, period);
                }
                if *stopped {
                    return;
                }
            }
            debug!(%group, "scheduled tick");
            self.run_group(group);
        }
    }

    /// Distinct groups with at least one registered sync, in scheduling
    /// order.
    fn groups(&self) -> Vec<SyncGroup> {
        SyncGroup::all()
            .into_iter()
            .filter(|group| self.syncs.iter().any(|sync| sync.config().group == *group))
            .collect()
    }

    fn period_for(&self, group: SyncGroup) -> Duration {
        self.syncs
            .iter()
            .filter(|sync| sync.config().group == group)
            .map(|sync| sync.config().interval)
            .min()
            .unwrap_or_else(|| group.default_period())
    }

    fn run_bounded(
        &self,
        syncs: Vec<Arc<dyn ModelSync>>,
    ) -> Vec<(String, SyncResult<()>)> {
        if self.max_parallel <= 1 || syncs.len() <= 1 {
            return syncs
                .iter()
                .map(|sync| (sync.name().to_string(), sync.sync()))
                .collect();
        }

        let workers = self.max_parallel.min(syncs.len());
        let queue: Mutex<VecDeque<Arc<dyn ModelSync>>> = Mutex::new(syncs.into_iter().collect());
        let results: Mutex<Vec<(String, SyncResult<()>)>> = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let Some(sync) = queue.lock().pop_front() else {
                        break;
                    };
                    let result = sync.sync();
                    results.lock().push((sync.name().to_string(), result));
                });
            }
        });

        results.into_inner()
    }

    fn emit(&self, event: SyncGroupEvent) {
        for observer in self.observers.read().iter() {
            observer(&event);
        }
    }
}
