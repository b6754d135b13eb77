use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::state::ViewState;
use crate::config::UPDATE_TIME;
use crate::models::FetchOutcome;
use crate::sources::SupplySource;

/// Decides whether a completed fetch may replace the committed state.
///
/// Fetches are never awaited by the ticker, so a slow request can complete
/// after one issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Only a fetch issued after the one currently shown may replace it.
    #[default]
    LatestIssued,
    /// Whatever resolves last wins, even if it was issued earlier.
    LastResolved,
}

impl CommitPolicy {
    fn accepts(self, committed_seq: u64, seq: u64) -> bool {
        match self {
            CommitPolicy::LatestIssued => seq > committed_seq,
            CommitPolicy::LastResolved => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct PollerStats {
    pub issued: AtomicU64,
    pub committed: AtomicU64,
    pub failed: AtomicU64,
    pub malformed: AtomicU64,
    pub discarded: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub issued: u64,
    pub committed: u64,
    pub failed: u64,
    pub malformed: u64,
    pub discarded: u64,
}

impl PollerStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            issued: self.issued.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

struct Committed {
    view: ViewState,
    /// Issue number of the fetch that produced `view`, 0 before any commit.
    seq: u64,
}

struct Shared {
    committed: RwLock<Committed>,
    active: AtomicBool,
    next_seq: AtomicU64,
    policy: CommitPolicy,
    revision: watch::Sender<u64>,
    stats: PollerStats,
}

impl Shared {
    fn commit(&self, seq: u64, outcome: FetchOutcome) {
        if let FetchOutcome::Failed(e) = &outcome {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Supply fetch #{} failed: {}", seq, e);
        } else if matches!(outcome, FetchOutcome::Malformed) {
            self.stats.malformed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Supply fetch #{} returned a malformed payload", seq);
        }

        let Some(next) = ViewState::after(outcome) else {
            return;
        };

        {
            let mut committed = self.committed.write();
            if !self.active.load(Ordering::Acquire) {
                self.stats.discarded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Fetch #{} resolved after shutdown, discarded", seq);
                return;
            }
            if !self.policy.accepts(committed.seq, seq) {
                self.stats.discarded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    "Fetch #{} is older than the shown #{}, discarded",
                    seq,
                    committed.seq
                );
                return;
            }
            committed.seq = seq;
            committed.view = next;
        }

        self.stats.committed.fetch_add(1, Ordering::Relaxed);
        self.revision.send_modify(|r| *r += 1);
    }
}

/// Fetches supply info immediately and then once per period.
pub struct SupplyPoller {
    source: Arc<dyn SupplySource>,
    period: Duration,
    policy: CommitPolicy,
}

impl SupplyPoller {
    pub fn new(source: Arc<dyn SupplySource>) -> Self {
        Self {
            source,
            period: UPDATE_TIME,
            policy: CommitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Single fetch outside of any schedule.
    pub async fn poll_once(&self) -> FetchOutcome {
        FetchOutcome::from_result(self.source.fetch_supply().await)
    }

    /// Arms the ticker. The first fetch is issued right away; dropping or
    /// shutting down the handle stops the ticker.
    pub fn start(self) -> PollerHandle {
        let (revision, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            committed: RwLock::new(Committed {
                view: ViewState::Loading,
                seq: 0,
            }),
            active: AtomicBool::new(true),
            next_seq: AtomicU64::new(1),
            policy: self.policy,
            revision,
            stats: PollerStats::default(),
        });

        tracing::info!(
            "Polling {} every {}ms ({:?})",
            self.source.name(),
            self.period.as_millis(),
            self.policy
        );

        let task = {
            let shared = shared.clone();
            let source = self.source;
            let period = self.period;
            tokio::spawn(async move {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    if !shared.active.load(Ordering::Acquire) {
                        break;
                    }

                    let seq = shared.next_seq.fetch_add(1, Ordering::Relaxed);
                    shared.stats.issued.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("Issuing supply fetch #{}", seq);

                    // Not awaited here: a slow backend must not stretch the cadence.
                    let source = source.clone();
                    let shared = shared.clone();
                    tokio::spawn(async move {
                        let outcome = FetchOutcome::from_result(source.fetch_supply().await);
                        shared.commit(seq, outcome);
                    });
                }
            })
        };

        PollerHandle {
            shared,
            task: Mutex::new(Some(task)),
        }
    }
}

/// Running poller. Read the view from here; drop or [`shutdown`](Self::shutdown) to stop.
pub struct PollerHandle {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollerHandle {
    pub fn view(&self) -> ViewState {
        self.shared.committed.read().view.clone()
    }

    /// Bumped on every committed state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Stops the ticker. Requests already in flight run to completion but
    /// their results are dropped.
    pub fn shutdown(&self) {
        if self.shared.active.swap(false, Ordering::AcqRel) {
            if let Some(task) = self.task.lock().take() {
                task.abort();
            }
            tracing::info!("Supply poller stopped");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
