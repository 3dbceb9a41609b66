use hostblock_application::services::DomainBlockEngine;
use hostblock_domain::DomainOutcome;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

const EVENT_CAPACITY: usize = 16;

/// Latest deadline an expiry can have; longer durations are clamped to it.
pub const MAX_EXPIRY: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Snapshot of the armed expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedExpiry {
    pub generation: u64,
    pub deadline: Instant,
    pub domains: Vec<String>,
}

impl ArmedExpiry {
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// Published once an armed expiry fires and its unblock batch has run.
#[derive(Debug, Clone)]
pub struct ExpiryEvent {
    pub generation: u64,
    pub outcomes: Vec<DomainOutcome>,
}

struct PendingExpiry {
    armed: ArmedExpiry,
    token: CancellationToken,
}

#[derive(Default)]
struct SchedulerState {
    pending: Option<PendingExpiry>,
    next_generation: u64,
}

struct Inner {
    engine: Arc<DomainBlockEngine>,
    state: Mutex<SchedulerState>,
    events: broadcast::Sender<ExpiryEvent>,
}

/// Holds at most one pending "unblock these domains at time T" action.
///
/// Arming replaces the pending action, and a replaced or cancelled action never
/// runs. Firing takes the same lock as `arm` and `cancel` and runs its whole
/// unblock batch while holding it. Nothing is persisted across restarts.
#[derive(Clone)]
pub struct ExpiryScheduler {
    inner: Arc<Inner>,
    runtime: Handle,
}

impl ExpiryScheduler {
    pub fn new(engine: Arc<DomainBlockEngine>, runtime: Handle) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                engine,
                state: Mutex::new(SchedulerState::default()),
                events,
            }),
            runtime,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExpiryEvent> {
        self.inner.events.subscribe()
    }

    /// Durations above [`MAX_EXPIRY`] are clamped.
    #[instrument(skip(self, domains), fields(domains = domains.len()))]
    pub fn arm(&self, duration: Duration, domains: Vec<String>) -> ArmedExpiry {
        let token = CancellationToken::new();
        let armed = {
            let mut state = self.inner.state.lock();
            if let Some(previous) = state.pending.take() {
                previous.token.cancel();
                info!(
                    generation = previous.armed.generation,
                    "Pending expiry replaced"
                );
            }

            state.next_generation += 1;
            let now = Instant::now();
            let deadline = now
                .checked_add(duration.min(MAX_EXPIRY))
                .or_else(|| now.checked_add(Duration::from_secs(24 * 60 * 60)))
                .unwrap_or(now);
            let armed = ArmedExpiry {
                generation: state.next_generation,
                deadline,
                domains,
            };
            state.pending = Some(PendingExpiry {
                armed: armed.clone(),
                token: token.clone(),
            });
            armed
        };

        let inner = self.inner.clone();
        let generation = armed.generation;
        let deadline = armed.deadline;
        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(generation, "Expiry timer stopped");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    if let Err(e) = tokio::task::spawn_blocking(move || inner.fire(generation)).await {
                        error!(generation, error = %e, "Expiry task failed");
                    }
                }
            }
        });

        info!(
            generation,
            seconds = duration.as_secs(),
            "Expiry armed"
        );
        armed
    }

    /// Drops the pending expiry, if any. Returns whether one was pending.
    #[instrument(skip(self))]
    pub fn cancel(&self) -> bool {
        match self.inner.state.lock().pending.take() {
            Some(pending) => {
                pending.token.cancel();
                info!(generation = pending.armed.generation, "Expiry cancelled");
                true
            }
            None => false,
        }
    }

    /// Blocks the domains that are not blocked yet, then arms an expiry for every
    /// domain whose block succeeded.
    ///
    /// Calls the engine synchronously; async callers should run this on a
    /// blocking thread.
    #[instrument(skip(self, domains), fields(domains = domains.len()))]
    pub fn block_for(
        &self,
        duration: Duration,
        domains: &[String],
    ) -> (Vec<DomainOutcome>, ArmedExpiry) {
        let outcomes = self.inner.engine.block_missing(domains);
        let blocked: Vec<String> = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|edit| edit.domain.to_string()))
            .collect();

        if blocked.len() < domains.len() {
            warn!(
                blocked = blocked.len(),
                requested = domains.len(),
                "Some domains could not be blocked and will not expire"
            );
        }

        let armed = self.arm(duration, blocked);
        (outcomes, armed)
    }

    pub fn pending(&self) -> Option<ArmedExpiry> {
        self.inner
            .state
            .lock()
            .pending
            .as_ref()
            .map(|p| p.armed.clone())
    }
}

impl Inner {
    fn fire(&self, generation: u64) {
        let outcomes = {
            let mut state = self.state.lock();
            let current = state.pending.as_ref().map(|p| p.armed.generation);
            if current != Some(generation) {
                debug!(generation, ?current, "Stale expiry suppressed");
                return;
            }
            let Some(pending) = state.pending.take() else {
                return;
            };

            info!(generation, domains = pending.armed.domains.len(), "Expiry fired");
            self.engine.unblock_batch(&pending.armed.domains)
        };

        let event = ExpiryEvent {
            generation,
            outcomes,
        };
        if self.events.send(event).is_err() {
            debug!(generation, "No expiry subscribers");
        }
    }
}
