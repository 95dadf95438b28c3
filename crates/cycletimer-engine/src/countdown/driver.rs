//! Countdown driver - turns the passage of wall-clock time into elapsed
//! updates and a finish signal for one cycle.

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use cycletimer_core::clock::seconds_between;

use crate::cycle::{CycleEvent, CycleEventType, CycleStore};

/// Result of a single countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down
    Running { elapsed_seconds: u64 },
    /// Target reached; the cycle was marked finished
    Finished { elapsed_seconds: u64 },
    /// The bound cycle is no longer active
    Detached,
}

/// Driver bound to a single active cycle
#[derive(Clone)]
pub struct CountdownDriver {
    store: CycleStore,
    cycle_id: String,
    start_date: DateTime<Utc>,
    target_seconds: u64,
}

impl CountdownDriver {
    /// Bind to `cycle_id` if it is the store's active cycle.
    pub async fn bind(store: &CycleStore, cycle_id: &str) -> Option<Self> {
        let cycle = store.active_cycle().await?;
        if cycle.id != cycle_id {
            return None;
        }

        Some(Self {
            store: store.clone(),
            cycle_id: cycle.id.clone(),
            start_date: cycle.start_date,
            target_seconds: cycle.target_seconds(),
        })
    }

    /// Bind to whatever cycle is active. `None` means the driver is idle.
    pub async fn bind_active(store: &CycleStore) -> Option<Self> {
        let cycle_id = store.active_cycle_id().await?;
        Self::bind(store, &cycle_id).await
    }

    pub fn cycle_id(&self) -> &str {
        &self.cycle_id
    }

    pub fn target_seconds(&self) -> u64 {
        self.target_seconds
    }

    /// Recompute elapsed time from the cycle's start date and report it.
    pub async fn tick(&self) -> TickOutcome {
        let now = self.store.clock().now();
        let elapsed = seconds_between(self.start_date, now);

        if elapsed >= self.target_seconds {
            return match self.store.finish_cycle(&self.cycle_id).await {
                Some(_) => TickOutcome::Finished {
                    elapsed_seconds: self.target_seconds,
                },
                None => TickOutcome::Detached,
            };
        }

        if self.store.set_elapsed_for(&self.cycle_id, elapsed).await {
            TickOutcome::Running {
                elapsed_seconds: elapsed,
            }
        } else {
            TickOutcome::Detached
        }
    }

    /// Tick every `period` until the cycle finishes, stops being active, or
    /// `stop_rx` fires (or its sender is dropped).
    pub async fn run(self, period: Duration, mut stop_rx: oneshot::Receiver<()>) {
        let mut events = self.store.subscribe();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(cycle_id = %self.cycle_id, "Countdown driver started");

        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    tracing::debug!(cycle_id = %self.cycle_id, "Countdown driver stopped");
                    break;
                }
                event = events.recv() => {
                    match event {
                        Ok(event) if self.is_released_by(&event) => {
                            tracing::debug!(cycle_id = %self.cycle_id, "Cycle no longer active");
                            break;
                        }
                        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = ticker.tick() => {
                    match self.tick().await {
                        TickOutcome::Running { .. } => {}
                        TickOutcome::Finished { elapsed_seconds } => {
                            tracing::info!(
                                cycle_id = %self.cycle_id,
                                elapsed_seconds,
                                "Countdown completed"
                            );
                            break;
                        }
                        TickOutcome::Detached => {
                            tracing::debug!(cycle_id = %self.cycle_id, "Cycle no longer active");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Start ticking on a background task.
    pub fn spawn(self, period: Duration) -> DriverHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let cycle_id = self.cycle_id.clone();
        let task = tokio::spawn(self.run(period, stop_rx));

        DriverHandle {
            cycle_id,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    fn is_released_by(&self, event: &CycleEvent) -> bool {
        if event.cycle_id == self.cycle_id {
            event.is_terminal()
        } else {
            matches!(event.event_type, CycleEventType::Created { .. })
        }
    }
}

/// Owned binding of one running driver task. Dropping the handle signals the
/// task to stop; [`DriverHandle::stop`] also waits for it to exit.
pub struct DriverHandle {
    cycle_id: String,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DriverHandle {
    pub fn cycle_id(&self) -> &str {
        &self.cycle_id
    }

    /// Whether the driver task has exited on its own.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Signal the driver to stop and wait until it has.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(cycle_id = %self.cycle_id, "Countdown driver task failed: {}", e);
            }
        }
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}
