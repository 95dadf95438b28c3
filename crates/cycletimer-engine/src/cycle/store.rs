//! Cycle store - the single source of truth for cycles and the active one

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use cycletimer_core::format::Countdown;
use cycletimer_core::models::{Cycle, NewCycle};
use cycletimer_core::{SharedClock, SystemClock};

use super::events::CycleEvent;

#[derive(Debug, Default)]
struct StoreState {
    /// Append-only history, oldest first
    cycles: Vec<Cycle>,
    active_cycle_id: Option<String>,
    /// Last elapsed value reported for the active cycle
    elapsed_seconds: u64,
}

impl StoreState {
    fn active_index(&self) -> Option<usize> {
        let active_id = self.active_cycle_id.as_deref()?;
        self.cycles
            .iter()
            .position(|cycle| cycle.id == active_id && cycle.is_active())
    }

    fn active_cycle(&self) -> Option<&Cycle> {
        self.active_index().map(|i| &self.cycles[i])
    }

    fn is_active_id(&self, cycle_id: &str) -> bool {
        self.active_cycle().is_some_and(|cycle| cycle.id == cycle_id)
    }
}

/// Point-in-time view of the store for display
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSnapshot {
    pub active_cycle: Option<Cycle>,
    pub elapsed_seconds: u64,
}

impl CycleSnapshot {
    /// Seconds left on the active cycle, `None` when idle.
    pub fn remaining_seconds(&self) -> Option<u64> {
        self.active_cycle
            .as_ref()
            .map(|cycle| cycle.target_seconds().saturating_sub(self.elapsed_seconds))
    }

    pub fn countdown(&self) -> Countdown {
        match self.active_cycle {
            Some(ref cycle) => Countdown::remaining(cycle.target_seconds(), self.elapsed_seconds),
            None => Countdown::from_seconds(0),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active_cycle.is_none()
    }
}

/// Shared handle to the cycle list. Clones refer to the same state, and every
/// mutation is broadcast to all subscribers.
#[derive(Clone)]
pub struct CycleStore {
    state: Arc<RwLock<StoreState>>,
    event_tx: broadcast::Sender<CycleEvent>,
    clock: SharedClock,
}

impl CycleStore {
    /// Create a store reading the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock::shared())
    }

    pub fn with_clock(clock: SharedClock) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            event_tx,
            clock,
        }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Subscribe to cycle events
    pub fn subscribe(&self) -> broadcast::Receiver<CycleEvent> {
        self.event_tx.subscribe()
    }

    /// Append a new active cycle and return its id.
    ///
    /// A cycle that is still active is interrupted first, at the same instant
    /// the new one starts.
    pub async fn create_cycle(&self, new_cycle: NewCycle) -> String {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        if let Some(index) = state.active_index() {
            let previous = &mut state.cycles[index];
            let elapsed = previous.elapsed_at(now);
            if previous.interrupt(now).is_ok() {
                tracing::info!(
                    cycle_id = %previous.id,
                    elapsed,
                    "Interrupting active cycle to start a new one"
                );
                self.emit(CycleEvent::interrupted(previous.id.clone(), elapsed, now));
            }
        }

        let cycle = Cycle::new(new_cycle.task, new_cycle.minutes_amount, now);
        let cycle_id = cycle.id.clone();

        tracing::info!(
            cycle_id = %cycle_id,
            task = %cycle.task,
            minutes = cycle.minutes_amount,
            "Cycle created"
        );

        let event = CycleEvent::created(
            cycle_id.clone(),
            cycle.task.clone(),
            cycle.minutes_amount,
            now,
        );

        state.cycles.push(cycle);
        state.active_cycle_id = Some(cycle_id.clone());
        state.elapsed_seconds = 0;
        drop(state);

        self.emit(event);
        cycle_id
    }

    /// Finish the active cycle, if any. Returns the finished cycle.
    pub async fn mark_active_cycle_finished(&self) -> Option<Cycle> {
        let mut state = self.state.write().await;
        let Some(cycle_id) = state.active_cycle().map(|cycle| cycle.id.clone()) else {
            tracing::debug!("No active cycle to finish");
            return None;
        };
        self.finish_locked(&mut state, &cycle_id, None)
    }

    /// Finish `cycle_id` only if it is still the active cycle, recording its
    /// target duration as the final elapsed value.
    pub async fn finish_cycle(&self, cycle_id: &str) -> Option<Cycle> {
        let mut state = self.state.write().await;
        if !state.is_active_id(cycle_id) {
            tracing::debug!(cycle_id, "Ignoring finish for inactive cycle");
            return None;
        }
        let target = state.active_cycle().map(Cycle::target_seconds);
        self.finish_locked(&mut state, cycle_id, target)
    }

    /// Interrupt the active cycle, if any. Returns the interrupted cycle.
    pub async fn interrupt_active_cycle(&self) -> Option<Cycle> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let Some(index) = state.active_index() else {
            tracing::debug!("No active cycle to interrupt");
            return None;
        };

        let cycle = &mut state.cycles[index];
        let elapsed = cycle.elapsed_at(now);
        if let Err(e) = cycle.interrupt(now) {
            tracing::warn!("Failed to interrupt cycle: {}", e);
            return None;
        }
        let interrupted = cycle.clone();
        state.active_cycle_id = None;
        drop(state);

        tracing::info!(cycle_id = %interrupted.id, elapsed, "Cycle interrupted");
        self.emit(CycleEvent::interrupted(
            interrupted.id.clone(),
            elapsed,
            now,
        ));

        Some(interrupted)
    }

    /// Record the caller-observed elapsed seconds for the active cycle.
    pub async fn set_elapsed_seconds(&self, seconds: u64) {
        let mut state = self.state.write().await;
        let Some(cycle) = state.active_cycle() else {
            tracing::debug!(elapsed = seconds, "No active cycle; elapsed update ignored");
            return;
        };

        let cycle_id = cycle.id.clone();
        let remaining = cycle.target_seconds().saturating_sub(seconds);
        state.elapsed_seconds = seconds;
        drop(state);

        self.emit(CycleEvent::tick(cycle_id, seconds, remaining, self.clock.now()));
    }

    /// Record elapsed seconds only if `cycle_id` is still active. Returns
    /// whether the value was stored.
    pub async fn set_elapsed_for(&self, cycle_id: &str, seconds: u64) -> bool {
        let mut state = self.state.write().await;
        let Some(cycle) = state.active_cycle() else {
            return false;
        };
        if cycle.id != cycle_id {
            return false;
        }

        let remaining = cycle.target_seconds().saturating_sub(seconds);
        state.elapsed_seconds = seconds;
        drop(state);

        tracing::trace!(cycle_id, elapsed = seconds, remaining, "Tick");
        self.emit(CycleEvent::tick(
            cycle_id.to_string(),
            seconds,
            remaining,
            self.clock.now(),
        ));
        true
    }

    pub async fn active_cycle(&self) -> Option<Cycle> {
        let state = self.state.read().await;
        state.active_cycle().cloned()
    }

    pub async fn active_cycle_id(&self) -> Option<String> {
        let state = self.state.read().await;
        state.active_cycle().map(|cycle| cycle.id.clone())
    }

    pub async fn elapsed_seconds(&self) -> u64 {
        self.state.read().await.elapsed_seconds
    }

    /// All cycles, oldest first
    pub async fn cycles(&self) -> Vec<Cycle> {
        self.state.read().await.cycles.clone()
    }

    pub async fn get_cycle(&self, cycle_id: &str) -> Option<Cycle> {
        let state = self.state.read().await;
        state.cycles.iter().find(|c| c.id == cycle_id).cloned()
    }

    pub async fn snapshot(&self) -> CycleSnapshot {
        let state = self.state.read().await;
        CycleSnapshot {
            active_cycle: state.active_cycle().cloned(),
            elapsed_seconds: state.elapsed_seconds,
        }
    }

    fn finish_locked(
        &self,
        state: &mut StoreState,
        cycle_id: &str,
        final_elapsed: Option<u64>,
    ) -> Option<Cycle> {
        let now = self.clock.now();
        let index = state.cycles.iter().position(|c| c.id == cycle_id)?;

        let cycle = &mut state.cycles[index];
        if let Err(e) = cycle.finish(now) {
            tracing::warn!("Failed to finish cycle: {}", e);
            return None;
        }
        let finished = cycle.clone();

        state.active_cycle_id = None;
        if let Some(elapsed) = final_elapsed {
            state.elapsed_seconds = elapsed;
        }

        let elapsed = final_elapsed.unwrap_or_else(|| finished.elapsed_at(now));
        tracing::info!(cycle_id = %finished.id, elapsed, "Cycle finished");
        self.emit(CycleEvent::finished(finished.id.clone(), elapsed, now));

        Some(finished)
    }

    fn emit(&self, event: CycleEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }
}

impl Default for CycleStore {
    fn default() -> Self {
        Self::new()
    }
}
