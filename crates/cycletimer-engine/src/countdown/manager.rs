//! Cycle manager - owns the store and the one running countdown driver

use tokio::sync::{broadcast, Mutex};
use tokio::time::Duration;

use cycletimer_core::models::{Cycle, NewCycle};
use cycletimer_core::{SharedClock, SystemClock};

use super::driver::{CountdownDriver, DriverHandle};
use crate::cycle::{CycleEvent, CycleSnapshot, CycleStore};

/// Cycle manager error
#[derive(Debug, thiserror::Error)]
pub enum CycleManagerError {
    #[error("Invalid cycle: {0}")]
    InvalidCycle(#[from] cycletimer_core::Error),
}

pub type Result<T> = std::result::Result<T, CycleManagerError>;

/// Front door for starting and interrupting cycles.
///
/// Every path that changes the active cycle stops the current driver before
/// a new one is spawned, so at most one driver ever ticks against the store.
pub struct CycleManager {
    store: CycleStore,
    driver: Mutex<Option<DriverHandle>>,
    tick_interval: Duration,
}

impl CycleManager {
    /// Create a manager on the system clock
    pub fn new(tick_interval: Duration) -> Self {
        Self::with_clock(SystemClock::shared(), tick_interval)
    }

    pub fn with_clock(clock: SharedClock, tick_interval: Duration) -> Self {
        Self::with_store(CycleStore::with_clock(clock), tick_interval)
    }

    pub fn with_store(store: CycleStore, tick_interval: Duration) -> Self {
        Self {
            store,
            driver: Mutex::new(None),
            tick_interval,
        }
    }

    pub fn store(&self) -> &CycleStore {
        &self.store
    }

    /// Subscribe to cycle events
    pub fn subscribe(&self) -> broadcast::Receiver<CycleEvent> {
        self.store.subscribe()
    }

    /// Validate and start a new cycle, replacing any active one.
    pub async fn start_cycle(&self, new_cycle: NewCycle) -> Result<String> {
        new_cycle.validate()?;

        let mut driver = self.driver.lock().await;
        if let Some(handle) = driver.take() {
            handle.stop().await;
        }

        let cycle_id = self.store.create_cycle(new_cycle).await;

        *driver = CountdownDriver::bind(&self.store, &cycle_id)
            .await
            .map(|countdown| countdown.spawn(self.tick_interval));

        if driver.is_none() {
            tracing::warn!(cycle_id = %cycle_id, "Cycle ended before its driver started");
        }

        Ok(cycle_id)
    }

    /// Stop the driver and interrupt the active cycle. No-op when idle.
    pub async fn interrupt_cycle(&self) -> Option<Cycle> {
        let mut driver = self.driver.lock().await;
        if let Some(handle) = driver.take() {
            handle.stop().await;
        }

        self.store.interrupt_active_cycle().await
    }

    /// Whether a driver is currently ticking.
    pub async fn is_driving(&self) -> bool {
        let driver = self.driver.lock().await;
        driver.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Id of the cycle the current driver is bound to, if it is still running.
    pub async fn driven_cycle_id(&self) -> Option<String> {
        let driver = self.driver.lock().await;
        driver
            .as_ref()
            .filter(|handle| !handle.is_finished())
            .map(|handle| handle.cycle_id().to_string())
    }

    pub async fn snapshot(&self) -> CycleSnapshot {
        self.store.snapshot().await
    }

    pub async fn cycles(&self) -> Vec<Cycle> {
        self.store.cycles().await
    }

    /// Stop the driver, leaving the active cycle untouched.
    pub async fn shutdown(&self) {
        let mut driver = self.driver.lock().await;
        if let Some(handle) = driver.take() {
            tracing::debug!(cycle_id = %handle.cycle_id(), "Stopping countdown driver");
            handle.stop().await;
        }
    }
}
