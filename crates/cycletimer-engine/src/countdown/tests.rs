use super::{CountdownDriver, CycleManager, TickOutcome};
use crate::cycle::{CycleEventType, CycleStore};
use chrono::{DateTime, Utc};
use cycletimer_core::clock::seconds_between;
use cycletimer_core::models::NewCycle;
use cycletimer_core::{Clock, ManualClock};
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::{sleep, Duration, Instant};

/// Clock that follows tokio's (possibly paused) time.
struct TokioClock {
    origin_utc: DateTime<Utc>,
    origin: Instant,
}

impl TokioClock {
    fn new() -> Self {
        Self {
            origin_utc: Utc::now(),
            origin: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin_utc + elapsed
    }
}

fn manual_store() -> (CycleStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    (CycleStore::with_clock(clock.clone()), clock)
}

fn paused_manager() -> CycleManager {
    CycleManager::with_clock(Arc::new(TokioClock::new()), Duration::from_secs(1))
}

#[tokio::test]
async fn test_tick_reports_elapsed_before_target() {
    let (store, clock) = manual_store();
    let id = store.create_cycle(NewCycle::new("Read", 5)).await;
    let driver = CountdownDriver::bind(&store, &id).await.unwrap();

    clock.advance_millis(37_000);

    assert_eq!(
        driver.tick().await,
        TickOutcome::Running {
            elapsed_seconds: 37
        }
    );
    assert_eq!(store.elapsed_seconds().await, 37);
    assert_eq!(store.active_cycle_id().await, Some(id));
}

#[tokio::test]
async fn test_tick_finishes_at_target() {
    let (store, clock) = manual_store();
    let id = store.create_cycle(NewCycle::new("Read", 1)).await;
    let driver = CountdownDriver::bind(&store, &id).await.unwrap();

    clock.advance_millis(60_000);

    assert_eq!(
        driver.tick().await,
        TickOutcome::Finished {
            elapsed_seconds: 60
        }
    );
    assert_eq!(store.elapsed_seconds().await, 60);
    assert!(store.active_cycle().await.is_none());

    let cycle = store.get_cycle(&id).await.unwrap();
    assert_eq!(cycle.finished_date(), Some(clock.now()));

    // Nothing more is reported once the cycle is terminal
    let mut rx = store.subscribe();
    clock.advance_millis(5_000);
    assert_eq!(driver.tick().await, TickOutcome::Detached);
    assert_eq!(store.elapsed_seconds().await, 60);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_late_tick_still_finishes_with_target() {
    let (store, clock) = manual_store();
    let id = store.create_cycle(NewCycle::new("Read", 1)).await;
    let driver = CountdownDriver::bind(&store, &id).await.unwrap();

    // A backgrounded process may miss many ticks
    clock.advance_millis(95_000);

    assert_eq!(
        driver.tick().await,
        TickOutcome::Finished {
            elapsed_seconds: 60
        }
    );
    assert_eq!(store.elapsed_seconds().await, 60);
}

#[tokio::test]
async fn test_irregular_ticks_track_wall_clock() {
    let (store, clock) = manual_store();
    let id = store.create_cycle(NewCycle::new("Read", 5)).await;
    let start = store.get_cycle(&id).await.unwrap().start_date;
    let driver = CountdownDriver::bind(&store, &id).await.unwrap();

    let mut previous = 0;
    for step in [600, 1400, 900].iter().cycle().take(30) {
        clock.advance_millis(*step);

        let outcome = driver.tick().await;
        let expected = seconds_between(start, clock.now());
        assert_eq!(
            outcome,
            TickOutcome::Running {
                elapsed_seconds: expected
            }
        );

        let observed = store.elapsed_seconds().await;
        assert_eq!(observed, expected);
        assert!(observed >= previous);
        previous = observed;
    }

    // 10 rounds of 2.9s
    assert_eq!(previous, 29);
}

#[tokio::test]
async fn test_stale_driver_does_not_touch_new_cycle() {
    let (store, clock) = manual_store();
    let old = store.create_cycle(NewCycle::new("old", 1)).await;
    let stale = CountdownDriver::bind(&store, &old).await.unwrap();

    clock.advance_millis(10_000);
    let new = store.create_cycle(NewCycle::new("new", 1)).await;

    clock.advance_millis(60_000);
    assert_eq!(stale.tick().await, TickOutcome::Detached);

    let cycle = store.get_cycle(&new).await.unwrap();
    assert!(cycle.is_active());
    assert_eq!(store.elapsed_seconds().await, 0);
}

#[tokio::test]
async fn test_bind_when_idle() {
    let (store, _clock) = manual_store();
    assert!(CountdownDriver::bind_active(&store).await.is_none());

    let id = store.create_cycle(NewCycle::new("t", 1)).await;
    let driver = CountdownDriver::bind_active(&store).await.unwrap();
    assert_eq!(driver.cycle_id(), id);
    assert_eq!(driver.target_seconds(), 60);

    store.interrupt_active_cycle().await;
    assert!(CountdownDriver::bind(&store, &id).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_one_minute_cycle_runs_to_completion() {
    let manager = paused_manager();

    let id = manager
        .start_cycle(NewCycle::new("Write report", 1))
        .await
        .unwrap();

    sleep(Duration::from_millis(30_500)).await;
    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.elapsed_seconds, 30);
    assert_eq!(
        snapshot.active_cycle.as_ref().map(|c| c.id.clone()),
        Some(id.clone())
    );
    assert!(manager.is_driving().await);

    sleep(Duration::from_millis(30_000)).await;
    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.elapsed_seconds, 60);
    assert!(snapshot.active_cycle.is_none());
    assert!(manager.store().get_cycle(&id).await.unwrap().is_finished());
    assert!(!manager.is_driving().await);

    let mut rx = manager.subscribe();
    sleep(Duration::from_secs(5)).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_new_cycle_replaces_driver() {
    let manager = paused_manager();

    let first = manager.start_cycle(NewCycle::new("first", 5)).await.unwrap();
    sleep(Duration::from_millis(5_500)).await;
    assert_eq!(manager.snapshot().await.elapsed_seconds, 5);

    let second = manager.start_cycle(NewCycle::new("second", 5)).await.unwrap();
    assert_eq!(manager.driven_cycle_id().await, Some(second.clone()));
    assert_eq!(manager.snapshot().await.elapsed_seconds, 0);

    let previous = manager.store().get_cycle(&first).await.unwrap();
    assert!(previous.is_interrupted());

    sleep(Duration::from_millis(3_500)).await;
    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.elapsed_seconds, 3);
    assert_eq!(snapshot.active_cycle.map(|c| c.id), Some(second));

    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_stops_ticking() {
    let manager = paused_manager();
    let id = manager.start_cycle(NewCycle::new("t", 5)).await.unwrap();

    sleep(Duration::from_millis(2_500)).await;
    let interrupted = manager.interrupt_cycle().await.unwrap();
    assert_eq!(interrupted.id, id);
    assert!(!manager.is_driving().await);

    let mut rx = manager.subscribe();
    sleep(Duration::from_secs(5)).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(manager.snapshot().await.elapsed_seconds, 2);

    assert!(manager.interrupt_cycle().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_driver_exits_when_store_is_interrupted_directly() {
    let manager = paused_manager();
    manager.start_cycle(NewCycle::new("t", 5)).await.unwrap();

    sleep(Duration::from_millis(1_500)).await;
    manager.store().interrupt_active_cycle().await;
    sleep(Duration::from_millis(10)).await;

    assert!(!manager.is_driving().await);
}

#[tokio::test(start_paused = true)]
async fn test_tick_events_are_broadcast() {
    let manager = paused_manager();
    let mut rx = manager.subscribe();
    let id = manager.start_cycle(NewCycle::new("t", 1)).await.unwrap();

    let created = rx.recv().await.unwrap();
    assert!(matches!(created.event_type, CycleEventType::Created { .. }));

    let tick = rx.recv().await.unwrap();
    assert_eq!(tick.cycle_id, id);
    assert_eq!(
        tick.event_type,
        CycleEventType::Tick {
            elapsed_seconds: 1,
            remaining_seconds: 59
        }
    );

    manager.shutdown().await;
}

#[tokio::test]
async fn test_invalid_cycle_is_rejected() {
    let manager = CycleManager::new(Duration::from_secs(1));
    assert!(manager.start_cycle(NewCycle::new("", 5)).await.is_err());
    assert!(manager.start_cycle(NewCycle::new("t", 61)).await.is_err());
    assert!(manager.cycles().await.is_empty());
}
