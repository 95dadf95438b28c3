//! CycleTimer Engine
//!
//! The cycle store and the countdown driver that advances it.

pub mod countdown;
pub mod cycle;

pub use countdown::{CountdownDriver, CycleManager, CycleManagerError, DriverHandle, TickOutcome};
pub use cycle::{CycleEvent, CycleEventType, CycleSnapshot, CycleStore};
