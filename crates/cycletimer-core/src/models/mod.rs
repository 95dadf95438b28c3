pub mod config;
pub mod cycle;

pub use config::{Config, LogConfig, TimerConfig, UiConfig};
pub use cycle::{Cycle, CycleStatus, NewCycle, MAX_MINUTES, MIN_MINUTES};
