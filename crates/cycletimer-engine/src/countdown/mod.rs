pub mod driver;
pub mod manager;

#[cfg(test)]
mod tests;

pub use driver::{CountdownDriver, DriverHandle, TickOutcome};
pub use manager::{CycleManager, CycleManagerError};
