pub mod events;
pub mod store;

pub use events::{CycleEvent, CycleEventType};
pub use store::{CycleSnapshot, CycleStore};
