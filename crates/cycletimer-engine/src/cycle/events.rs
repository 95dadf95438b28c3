//! Cycle events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event broadcast by the cycle store on every change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleEvent {
    pub event_type: CycleEventType,
    pub cycle_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Types of cycle events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CycleEventType {
    /// Cycle created and made active
    Created { task: String, minutes_amount: u32 },
    /// Elapsed time recomputed for the active cycle
    Tick {
        elapsed_seconds: u64,
        remaining_seconds: u64,
    },
    /// Cycle reached its target duration
    Finished { elapsed_seconds: u64 },
    /// Cycle stopped before its target duration
    Interrupted { elapsed_seconds: u64 },
}

impl CycleEvent {
    pub fn new(event_type: CycleEventType, cycle_id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_type,
            cycle_id,
            timestamp,
        }
    }

    pub fn created(
        cycle_id: String,
        task: String,
        minutes_amount: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(
            CycleEventType::Created {
                task,
                minutes_amount,
            },
            cycle_id,
            timestamp,
        )
    }

    pub fn tick(
        cycle_id: String,
        elapsed_seconds: u64,
        remaining_seconds: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(
            CycleEventType::Tick {
                elapsed_seconds,
                remaining_seconds,
            },
            cycle_id,
            timestamp,
        )
    }

    pub fn finished(cycle_id: String, elapsed_seconds: u64, timestamp: DateTime<Utc>) -> Self {
        Self::new(
            CycleEventType::Finished { elapsed_seconds },
            cycle_id,
            timestamp,
        )
    }

    pub fn interrupted(cycle_id: String, elapsed_seconds: u64, timestamp: DateTime<Utc>) -> Self {
        Self::new(
            CycleEventType::Interrupted { elapsed_seconds },
            cycle_id,
            timestamp,
        )
    }

    /// True for events that end the cycle they refer to.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.event_type,
            CycleEventType::Finished { .. } | CycleEventType::Interrupted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_event_creation() {
        let now = Utc::now();
        let event = CycleEvent::created("cycle1".to_string(), "Write report".to_string(), 25, now);

        assert_eq!(event.cycle_id, "cycle1");
        assert_eq!(event.timestamp, now);
        assert!(!event.is_terminal());
        match event.event_type {
            CycleEventType::Created {
                task,
                minutes_amount,
            } => {
                assert_eq!(task, "Write report");
                assert_eq!(minutes_amount, 25);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn test_terminal_events() {
        let now = Utc::now();
        assert!(CycleEvent::finished("c".to_string(), 60, now).is_terminal());
        assert!(CycleEvent::interrupted("c".to_string(), 12, now).is_terminal());
        assert!(!CycleEvent::tick("c".to_string(), 12, 48, now).is_terminal());
    }

    #[test]
    fn test_event_serialization() {
        let event = CycleEvent::tick("c".to_string(), 37, 263, Utc::now());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event_type"]["type"], "tick");
        assert_eq!(json["event_type"]["elapsed_seconds"], 37);

        let back: CycleEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
