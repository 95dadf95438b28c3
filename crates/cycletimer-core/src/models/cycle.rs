//! Cycle data model

use crate::clock::seconds_between;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 60;

/// One timer run, from creation to its terminal state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cycle {
    pub id: String,
    pub task: String,
    pub minutes_amount: u32,
    pub start_date: DateTime<Utc>,
    pub status: CycleStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CycleStatus {
    Active,
    Finished { finished_at: DateTime<Utc> },
    Interrupted { interrupted_at: DateTime<Utc> },
}

/// Input for starting a cycle, as collected by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCycle {
    pub task: String,
    pub minutes_amount: u32,
}

impl Cycle {
    pub fn new(task: String, minutes_amount: u32, start_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task,
            minutes_amount,
            start_date,
            status: CycleStatus::Active,
        }
    }

    pub fn target_seconds(&self) -> u64 {
        u64::from(self.minutes_amount) * 60
    }

    /// Seconds elapsed since `start_date` as seen at `now`.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        seconds_between(self.start_date, now)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, CycleStatus::Active)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, CycleStatus::Finished { .. })
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self.status, CycleStatus::Interrupted { .. })
    }

    pub fn finished_date(&self) -> Option<DateTime<Utc>> {
        match self.status {
            CycleStatus::Finished { finished_at } => Some(finished_at),
            _ => None,
        }
    }

    pub fn interrupted_date(&self) -> Option<DateTime<Utc>> {
        match self.status {
            CycleStatus::Interrupted { interrupted_at } => Some(interrupted_at),
            _ => None,
        }
    }

    /// When the cycle reached its terminal state, if it has.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.finished_date().or_else(|| self.interrupted_date())
    }

    /// Move an active cycle to `Finished`. Terminal cycles are left untouched.
    pub fn finish(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::InvalidData(format!(
                "Cycle {} is already {}",
                self.id,
                self.status.as_str()
            )));
        }

        self.status = CycleStatus::Finished { finished_at: at };
        Ok(())
    }

    /// Move an active cycle to `Interrupted`. Terminal cycles are left untouched.
    pub fn interrupt(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::InvalidData(format!(
                "Cycle {} is already {}",
                self.id,
                self.status.as_str()
            )));
        }

        self.status = CycleStatus::Interrupted { interrupted_at: at };
        Ok(())
    }
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Active => "in progress",
            CycleStatus::Finished { .. } => "finished",
            CycleStatus::Interrupted { .. } => "interrupted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CycleStatus::Active)
    }
}

impl NewCycle {
    pub fn new(task: impl Into<String>, minutes_amount: u32) -> Self {
        Self {
            task: task.into(),
            minutes_amount,
        }
    }

    /// Build from raw form fields, validating both.
    pub fn parse(task: &str, minutes_text: &str) -> Result<Self> {
        let minutes_text = minutes_text.trim();
        if minutes_text.is_empty() {
            return Err(Error::Validation("Duration is required".to_string()));
        }

        let minutes_amount: u32 = minutes_text.parse().map_err(|_| {
            Error::Validation(format!(
                "Duration must be a whole number of minutes, got '{}'",
                minutes_text
            ))
        })?;

        let new_cycle = Self::new(task.trim(), minutes_amount);
        new_cycle.validate()?;
        Ok(new_cycle)
    }

    pub fn validate(&self) -> Result<()> {
        if self.task.trim().is_empty() {
            return Err(Error::Validation("Task name cannot be empty".to_string()));
        }

        if self.minutes_amount < MIN_MINUTES {
            return Err(Error::Validation(format!(
                "Cycle must last at least {} minute",
                MIN_MINUTES
            )));
        }

        if self.minutes_amount > MAX_MINUTES {
            return Err(Error::Validation(format!(
                "Cycle must last at most {} minutes",
                MAX_MINUTES
            )));
        }

        Ok(())
    }
}
