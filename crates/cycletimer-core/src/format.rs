//! Countdown display helpers

use std::fmt;

pub const APP_NAME: &str = "cycletimer";

/// Remaining time split into minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub minutes: u64,
    pub seconds: u64,
}

impl Countdown {
    pub fn from_seconds(total: u64) -> Self {
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }

    /// Remaining time for a cycle of `target_seconds` after `elapsed_seconds`.
    pub fn remaining(target_seconds: u64, elapsed_seconds: u64) -> Self {
        Self::from_seconds(target_seconds.saturating_sub(elapsed_seconds))
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

pub fn format_countdown(remaining_seconds: u64) -> String {
    Countdown::from_seconds(remaining_seconds).to_string()
}

/// Title to mirror into the terminal window: the countdown while a cycle
/// runs, the application name otherwise.
pub fn window_title(remaining_seconds: Option<u64>) -> String {
    match remaining_seconds {
        Some(remaining) => format!("{} - {}", format_countdown(remaining), APP_NAME),
        None => APP_NAME.to_string(),
    }
}

/// Elapsed time as `2m 05s`, or `42s` under a minute.
pub fn format_elapsed(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    if minutes > 0 {
        format!("{}m {:02}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
